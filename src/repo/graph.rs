// src/repo/graph.rs
//! The candidate's knowledge graph, built from the local Repo tables

use serde_json::json;
use sqlx::{FromRow, SqlitePool};

use super::models::{
    GraphData, GraphEdge, GraphNode, GraphStats, NodeType, ProfileSummary, UserGraphResponse,
};
use crate::common::helpers::parse_json_array;
use crate::common::ApiError;

const SKILL_LIMIT: i64 = 20;
const COMPANY_LIMIT: i64 = 10;
const JOB_LIMIT: i64 = 5;
const DEFAULT_SKILL_CONFIDENCE: f64 = 0.8;
const DEFAULT_MATCH_SCORE: f64 = 0.85;

#[derive(Debug, Clone, FromRow)]
pub struct SkillNodeRow {
    pub id: i64,
    pub name: Option<String>,
    pub category: Option<String>,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CompanyNodeRow {
    pub id: i64,
    pub name: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct PreferenceRow {
    pub role_types: Option<String>,
    pub preferred_locations: Option<String>,
    pub remote_preference: Option<String>,
    pub industries_preferred: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct JobNodeRow {
    pub id: String,
    pub title: String,
    pub company_name: String,
}

/// `(label, value)` pairs shown as preference nodes
pub fn preference_entries(row: Option<&PreferenceRow>) -> Vec<(&'static str, String)> {
    let Some(row) = row else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    if let Some(style) = row.remote_preference.as_ref().filter(|s| !s.is_empty()) {
        entries.push(("Work Style", style.clone()));
    }

    let lists = [
        ("Role", row.role_types.as_deref(), 3),
        ("Location", row.preferred_locations.as_deref(), 2),
        ("Industry", row.industries_preferred.as_deref(), 2),
    ];
    for (label, raw, limit) in lists {
        entries.extend(
            parse_json_array(raw)
                .into_iter()
                .take(limit)
                .map(|value| (label, value)),
        );
    }

    entries
}

fn edge(source: &str, target: &str, edge_type: &str, weight: Option<f64>, label: Option<String>) -> GraphEdge {
    GraphEdge {
        source: source.to_string(),
        target: target.to_string(),
        edge_type: edge_type.to_string(),
        weight,
        label,
    }
}

/// Lays the user out at the centre with an edge to every other node
pub fn build_user_graph(
    user_id: &str,
    skills: &[SkillNodeRow],
    companies: &[CompanyNodeRow],
    preferences: &[(&'static str, String)],
    jobs: &[JobNodeRow],
) -> GraphData {
    let user_node = format!("user-{}", user_id);
    let mut graph = GraphData::default();

    graph.nodes.push(GraphNode {
        id: user_node.clone(),
        node_type: NodeType::User,
        label: "You".to_string(),
        data: Some(json!({ "central": true })),
    });

    for skill in skills {
        let id = format!("skill-{}", skill.id);
        let confidence = skill
            .confidence
            .filter(|c| *c > 0.0)
            .unwrap_or(DEFAULT_SKILL_CONFIDENCE);
        graph.nodes.push(GraphNode {
            id: id.clone(),
            node_type: NodeType::Skill,
            label: skill.name.clone().unwrap_or_else(|| "Unknown Skill".to_string()),
            data: Some(json!({
                "category": skill.category.as_deref().unwrap_or("other"),
                "confidence": confidence,
            })),
        });
        graph.edges.push(edge(&user_node, &id, "has_skill", Some(confidence), None));
    }

    for company in companies {
        let id = format!("company-{}", company.id);
        graph.nodes.push(GraphNode {
            id: id.clone(),
            node_type: NodeType::Company,
            label: company.name.clone().unwrap_or_else(|| "Unknown Company".to_string()),
            data: company.role.as_ref().map(|role| json!({ "role": role })),
        });
        graph.edges.push(edge(&user_node, &id, "worked_at", None, company.role.clone()));
    }

    for (index, (label, value)) in preferences.iter().enumerate() {
        let id = format!("preference-{}", index);
        graph.nodes.push(GraphNode {
            id: id.clone(),
            node_type: NodeType::Preference,
            label: value.clone(),
            data: Some(json!({ "type": label })),
        });
        graph.edges.push(edge(&user_node, &id, "prefers", None, Some(label.to_string())));
    }

    for job in jobs {
        let id = format!("job-{}", job.id);
        graph.nodes.push(GraphNode {
            id: id.clone(),
            node_type: NodeType::Job,
            label: job.title.clone(),
            data: Some(json!({ "company": job.company_name, "matchScore": DEFAULT_MATCH_SCORE })),
        });
        graph.edges.push(edge(&user_node, &id, "matches", Some(DEFAULT_MATCH_SCORE), None));
    }

    graph
}

pub struct GraphService {
    db: SqlitePool,
}

impl GraphService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn user_graph(&self, user_id: &str) -> Result<UserGraphResponse, ApiError> {
        let skills = sqlx::query_as::<_, SkillNodeRow>(
            r#"
            SELECT us.id,
                   COALESCE(s.name, us.skill_name_raw) AS name,
                   COALESCE(s.category, 'other') AS category,
                   us.confidence
            FROM user_skills us
            LEFT JOIN skills s ON us.skill_id = s.id
            WHERE us.user_id = ?
            ORDER BY us.confidence IS NULL, us.confidence DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(SKILL_LIMIT)
        .fetch_all(&self.db)
        .await?;

        let companies = sqlx::query_as::<_, CompanyNodeRow>(
            r#"
            SELECT id, company_name_raw AS name, role_title AS role
            FROM user_experiences
            WHERE user_id = ?
            ORDER BY id
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(COMPANY_LIMIT)
        .fetch_all(&self.db)
        .await?;

        let preference_row = sqlx::query_as::<_, PreferenceRow>(
            r#"
            SELECT role_types, preferred_locations, remote_preference, industries_preferred
            FROM user_job_preferences
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        let preferences = preference_entries(preference_row.as_ref());

        let jobs = sqlx::query_as::<_, JobNodeRow>(
            r#"
            SELECT id, title, company_name
            FROM jobs
            WHERE is_active = 1
            ORDER BY posted_date IS NULL, posted_date DESC
            LIMIT ?
            "#,
        )
        .bind(JOB_LIMIT)
        .fetch_all(&self.db)
        .await?;

        let graph = build_user_graph(user_id, &skills, &companies, &preferences, &jobs);
        let stats = GraphStats {
            node_count: graph.nodes.len(),
            edge_count: graph.edges.len(),
            skill_count: skills.len(),
            company_count: companies.len(),
            preference_count: preferences.len(),
            matched_job_count: jobs.len(),
        };

        Ok(UserGraphResponse {
            graph,
            source: "local",
            stats,
        })
    }

    /// Confirmed skill and experience counts plus whether preferences exist
    pub async fn profile_summary(&self, user_id: &str) -> Result<ProfileSummary, ApiError> {
        let skill_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_skills WHERE user_id = ? AND confirmed = 1",
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        let experience_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_experiences WHERE user_id = ? AND confirmed = 1",
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        let preference_rows: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_job_preferences WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(ProfileSummary {
            skill_count,
            experience_count,
            has_preferences: preference_rows > 0,
        })
    }
}
