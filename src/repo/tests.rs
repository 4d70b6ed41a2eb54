//! Tests for repo module
//!
//! These tests verify the candidate profile:
//! - Repo read ordering, stats and completeness
//! - Experience add/update/remove with ownership checks
//! - Onboarding upserts and the local knowledge graph

#[cfg(test)]
mod tests {
    use super::super::graph::{build_user_graph, preference_entries, GraphService, PreferenceRow, SkillNodeRow};
    use super::super::models::*;
    use super::super::services::{completeness, parse_day_rate, RepoService};
    use super::super::validators::RepoValidator;
    use crate::common::migrations::test_pool;
    use crate::common::{ApiError, Validator};
    use crate::extraction::models::{ExtractedSkill, ExtractionResult};
    use crate::extraction::services::ExtractionService;
    use crate::jobs::models::CreateJob;
    use crate::jobs::services::JobService;
    use axum::extract::Query;
    use sqlx::SqlitePool;

    const USER: &str = "user-1";

    fn experience(company: &str, role: &str) -> CreateExperience {
        CreateExperience {
            user_id: Some(USER.to_string()),
            company_name: Some(company.to_string()),
            role_title: Some(role.to_string()),
            ..Default::default()
        }
    }

    async fn add(service: &RepoService, request: CreateExperience) -> CreatedExperience {
        let company = request.company_name.clone().unwrap();
        let role = request.role_title.clone().unwrap();
        service
            .add_experience(USER, &company, &role, &request)
            .await
            .unwrap()
    }

    async fn employer_of(db: &SqlitePool, experience_id: i64) -> Option<i64> {
        sqlx::query_scalar("SELECT employer_id FROM user_experiences WHERE id = ?")
            .bind(experience_id)
            .fetch_one(db)
            .await
            .unwrap()
    }

    fn onboarding(skills: &[&str], role_types: &[&str], day_rate: &str) -> OnboardingRequest {
        OnboardingRequest {
            user_id: Some(USER.to_string()),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            experiences: Vec::new(),
            preferences: Some(OnboardingPreferences {
                role_types: role_types.iter().map(|r| r.to_string()).collect(),
                day_rate: Some(day_rate.to_string()),
            }),
        }
    }

    #[test]
    fn test_completeness_caps_each_part() {
        assert_eq!(completeness(0, 0, 0, false), 0);
        assert_eq!(completeness(3, 1, 0, true), 45);
        assert_eq!(completeness(10, 5, 3, true), 100);
        assert_eq!(completeness(6, 3, 2, false), 80);
    }

    #[test]
    fn test_parse_day_rate() {
        assert_eq!(parse_day_rate("£800-1000"), (Some(800), Some(1000)));
        assert_eq!(parse_day_rate("£1500+"), (Some(1500), None));
        assert_eq!(parse_day_rate("Flexible"), (None, None));
        assert_eq!(parse_day_rate("800-1000"), (None, None));
    }

    #[tokio::test]
    async fn test_add_experience_reuses_employer_case_insensitively() {
        let db = test_pool().await;
        let service = RepoService::new(db.clone());

        let first = add(&service, experience("Acme", "CFO")).await;
        let second = add(
            &service,
            CreateExperience {
                role_type: Some("interim".to_string()),
                ..experience("ACME", "Interim CFO")
            },
        )
        .await;

        assert_eq!(first.company_name, "Acme");
        assert_eq!(first.experience.role_title.as_deref(), Some("CFO"));
        assert!(employer_of(&db, first.experience.id).await.is_some());
        assert_eq!(
            employer_of(&db, first.experience.id).await,
            employer_of(&db, second.experience.id).await
        );

        let role_types: Vec<String> =
            sqlx::query_scalar("SELECT role_type FROM user_experiences ORDER BY id")
                .fetch_all(&db)
                .await
                .unwrap();
        assert_eq!(role_types, vec!["full-time", "interim"]);

        let value = serde_json::to_value(&first).unwrap();
        assert_eq!(value["company_name"], "Acme");
        assert_eq!(value["is_current"], false);
    }

    #[tokio::test]
    async fn test_update_experience_coalesces_but_overwrites_years() {
        let db = test_pool().await;
        let service = RepoService::new(db.clone());
        let created = add(
            &service,
            CreateExperience {
                start_year: Some(2015),
                end_year: Some(2019),
                industry: Some("Retail".to_string()),
                ..experience("Acme", "CFO")
            },
        )
        .await;

        let updated = service
            .update_experience(
                USER,
                created.experience.id,
                &UpdateExperience {
                    role_title: Some("Group CFO".to_string()),
                    start_year: Some(2016),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.role_title.as_deref(), Some("Group CFO"));
        assert_eq!(updated.industry.as_deref(), Some("Retail"));
        assert_eq!(updated.start_year, Some(2016));
        assert_eq!(updated.end_year, None);

        let stranger = service
            .update_experience("someone-else", created.experience.id, &UpdateExperience::default())
            .await;
        assert!(matches!(stranger, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_experience_reports_what_was_removed() {
        let db = test_pool().await;
        let service = RepoService::new(db.clone());
        let created = add(&service, experience("Acme", "CFO")).await;

        let stranger = service.remove_experience("someone-else", created.experience.id).await;
        assert!(matches!(stranger, Err(ApiError::NotFound(_))));

        let removed = service
            .remove_experience(USER, created.experience.id)
            .await
            .unwrap();
        assert_eq!(
            removed,
            RemovedExperience {
                id: created.experience.id,
                role_title: Some("CFO".to_string()),
                company: Some("Acme".to_string()),
            }
        );

        let again = service.remove_experience(USER, created.experience.id).await;
        assert!(matches!(again, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_onboarding_upserts_preferences_and_skips_duplicates() {
        let db = test_pool().await;
        let service = RepoService::new(db.clone());

        let saved = service
            .complete_onboarding(
                USER,
                &OnboardingRequest {
                    experiences: vec![
                        OnboardingExperience {
                            company: Some("Acme".to_string()),
                            role: None,
                        },
                        OnboardingExperience {
                            company: None,
                            role: Some("Advisor".to_string()),
                        },
                    ],
                    ..onboarding(&["IFRS", "M&A", "IFRS"], &["Interim"], "£800-1000")
                },
            )
            .await
            .unwrap();
        assert_eq!(
            saved,
            OnboardingSaved {
                skills: 3,
                experiences: 1,
                preferences: true,
            }
        );

        let skills: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_skills WHERE user_id = ?")
            .bind(USER)
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(skills, 2);

        let role: String = sqlx::query_scalar("SELECT role_title FROM user_experiences WHERE user_id = ?")
            .bind(USER)
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(role, "Executive");

        service
            .complete_onboarding(USER, &onboarding(&[], &["Fractional"], "£1500+"))
            .await
            .unwrap();

        let repo = service.get_repo(USER).await.unwrap();
        let preferences = serde_json::to_value(repo.preferences.unwrap()).unwrap();
        assert_eq!(preferences["role_types"], serde_json::json!(["Fractional"]));
        assert_eq!(preferences["day_rate_min"], 1500);
        assert!(preferences["day_rate_max"].is_null());
    }

    #[tokio::test]
    async fn test_get_repo_orders_rows_and_scores_completeness() {
        let db = test_pool().await;
        let service = RepoService::new(db.clone());

        service
            .complete_onboarding(USER, &onboarding(&["IFRS", "M&A"], &["Interim"], "£800-1000"))
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO user_skills (user_id, skill_name_raw, confidence, confirmed) VALUES (?, 'Treasury', 0.7, 0)",
        )
        .bind(USER)
        .execute(&db)
        .await
        .unwrap();

        add(&service, CreateExperience { end_year: Some(2015), ..experience("Alpha", "CFO") }).await;
        add(&service, CreateExperience { is_current: Some(true), ..experience("Beta", "CEO") }).await;
        add(&service, experience("Gamma", "Advisor")).await;
        add(&service, CreateExperience { end_year: Some(2020), ..experience("Delta", "COO") }).await;

        sqlx::query(
            "INSERT INTO user_qualifications (user_id, qualification_type, name, year_obtained) VALUES (?, 'degree', 'BSc', NULL), (?, 'certification', 'ACA', 2008)",
        )
        .bind(USER)
        .bind(USER)
        .execute(&db)
        .await
        .unwrap();

        ExtractionService::new(db.clone())
            .save_pending(
                USER,
                None,
                &ExtractionResult {
                    skills: vec![ExtractedSkill {
                        name: "Audit".to_string(),
                        confidence: 0.5,
                        ..Default::default()
                    }],
                    ..Default::default()
                },
            )
            .await;

        let repo = service.get_repo(USER).await.unwrap();

        assert_eq!(repo.skills.last().unwrap().skill_name_raw.as_deref(), Some("Treasury"));
        let companies: Vec<&str> = repo
            .experiences
            .iter()
            .map(|e| e.company_name.as_deref().unwrap())
            .collect();
        assert_eq!(companies, vec!["Beta", "Gamma", "Delta", "Alpha"]);
        let qualifications: Vec<&str> = repo.qualifications.iter().map(|q| q.name.as_str()).collect();
        assert_eq!(qualifications, vec!["ACA", "BSc"]);

        assert_eq!(
            repo.stats,
            RepoStats {
                total_skills: 3,
                confirmed_skills: 2,
                total_experiences: 4,
                pending_count: 1,
                completeness: 85,
            }
        );

        let value = serde_json::to_value(&repo).unwrap();
        assert_eq!(value["pendingItems"][0]["item_type"], "skill");
        assert_eq!(value["stats"]["totalSkills"], 3);
    }

    #[tokio::test]
    async fn test_empty_repo() {
        let repo = RepoService::new(test_pool().await).get_repo(USER).await.unwrap();

        assert!(repo.skills.is_empty());
        assert!(repo.preferences.is_none());
        assert_eq!(repo.stats.completeness, 0);
    }

    #[test]
    fn test_preference_entries_limit_each_list() {
        let row = PreferenceRow {
            role_types: Some(r#"["CFO","COO","CEO","NED"]"#.to_string()),
            preferred_locations: Some(r#"["London","Leeds","Bristol"]"#.to_string()),
            remote_preference: Some("Hybrid".to_string()),
            industries_preferred: None,
        };

        let entries = preference_entries(Some(&row));
        let labels: Vec<&str> = entries.iter().map(|(label, _)| *label).collect();
        assert_eq!(
            labels,
            vec!["Work Style", "Role", "Role", "Role", "Location", "Location"]
        );
        assert!(preference_entries(None).is_empty());
    }

    #[test]
    fn test_build_user_graph_links_everything_to_the_user() {
        let skills = vec![SkillNodeRow {
            id: 7,
            name: None,
            category: None,
            confidence: None,
        }];
        let preferences = vec![("Role", "Interim CFO".to_string())];

        let graph = build_user_graph(USER, &skills, &[], &preferences, &[]);

        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.nodes[0].id, "user-user-1");
        assert_eq!(graph.nodes[1].label, "Unknown Skill");
        assert_eq!(graph.edges[0].weight, Some(0.8));
        assert!(graph.edges.iter().all(|e| e.source == "user-user-1"));

        let value = serde_json::to_value(&graph).unwrap();
        assert_eq!(value["nodes"][2]["type"], "preference");
        assert_eq!(value["edges"][1]["label"], "Role");
    }

    #[tokio::test]
    async fn test_user_graph_from_repo_and_jobs() {
        let db = test_pool().await;
        let service = RepoService::new(db.clone());
        service
            .complete_onboarding(
                USER,
                &onboarding(&["IFRS", "M&A"], &["Interim CFO", "Fractional CFO", "Board", "NED"], "£800-1000"),
            )
            .await
            .unwrap();
        add(&service, experience("Acme", "CFO")).await;

        let jobs = JobService::new(db.clone());
        for (title, active) in [("Interim CFO", true), ("Closed Role", false)] {
            jobs.create_job(CreateJob {
                title: title.to_string(),
                company_name: "Globex".to_string(),
                url: format!("https://jobs.example.com/{}", title.replace(' ', "-")),
                is_active: Some(active),
                ..Default::default()
            })
            .await
            .unwrap();
        }

        let response = GraphService::new(db).user_graph(USER).await.unwrap();

        assert_eq!(response.source, "local");
        assert_eq!(
            response.stats,
            GraphStats {
                node_count: 8,
                edge_count: 7,
                skill_count: 2,
                company_count: 1,
                preference_count: 3,
                matched_job_count: 1,
            }
        );
        let job = response
            .graph
            .nodes
            .iter()
            .find(|n| n.node_type == NodeType::Job)
            .unwrap();
        assert_eq!(job.label, "Interim CFO");
    }

    #[tokio::test]
    async fn test_skills_without_confidence_lead_their_group() {
        let db = test_pool().await;
        let service = RepoService::new(db.clone());
        sqlx::query(
            "INSERT INTO user_skills (user_id, skill_name_raw, confidence, confirmed) VALUES (?, 'Audit', 0.95, 1), (?, 'Treasury', 0.7, 0), (?, 'Tax', NULL, 0)",
        )
        .bind(USER)
        .bind(USER)
        .bind(USER)
        .execute(&db)
        .await
        .unwrap();
        service
            .complete_onboarding(USER, &onboarding(&["IFRS"], &[], "Flexible"))
            .await
            .unwrap();

        let repo = service.get_repo(USER).await.unwrap();
        let names: Vec<&str> = repo
            .skills
            .iter()
            .map(|s| s.skill_name_raw.as_deref().unwrap())
            .collect();
        assert_eq!(names, vec!["IFRS", "Audit", "Tax", "Treasury"]);
    }

    #[test]
    fn test_graph_query_source() {
        let uri: axum::http::Uri = "http://localhost/api/graph/user?userId=user-1&source=ZEP"
            .parse()
            .unwrap();
        let Query(query) = Query::<GraphQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.user_id.as_deref(), Some(USER));
        assert_eq!(GraphSource::parse(query.source.as_deref()), GraphSource::Zep);

        assert_eq!(GraphSource::parse(Some("local")), GraphSource::Local);
        assert_eq!(GraphSource::parse(Some("neo4j")), GraphSource::Auto);
        assert_eq!(GraphSource::parse(None), GraphSource::Auto);
    }

    #[tokio::test]
    async fn test_profile_summary_counts_confirmed_rows_only() {
        let db = test_pool().await;
        let graph = GraphService::new(db.clone());

        assert_eq!(
            graph.profile_summary(USER).await.unwrap(),
            ProfileSummary {
                skill_count: 0,
                experience_count: 0,
                has_preferences: false,
            }
        );

        let service = RepoService::new(db.clone());
        service
            .complete_onboarding(USER, &onboarding(&["IFRS", "M&A"], &["Interim"], "£800-1000"))
            .await
            .unwrap();
        add(&service, experience("Acme", "CFO")).await;
        sqlx::query(
            "INSERT INTO user_skills (user_id, skill_name_raw, confidence, confirmed) VALUES (?, 'Treasury', 0.7, 0)",
        )
        .bind(USER)
        .execute(&db)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO user_experiences (user_id, company_name_raw, role_title, confirmed) VALUES (?, 'Globex', 'COO', 0)",
        )
        .bind(USER)
        .execute(&db)
        .await
        .unwrap();

        let profile = graph.profile_summary(USER).await.unwrap();
        assert_eq!(
            profile,
            ProfileSummary {
                skill_count: 2,
                experience_count: 1,
                has_preferences: true,
            }
        );

        let value = serde_json::to_value(SyncGraphResponse {
            success: true,
            zep_synced: false,
            profile,
        })
        .unwrap();
        assert_eq!(value["zepSynced"], false);
        assert_eq!(value["profile"]["skillCount"], 2);
        assert_eq!(value["profile"]["hasPreferences"], true);
    }

    #[test]
    fn test_onboarding_response_reports_no_external_sync() {
        let value = serde_json::to_value(OnboardingResponse {
            success: true,
            saved: OnboardingSaved {
                skills: 1,
                experiences: 0,
                preferences: false,
            },
            zep_synced: false,
        })
        .unwrap();
        assert_eq!(value["zepSynced"], false);
        assert_eq!(value["saved"]["skills"], 1);
    }

    #[test]
    fn test_request_validation() {
        let validator = RepoValidator;

        let missing = CreateExperience {
            user_id: Some(USER.to_string()),
            ..Default::default()
        };
        let fields: Vec<String> = validator
            .validate(&missing)
            .errors
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, vec!["companyName", "roleTitle"]);

        let backwards = CreateExperience {
            start_year: Some(2020),
            end_year: Some(2018),
            ..experience("Acme", "CFO")
        };
        assert!(!validator.validate(&backwards).is_valid);

        assert!(!validator.validate(&UpdateExperience::default()).is_valid);
        assert!(validator
            .validate(&DeleteExperience {
                user_id: Some(USER.to_string()),
                experience_id: Some(1),
            })
            .is_valid);
        assert!(!validator.validate(&OnboardingRequest::default()).is_valid);
    }
}
