// src/common/migrations.rs
//! Database migration and schema management

use sqlx::SqlitePool;
use tracing::{info, warn};

/// Run all database migrations
///
/// Every statement is idempotent, so this runs on each start-up. With
/// `reset` set, all tables are dropped first.
pub async fn run_migrations(pool: &SqlitePool, reset: bool) -> Result<(), sqlx::Error> {
    if reset {
        warn!("RESET_DB=true - dropping all tables and recreating schema");
        drop_all_tables(pool).await?;
    }

    create_job_tables(pool).await?;
    create_company_tables(pool).await?;
    create_repo_tables(pool).await?;
    create_extraction_tables(pool).await?;
    create_article_tables(pool).await?;
    create_indexes(pool).await?;

    info!("Database migration completed");

    Ok(())
}

async fn drop_all_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Reverse dependency order
    let tables = [
        "extraction_sessions",
        "repo_pending_items",
        "user_job_preferences",
        "user_qualifications",
        "user_experiences",
        "user_skills",
        "skills",
        "employer_companies",
        "company_brands",
        "articles",
        "jobs",
    ];

    for table in tables {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await?;
    }

    Ok(())
}

async fn create_job_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS jobs (
            id TEXT PRIMARY KEY,
            slug TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            company_name TEXT NOT NULL,
            company_domain TEXT,
            location TEXT,
            city TEXT,
            workplace_type TEXT,
            employment_type TEXT,
            compensation TEXT,
            posted_date TEXT,
            updated_date TEXT,
            is_interim INTEGER DEFAULT 1,
            is_fractional INTEGER DEFAULT 0,
            is_remote INTEGER DEFAULT 0,
            is_active INTEGER DEFAULT 1,
            classification_confidence REAL,
            skills_required TEXT,
            seniority_level TEXT,
            role_category TEXT,
            salary_min INTEGER,
            salary_max INTEGER,
            salary_currency TEXT,
            description_snippet TEXT,
            full_description TEXT,
            requirements TEXT,
            responsibilities TEXT,
            benefits TEXT,
            qualifications TEXT,
            about_company TEXT,
            about_team TEXT,
            hours_per_week TEXT,
            url TEXT NOT NULL,
            external_id TEXT NOT NULL UNIQUE,
            created_at TEXT DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_company_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS employer_companies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            normalized_name TEXT UNIQUE,
            domain TEXT,
            industry TEXT,
            size_range TEXT,
            headquarters TEXT,
            linkedin_url TEXT,
            logo_url TEXT,
            description TEXT,
            validated INTEGER DEFAULT 0,
            validated_at TEXT,
            validation_source TEXT,
            created_at TEXT DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Brand data scraped for company pages
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS company_brands (
            domain TEXT PRIMARY KEY,
            description TEXT,
            logo_url TEXT,
            colors TEXT,
            founded TEXT,
            employees TEXT,
            city TEXT,
            country TEXT,
            industries TEXT,
            slogan TEXT,
            socials TEXT,
            updated_at TEXT DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_repo_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS skills (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            category TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_skills (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            skill_id INTEGER REFERENCES skills(id),
            skill_name_raw TEXT,
            proficiency_level TEXT,
            years_experience REAL,
            context TEXT,
            confidence REAL,
            confirmed INTEGER DEFAULT 0,
            confirmed_at TEXT,
            created_at TEXT DEFAULT (datetime('now')),
            UNIQUE(user_id, skill_id),
            UNIQUE(user_id, skill_name_raw)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_experiences (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            employer_id INTEGER REFERENCES employer_companies(id),
            company_name_raw TEXT,
            role_title TEXT,
            role_type TEXT,
            start_year INTEGER,
            end_year INTEGER,
            is_current INTEGER DEFAULT 0,
            industry TEXT,
            achievements TEXT,
            team_size INTEGER,
            confidence REAL,
            confirmed INTEGER DEFAULT 0,
            confirmed_at TEXT,
            created_at TEXT DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_qualifications (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            qualification_type TEXT NOT NULL,
            name TEXT NOT NULL,
            institution TEXT,
            year_obtained INTEGER,
            confidence REAL,
            confirmed INTEGER DEFAULT 0,
            created_at TEXT DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_job_preferences (
            user_id TEXT PRIMARY KEY,
            role_types TEXT,
            preferred_locations TEXT,
            remote_preference TEXT,
            availability_days_per_week INTEGER,
            day_rate_min INTEGER,
            day_rate_max INTEGER,
            industries_preferred TEXT,
            company_stages TEXT,
            created_at TEXT DEFAULT (datetime('now')),
            updated_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_extraction_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS repo_pending_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            item_type TEXT NOT NULL CHECK (item_type IN ('skill', 'company', 'qualification', 'preference')),
            extracted_data TEXT NOT NULL,
            confidence REAL,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'confirmed', 'edited', 'rejected')),
            created_at TEXT DEFAULT (datetime('now')),
            resolved_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS extraction_sessions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            pending_extractions TEXT NOT NULL DEFAULT '[]',
            created_at TEXT DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_article_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS articles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            slug TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            content TEXT NOT NULL DEFAULT '',
            excerpt TEXT,
            status TEXT NOT NULL DEFAULT 'draft' CHECK (status IN ('draft', 'published')),
            app TEXT NOT NULL DEFAULT 'interim',
            category TEXT,
            generation_metadata TEXT,
            meta_description TEXT,
            hero_asset_url TEXT,
            hero_asset_alt TEXT,
            word_count INTEGER,
            is_featured INTEGER DEFAULT 0,
            created_at TEXT DEFAULT (datetime('now')),
            published_at TEXT,
            updated_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let indexes = [
        // Job indexes
        "CREATE INDEX IF NOT EXISTS idx_jobs_active_posted ON jobs(is_active, posted_date)",
        "CREATE INDEX IF NOT EXISTS idx_jobs_company_domain ON jobs(company_domain)",
        "CREATE INDEX IF NOT EXISTS idx_jobs_role_category ON jobs(role_category)",
        // Company indexes
        "CREATE INDEX IF NOT EXISTS idx_employer_companies_name ON employer_companies(name COLLATE NOCASE)",
        // Repo indexes
        "CREATE INDEX IF NOT EXISTS idx_user_skills_user ON user_skills(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_user_experiences_user ON user_experiences(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_user_qualifications_user ON user_qualifications(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_pending_items_user_status ON repo_pending_items(user_id, status)",
        // Article indexes
        "CREATE INDEX IF NOT EXISTS idx_articles_app_status ON articles(app, status, published_at)",
    ];

    for index in indexes {
        sqlx::query(index).execute(pool).await?;
    }

    Ok(())
}

/// In-memory database with the full schema, for tests
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    // One connection: every connection to `sqlite::memory:` is a separate database
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    run_migrations(&pool, false).await.unwrap();
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = test_pool().await;
        run_migrations(&pool, false).await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        for expected in [
            "articles",
            "company_brands",
            "employer_companies",
            "extraction_sessions",
            "jobs",
            "repo_pending_items",
            "skills",
            "user_experiences",
            "user_job_preferences",
            "user_qualifications",
            "user_skills",
        ] {
            assert!(tables.iter().any(|t| t == expected), "missing table {}", expected);
        }
    }

    #[tokio::test]
    async fn test_reset_drops_rows() {
        let pool = test_pool().await;
        sqlx::query("INSERT INTO skills (name, category) VALUES ('IFRS', 'finance')")
            .execute(&pool)
            .await
            .unwrap();

        run_migrations(&pool, true).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM skills")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
