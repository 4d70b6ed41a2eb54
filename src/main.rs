// src/main.rs
use axum::{extract::Extension, middleware, Router};
use dotenv::dotenv;
use reqwest::Client;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::PathBuf;
use std::{net::SocketAddr, str::FromStr, sync::Arc, time::Duration};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod articles;
mod auth;
mod common;
mod companies;
mod extraction;
mod jobs;
mod logging_middleware;
mod repo;
mod services;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use auth::models::TOKEN_TTL_SECONDS;
use auth::{issue_token, Claims};
use common::config::AppConfig;
use common::AppState;

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let config = AppConfig::from_env();

    // `interim-api issue-token <email>` prints an admin token and exits
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("issue-token") {
        let email = args
            .get(1)
            .ok_or_else(|| anyhow::anyhow!("usage: interim-api issue-token <email>"))?;
        let claims = Claims::new(email, email, TOKEN_TTL_SECONDS);
        println!("{}", issue_token(&claims, &config.jwt_secret)?);
        return Ok(());
    }

    config.log_summary();

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    if let Some(path_part) = config.database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options =
        SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    common::migrations::run_migrations(&pool, config.reset_db).await?;

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    // Per-request limits are set by each client; this bounds the handshake for all of them
    let http_client = Client::builder()
        .no_proxy()
        .connect_timeout(Duration::from_secs(10))
        .build()?;
    let port = config.port;
    let cors_origins = config.cors_origins.clone();

    let shared = Arc::new(RwLock::new(AppState::new(pool, http_client, config)));

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        // ====================================================================
        // JOB ROUTES (Public and Admin)
        // ====================================================================
        .merge(jobs::jobs_routes())
        // ====================================================================
        // COMPANY ROUTES (Validation cascade and confirmation)
        // ====================================================================
        .merge(companies::companies_routes())
        // ====================================================================
        // EXTRACTION ROUTES (Pending items and confirmation)
        // ====================================================================
        .merge(extraction::extraction_routes())
        // ====================================================================
        // REPO ROUTES (Profile, Experiences, Onboarding, Graph)
        // ====================================================================
        .merge(repo::repo_routes())
        // ====================================================================
        // ARTICLE ROUTES
        // ====================================================================
        .merge(articles::articles_routes())
        // ====================================================================
        // MIDDLEWARE AND LAYERS
        // ====================================================================
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(Extension(shared))
        .layer({
            let origins: Vec<axum::http::HeaderValue> = cors_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::DELETE,
                    axum::http::Method::PATCH,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                    axum::http::HeaderName::from_static("x-request-id"),
                ])
                .allow_credentials(true)
        })
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
