//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::models::Claims;
use crate::common::config::AppConfig;
use crate::common::{safe_email_log, ApiError, AppState};

const DEV_USER_ID: &str = "dev-user";

/// Admin caller extractor
///
/// Validates the bearer JWT and requires the token's email to be in `ADMIN_EMAILS`.
/// With `DEV_MODE=true` every request is treated as the configured dev user.
#[derive(Debug)]
pub struct AdminUser {
    pub id: String,
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let app_state = state_lock.read().await;
        authorize_admin(&parts.headers, &app_state.config)
    }
}

/// Resolves the admin caller from request headers
pub fn authorize_admin(headers: &HeaderMap, config: &AppConfig) -> Result<AdminUser, ApiError> {
    if config.dev_mode.is_enabled() {
        debug!(
            email = %safe_email_log(&config.dev_mode.user_email),
            "DEV MODE: Authentication bypassed"
        );
        return Ok(AdminUser {
            id: DEV_USER_ID.to_string(),
            email: config.dev_mode.user_email.clone(),
        });
    }

    let token = match headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok()) {
        Some(t) => t,
        None => {
            warn!("Authentication failed: missing Authorization header");
            return Err(ApiError::Unauthorized("missing auth".into()));
        }
    };

    // Handle "Bearer <token>" format or raw token
    let bare_token = token.strip_prefix("Bearer ").unwrap_or(token);

    let claims = match decode::<Claims>(
        bare_token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    ) {
        Ok(d) => d.claims,
        Err(e) => {
            warn!(error = %e, "JWT token validation failed");
            return Err(ApiError::Unauthorized("invalid token".into()));
        }
    };

    if !config.admin_emails.contains(&claims.email.to_lowercase()) {
        warn!(
            user_id = %claims.sub,
            email = %safe_email_log(&claims.email),
            "Admin access denied"
        );
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    debug!(
        user_id = %claims.sub,
        email = %safe_email_log(&claims.email),
        "Admin authentication successful"
    );

    Ok(AdminUser {
        id: claims.sub,
        email: claims.email,
    })
}
