//! Tests for auth module
//!
//! These tests verify admin authentication:
//! - JWT token round trip with the shared secret
//! - Admin allow-list enforcement
//! - Dev-mode bypass

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::common::config::AppConfig;
    use crate::common::ApiError;
    use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderValue};
    use super::super::extractors::authorize_admin;
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn test_jwt_encoding_and_decoding() {
        let claims = Claims::new("user-123", "ops@interim.quest", 3600);
        let token = issue_token(&claims, "test_secret_key").expect("Failed to encode token");

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret("test_secret_key".as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .expect("Failed to decode token");

        assert_eq!(decoded.claims.sub, "user-123");
        assert_eq!(decoded.claims.email, "ops@interim.quest");
    }

    #[test]
    fn test_admin_email_is_accepted_case_insensitively() {
        let config = AppConfig::for_tests();
        let token = issue_token(&Claims::new("u1", "Ops@Interim.Quest", 3600), &config.jwt_secret)
            .unwrap();

        let admin = authorize_admin(&bearer(&token), &config).unwrap();

        assert_eq!(admin.id, "u1");
        assert_eq!(admin.email, "Ops@Interim.Quest");
    }

    #[test]
    fn test_non_admin_is_forbidden() {
        let config = AppConfig::for_tests();
        let token = issue_token(&Claims::new("u2", "someone@example.com", 3600), &config.jwt_secret)
            .unwrap();

        let result = authorize_admin(&bearer(&token), &config);

        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn test_missing_or_bad_token_is_unauthorized() {
        let config = AppConfig::for_tests();

        let missing = authorize_admin(&HeaderMap::new(), &config);
        assert!(matches!(missing, Err(ApiError::Unauthorized(_))));

        let token = issue_token(&Claims::new("u1", "ops@interim.quest", 3600), "wrong_secret")
            .unwrap();
        let forged = authorize_admin(&bearer(&token), &config);
        assert!(matches!(forged, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_expired_token_is_unauthorized() {
        let config = AppConfig::for_tests();
        let token = issue_token(
            &Claims::new("u1", "ops@interim.quest", -3600),
            &config.jwt_secret,
        )
        .unwrap();

        let result = authorize_admin(&bearer(&token), &config);

        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_dev_mode_bypasses_token_check() {
        let mut config = AppConfig::for_tests();
        config.dev_mode.enabled = true;

        let admin = authorize_admin(&HeaderMap::new(), &config).unwrap();

        assert_eq!(admin.email, "dev@test.com");
    }
}
