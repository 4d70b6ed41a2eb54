//! Authentication data models

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

/// Default lifetime of tokens minted by `issue-token`
pub const TOKEN_TTL_SECONDS: i64 = 60 * 60 * 24 * 7;

/// JWT claims structure
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
}

impl Claims {
    pub fn new(sub: &str, email: &str, ttl_seconds: i64) -> Self {
        let exp = chrono::Utc::now().timestamp() + ttl_seconds;
        Self {
            sub: sub.to_string(),
            email: email.to_string(),
            exp: exp.max(0) as usize,
        }
    }
}

/// Signs `claims` with the shared HS256 secret
pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}
