// src/logging_middleware.rs
//! Middleware for logging request and response bodies in debug mode

use axum::body::to_bytes;
use axum::{body::Body, extract::Request, http::StatusCode, middleware::Next, response::Response};
use tracing::{debug, enabled, Level};

/// Bodies above this size are logged as a prefix only
const MAX_LOGGED_BODY: usize = 2048;

/// Upper bound on bodies buffered for logging; transcripts can be large
const MAX_BUFFERED_BODY: usize = 4 * 1024 * 1024;

/// Logs JSON request and response bodies when debug logging is enabled
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    if !enabled!(Level::DEBUG) {
        return Ok(next.run(request).await);
    }

    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, MAX_BUFFERED_BODY)
        .await
        .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE)?;

    if let Some(body) = loggable(&bytes) {
        debug!(
            method = %parts.method,
            uri = %parts.uri,
            request_body = %body,
            "📥 Request"
        );
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, MAX_BUFFERED_BODY)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if let Some(body) = loggable(&bytes) {
        debug!(status = %parts.status, response_body = %body, "📤 Response");
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}

/// UTF-8 body text cut to `MAX_LOGGED_BODY` bytes on a char boundary
fn loggable(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    let text = std::str::from_utf8(bytes).ok()?;
    if text.len() <= MAX_LOGGED_BODY {
        return Some(text.to_string());
    }

    let mut end = MAX_LOGGED_BODY;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    Some(format!("{}… ({} bytes)", &text[..end], text.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loggable_skips_empty_and_binary() {
        assert_eq!(loggable(b""), None);
        assert_eq!(loggable(&[0xff, 0xfe]), None);
    }

    #[test]
    fn test_loggable_truncates_on_char_boundary() {
        let body = "é".repeat(MAX_LOGGED_BODY);
        let logged = loggable(body.as_bytes()).unwrap();
        assert!(logged.ends_with(&format!("({} bytes)", body.len())));
        assert!(logged.len() < body.len());

        assert_eq!(loggable(br#"{"ok":true}"#).unwrap(), r#"{"ok":true}"#);
    }
}
