use crate::errors::ServiceError;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Shared secret expected on protected routes
#[derive(Clone)]
pub struct ApiKeyState {
    expected: Arc<str>,
}

impl ApiKeyState {
    pub fn new(key: &str) -> Self {
        Self {
            expected: Arc::from(key),
        }
    }
}

fn presented_key(request: &Request) -> Option<&str> {
    if let Some(key) = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        return Some(key.trim());
    }

    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Constant-time comparison
fn keys_match(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Rejects requests lacking the configured key via `x-api-key` or
/// `Authorization: Bearer`.
pub async fn api_key_middleware(
    State(state): State<ApiKeyState>,
    request: Request,
    next: Next,
) -> Response {
    match presented_key(&request) {
        Some(key) if keys_match(key, &state.expected) => next.run(request).await,
        Some(_) => ServiceError::Unauthorized("invalid API key".into()).into_response(),
        None => ServiceError::Unauthorized(format!(
            "missing API key; send {} or Authorization: Bearer",
            API_KEY_HEADER
        ))
        .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::get,
        Router,
    };
    use rstest::rstest;
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn_with_state(
                ApiKeyState::new("s3cret"),
                api_key_middleware,
            ))
    }

    #[rstest]
    #[case(Some((API_KEY_HEADER, "s3cret")), StatusCode::OK)]
    #[case(Some(("authorization", "Bearer s3cret")), StatusCode::OK)]
    #[case(Some((API_KEY_HEADER, "wrong")), StatusCode::UNAUTHORIZED)]
    #[case(Some(("authorization", "Basic s3cret")), StatusCode::UNAUTHORIZED)]
    #[case(None, StatusCode::UNAUTHORIZED)]
    #[tokio::test]
    async fn enforces_key(#[case] header: Option<(&str, &str)>, #[case] expected: StatusCode) {
        let mut builder = HttpRequest::builder().uri("/");
        if let Some((name, value)) = header {
            builder = builder.header(name, value);
        }
        let response = app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), expected);
    }

    #[test]
    fn comparison_rejects_prefixes() {
        assert!(keys_match("abc", "abc"));
        assert!(!keys_match("ab", "abc"));
        assert!(!keys_match("abd", "abc"));
    }
}
