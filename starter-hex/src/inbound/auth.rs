//! Authentication middleware for provider-issued session tokens.

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use starter_types::Repository;

use super::handlers::AppState;

/// Routes reachable without a session. Webhooks authenticate by signature.
const PUBLIC_PATHS: [&str; 4] = [
    "/health",
    "/api-docs/openapi.json",
    "/api/payment/webhook",
    "/api/webhooks/clerk",
];

/// Extracts the session token from the Authorization header.
/// Expected format: "Bearer <token>"
fn extract_bearer_token(auth_header: Option<&str>) -> Option<&str> {
    let token = auth_header?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

/// Authentication middleware that validates session tokens.
///
/// This middleware:
/// 1. Extracts the bearer token from the Authorization header
/// 2. Verifies it with the identity provider
/// 3. Stores the resulting `Session` in the request extensions
/// 4. Returns 401 Unauthorized if verification fails
pub async fn auth_middleware<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if PUBLIC_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let Some(token) = extract_bearer_token(auth_header) else {
        return unauthorized_response();
    };

    match state.service.authenticate(token).await {
        Ok(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(_) => unauthorized_response(),
    }
}

fn unauthorized_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "Unauthorized",
            "code": 401
        })),
    )
        .into_response()
}
