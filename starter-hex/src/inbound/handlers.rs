//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Extension, Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use utoipa::OpenApi;

use starter_types::{
    AppError, CreateOrderRequest, ErrorDetail, ErrorResponse, ExampleFormRequest, HealthResponse,
    IdentityWebhook, Repository, Session, UpdateUserRequest, ValidationErrors,
    VerifyPaymentRequest,
};

use super::extract::ValidJson;
use crate::AppService;
use crate::openapi::ApiDoc;

pub const PAYMENT_SIGNATURE_HEADER: &str = "x-razorpay-signature";
pub const SVIX_ID_HEADER: &str = "svix-id";
pub const SVIX_TIMESTAMP_HEADER: &str = "svix-timestamp";
pub const SVIX_SIGNATURE_HEADER: &str = "svix-signature";

/// Application state shared across handlers.
pub struct AppState<R: Repository> {
    pub service: AppService<R>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError(AppError::Validation(errors))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, Vec::new()),
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Invalid input".to_string(),
                errors.fields().iter().map(ErrorDetail::from).collect(),
            ),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, Vec::new()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, Vec::new()),
            AppError::Upstream(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, Vec::new()),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Vec::new(),
                )
            }
        };

        let body = ErrorResponse {
            error: message,
            code: status.as_u16(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Machine-readable API description.
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ─────────────────────────────────────────────────────────────────────────────
// User
// ─────────────────────────────────────────────────────────────────────────────

/// Current user, created lazily from the identity provider profile.
#[tracing::instrument(skip(state), fields(provider_id = %session.provider_id))]
pub async fn get_user<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.service.current_user(&session).await?;
    Ok(Json(user))
}

#[tracing::instrument(skip(state, req), fields(provider_id = %session.provider_id))]
pub async fn update_user<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(session): Extension<Session>,
    ValidJson(req): ValidJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.service.update_user(&session, req).await?;
    Ok(Json(user))
}

// ─────────────────────────────────────────────────────────────────────────────
// Payments
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state), fields(provider_id = %session.provider_id))]
pub async fn create_order<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(session): Extension<Session>,
    ValidJson(req): ValidJson<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.service.create_order(&session, req).await?;
    Ok(Json(order))
}

#[tracing::instrument(
    skip(state, req),
    fields(provider_id = %session.provider_id, gateway_order_id = %req.razorpay_order_id)
)]
pub async fn verify_payment<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(session): Extension<Session>,
    ValidJson(req): ValidJson<VerifyPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state.service.verify_payment(&session, req).await?;
    Ok(Json(result))
}

/// Payment gateway webhook. Authenticated by body signature, not by session.
#[tracing::instrument(skip_all)]
pub async fn payment_webhook<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let signature = header_str(&headers, PAYMENT_SIGNATURE_HEADER);
    let result = state
        .service
        .handle_payment_webhook(&body, signature)
        .await?;
    Ok(Json(result))
}

// ─────────────────────────────────────────────────────────────────────────────
// Identity webhooks
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip_all)]
pub async fn identity_webhook<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let webhook = svix_headers(&headers)
        .ok_or_else(|| AppError::BadRequest("Missing svix headers".into()))?;
    let result = state
        .service
        .handle_identity_webhook(&webhook, &body)
        .await?;
    Ok(Json(result))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn svix_headers(headers: &HeaderMap) -> Option<IdentityWebhook> {
    Some(IdentityWebhook {
        message_id: header_str(headers, SVIX_ID_HEADER)?.to_string(),
        timestamp: header_str(headers, SVIX_TIMESTAMP_HEADER)?.to_string(),
        signature: header_str(headers, SVIX_SIGNATURE_HEADER)?.to_string(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Forms
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state, form), fields(provider_id = %session.provider_id))]
pub async fn example_form<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(session): Extension<Session>,
    ValidJson(form): ValidJson<ExampleFormRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.submit_example_form(&session, form)))
}
