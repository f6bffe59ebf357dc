//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use starter_types::domain::{Currency, User, UserId};
use starter_types::dto::{
    CreateOrderRequest, CreateOrderResponse, ErrorDetail, ErrorResponse, ExampleFormRequest,
    ExampleFormResponse, HealthResponse, MessageResponse, SuccessResponse, UpdateUserRequest,
    VerifyPaymentRequest,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse, example = json!({"status": "ok"}))
    )
)]
async fn health() {}

/// Current user, created on first request from the identity provider profile
#[utoipa::path(
    get,
    path = "/api/user",
    tag = "user",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User not found at the identity provider", body = ErrorResponse)
    )
)]
async fn get_user() {}

/// Update the current user's profile
#[utoipa::path(
    patch,
    path = "/api/user",
    tag = "user",
    request_body = UpdateUserRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
async fn update_user() {}

/// Create a payment order at the gateway
#[utoipa::path(
    post,
    path = "/api/payment/create-order",
    tag = "payments",
    request_body = CreateOrderRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order created", body = CreateOrderResponse),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Gateway failure", body = ErrorResponse)
    )
)]
async fn create_order() {}

/// Verify a checkout callback signature and complete the order
#[utoipa::path(
    post,
    path = "/api/payment/verify",
    tag = "payments",
    request_body = VerifyPaymentRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Payment verified", body = SuccessResponse),
        (status = 400, description = "Invalid signature", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    )
)]
async fn verify_payment() {}

/// Payment gateway webhook, authenticated by the `x-razorpay-signature` header
#[utoipa::path(
    post,
    path = "/api/payment/webhook",
    tag = "webhooks",
    request_body(content = inline(serde_json::Value), description = "Gateway event payload"),
    params(
        ("x-razorpay-signature" = String, Header, description = "Hex HMAC-SHA256 of the raw body")
    ),
    responses(
        (status = 200, description = "Event processed", body = SuccessResponse),
        (status = 400, description = "Missing or invalid signature", body = ErrorResponse)
    )
)]
async fn payment_webhook() {}

/// Identity provider webhook, authenticated by svix headers
#[utoipa::path(
    post,
    path = "/api/webhooks/clerk",
    tag = "webhooks",
    request_body(content = inline(serde_json::Value), description = "Identity event payload"),
    params(
        ("svix-id" = String, Header, description = "Message identifier"),
        ("svix-timestamp" = String, Header, description = "Unix timestamp in seconds"),
        ("svix-signature" = String, Header, description = "Space separated `v1,<base64>` signatures")
    ),
    responses(
        (status = 200, description = "Event processed", body = MessageResponse),
        (status = 400, description = "Missing headers, invalid signature or payload", body = ErrorResponse)
    )
)]
async fn identity_webhook() {}

/// Validated example form submission
#[utoipa::path(
    post,
    path = "/api/example-form",
    tag = "forms",
    request_body = ExampleFormRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Form accepted", body = ExampleFormResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
async fn example_form() {}

/// OpenAPI documentation for the starter API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Starter Backend API",
        version = "1.0.0",
        description = "User sync, payment orders and webhooks for the starter kit.\n\n## Authentication\n\nUser endpoints require a session token issued by the identity provider:\n\n```\nAuthorization: Bearer <session token>\n```\n\nWebhook endpoints are authenticated by their signature headers instead.",
        license(name = "MIT"),
    ),
    paths(
        health,
        get_user,
        update_user,
        create_order,
        verify_payment,
        payment_webhook,
        identity_webhook,
        example_form,
    ),
    components(
        schemas(
            User,
            UserId,
            Currency,
            HealthResponse,
            SuccessResponse,
            MessageResponse,
            ErrorResponse,
            ErrorDetail,
            UpdateUserRequest,
            CreateOrderRequest,
            CreateOrderResponse,
            VerifyPaymentRequest,
            ExampleFormRequest,
            ExampleFormResponse,
        )
    ),

    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "user", description = "Current user profile"),
        (name = "payments", description = "Order creation and payment verification"),
        (name = "webhooks", description = "Inbound gateway and identity provider events"),
        (name = "forms", description = "Validated form submission"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for Bearer token authentication.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
