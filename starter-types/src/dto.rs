//! Data Transfer Objects (DTOs) for requests and responses.
//!
//! Request bodies default missing fields so that [`Validate`] can report each
//! one by name instead of failing on the first absent key.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Currency, UserChanges};
use crate::validation::{FieldError, Validate, ValidationErrors, check_email, check_name};

// ─────────────────────────────────────────────────────────────────────────────
// Common DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Liveness probe response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
}

/// `{"success": true}`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Acknowledgement with a human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Webhook received")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Invalid input")]
    pub error: String,
    #[schema(example = 400)]
    pub code: u16,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ErrorDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    pub field: String,
    pub message: String,
}

impl From<&FieldError> for ErrorDetail {
    fn from(err: &FieldError) -> Self {
        Self {
            field: err.field.clone(),
            message: err.message.clone(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Profile update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateUserRequest {
    /// Display name, 2 to 50 characters
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Ada Lovelace")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            check_name(&mut errors, "name", name);
        }
        if let Some(email) = &self.email {
            check_email(&mut errors, "email", email);
        }
        errors.into_result()
    }
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Payment DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to start a payment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateOrderRequest {
    /// Amount in major units (e.g. rupees); must be at least 1
    #[schema(example = 100.0)]
    pub amount: Option<f64>,
    /// Defaults to INR
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
}

impl Validate for CreateOrderRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match self.amount {
            Some(amount) if amount.is_finite() && amount >= 1.0 => {}
            _ => errors.push("amount", "Invalid amount"),
        }
        errors.into_result()
    }
}

/// Checkout parameters for the client-side payment widget.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    /// Gateway order ID
    #[schema(example = "order_NXt1Rk3bq2xYzA")]
    pub order_id: String,
    /// Amount in minor units
    #[schema(example = 10000)]
    pub amount: i64,
    pub currency: Currency,
    /// Public gateway key
    #[schema(example = "rzp_test_1DP5mmOlF5G5ag")]
    pub key_id: String,
}

/// Checkout callback forwarded by the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct VerifyPaymentRequest {
    #[schema(example = "order_NXt1Rk3bq2xYzA")]
    pub razorpay_order_id: String,
    #[schema(example = "pay_NXt1uFj8Wb1r2Q")]
    pub razorpay_payment_id: String,
    /// Hex HMAC-SHA256 over `"<order_id>|<payment_id>"`
    pub razorpay_signature: String,
}

impl Validate for VerifyPaymentRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for (field, value) in [
            ("razorpay_order_id", &self.razorpay_order_id),
            ("razorpay_payment_id", &self.razorpay_payment_id),
            ("razorpay_signature", &self.razorpay_signature),
        ] {
            if value.trim().is_empty() {
                errors.push(field, "Required");
            }
        }
        errors.into_result()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Example form DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Demonstration form exercising every validation rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ExampleFormRequest {
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = 36)]
    pub age: Option<f64>,
    #[schema(example = "feedback")]
    pub category: String,
    pub message: String,
    pub terms: bool,
}

impl Validate for ExampleFormRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        check_name(&mut errors, "name", &self.name);
        check_email(&mut errors, "email", &self.email);

        match self.age {
            None => errors.push("age", "Age is required"),
            Some(age) if age.is_nan() || age < 18.0 => errors.push("age", "Must be at least 18"),
            Some(age) if age > 120.0 => errors.push("age", "Invalid age"),
            Some(_) => {}
        }

        if self.category.is_empty() {
            errors.push("category", "Please select a category");
        }
        if self.message.chars().count() < 10 {
            errors.push("message", "Message must be at least 10 characters");
        }
        if !self.terms {
            errors.push("terms", "You must accept the terms and conditions");
        }

        errors.into_result()
    }
}

/// Echo of an accepted example form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExampleFormResponse {
    pub success: bool,
    pub data: ExampleFormRequest,
}
