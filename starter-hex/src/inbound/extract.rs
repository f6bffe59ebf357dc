//! Request extractors.

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use starter_types::{AppError, FieldError, Validate, ValidationErrors};

use super::handlers::ApiError;

/// JSON body that has passed its [`Validate`] rules.
///
/// Unparseable bodies are reported as a single `body` field error so every
/// 400 shares the `details` shape.
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                ApiError(AppError::Validation(ValidationErrors::from(vec![
                    FieldError::new("body", rejection.body_text()),
                ])))
            })?;

        value.validate()?;
        Ok(Self(value))
    }
}
