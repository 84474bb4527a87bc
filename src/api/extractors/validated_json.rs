//! Validated JSON extractor - Combines deserialization with validation.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::errors::AppError;

/// Validated JSON extractor that automatically validates requests.
///
/// A body that is not valid JSON for `T` is a bad request carrying the
/// rejection text. A body that violates field rules is a validation error
/// with one entry per offending field.
///
/// # Example
///
/// ```rust,ignore
/// use taskmanager::api::extractors::ValidatedJson;
/// use taskmanager::domain::ProjectRequest;
///
/// async fn create_project(ValidatedJson(payload): ValidatedJson<ProjectRequest>) {
///     // payload.name is already 3..100 chars and not blank
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}
