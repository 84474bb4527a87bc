//! Path extractor for UUID path parameters.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::{AppError, FieldErrors};

const MSG_INVALID_UUID: &str = "must be a valid UUID";

/// Path parameters that are all UUIDs.
///
/// Every malformed segment is reported as a validation error keyed by the
/// segment name, so `/api/projects/abc` yields `fieldErrors.projectId`.
/// `T` is deserialized from the segments by name.
pub struct ValidatedPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidatedPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(segments) = Path::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;

        let mut fields = FieldErrors::new();
        let mut params = Map::new();
        for (name, raw) in segments {
            match Uuid::parse_str(&raw) {
                Ok(id) => {
                    params.insert(name, Value::String(id.to_string()));
                }
                Err(_) => fields.entry(name).or_default().push(MSG_INVALID_UUID.to_string()),
            }
        }
        if !fields.is_empty() {
            return Err(AppError::Validation(fields));
        }

        serde_json::from_value(Value::Object(params))
            .map(ValidatedPath)
            .map_err(|e| AppError::internal(format!("path parameters do not match: {}", e)))
    }
}
