//! Current user extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::api::AppState;
use crate::domain::Authentication;
use crate::errors::AppError;

/// Local user id of the caller.
///
/// Resolved from the [`Authentication`] the auth middleware attached to the
/// request; fails with 401 when it maps to no local user.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth = parts.extensions.get::<Authentication>();
        let id = state.auth_service.resolve_user_id(auth).await?;
        Ok(Self(id))
    }
}
