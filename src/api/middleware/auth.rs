//! Bearer token authentication and route-level authorization.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::config::BEARER_TOKEN_PREFIX;
use crate::domain::Authentication;
use crate::errors::AppError;

/// Authentication middleware, applied to every route.
///
/// A request without a bearer token passes through anonymously. A bearer
/// token that fails verification ends the request with 401. A verified
/// token gets its local user provisioned and the resulting
/// [`Authentication`] inserted into the request extensions.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
        .map(|t| t.trim().to_string());

    if let Some(token) = token {
        let auth = state.auth_service.authenticate(&token).await.map_err(|e| {
            tracing::debug!(error = %e, "Bearer token rejected");
            match e {
                AppError::Jwt(_) => e,
                _ => AppError::Unauthorized,
            }
        })?;

        // Non-fatal: resolving a still-missing user later yields 401
        if let Err(e) = state.auth_service.provision(&auth).await {
            tracing::warn!(error = %e, "User provisioning failed");
        }

        request.extensions_mut().insert(auth);
    }

    Ok(next.run(request).await)
}

/// Reject anonymous requests.
pub async fn require_authenticated(request: Request, next: Next) -> Result<Response, AppError> {
    if request.extensions().get::<Authentication>().is_none() {
        return Err(AppError::Unauthorized);
    }
    Ok(next.run(request).await)
}

/// Reject requests without the admin authority.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    match request.extensions().get::<Authentication>() {
        None => Err(AppError::Unauthorized),
        Some(auth) if !auth.is_admin() => Err(AppError::Forbidden),
        Some(_) => Ok(next.run(request).await),
    }
}
