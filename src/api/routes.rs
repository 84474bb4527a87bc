//! Application route configuration.

use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    extract::Request,
    http::{header, HeaderName, Response, StatusCode},
    middleware,
    response::IntoResponse,
    BoxError, Router,
};
use tower::{timeout::error::Elapsed, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::Span;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    account_routes, admin_routes, health_routes, project_routes, task_routes, user_routes,
};
use super::middleware::{authenticate, require_admin, require_authenticated};
use super::openapi::ApiDoc;
use super::AppState;
use crate::config::TOTAL_COUNT_HEADER;
use crate::errors::AppError;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    // Caller must be authenticated
    let authenticated = Router::new()
        .merge(account_routes())
        .merge(project_routes())
        .merge(task_routes())
        .route_layer(middleware::from_fn(require_authenticated));

    // Caller must hold ROLE_ADMIN
    let admin = admin_routes().route_layer(middleware::from_fn(require_admin));

    Router::new()
        // Public: health, docs, registration
        .merge(health_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/v3/api-docs", ApiDoc::openapi()))
        .merge(user_routes())
        .merge(authenticated)
        .merge(admin)
        .fallback(route_not_found)
        // Global middleware, innermost first
        .layer(middleware::map_response(method_not_allowed))
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(state.request_timeout),
        )
        .layer(cors_layer())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request| {
                    tracing::info_span!(
                        "http_request",
                        method = %req.method(),
                        path = %req.uri().path(),
                    )
                })
                .on_response(|res: &Response<_>, latency: Duration, _span: &Span| {
                    tracing::info!(
                        status = res.status().as_u16(),
                        latency_ms = latency.as_millis() as u64,
                        "request completed"
                    );
                }),
        )
        .with_state(state)
}

/// Lets browser clients read the paging headers.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([header::LINK, header::LOCATION, HeaderName::from_static(TOTAL_COUNT_HEADER)])
}

async fn route_not_found() -> AppError {
    AppError::not_found("No handler for this path")
}

/// Give the router's bare 405 the error envelope.
async fn method_not_allowed(response: Response<axum::body::Body>) -> axum::response::Response {
    if response.status() == StatusCode::METHOD_NOT_ALLOWED
        && !response.headers().contains_key(header::CONTENT_TYPE)
    {
        let (mut parts, _) = response.into_parts();
        parts.headers.remove(header::CONTENT_LENGTH);
        let mut envelope = AppError::MethodNotAllowed.into_response();
        // Keep `Allow`
        parts.headers.extend(envelope.headers_mut().drain());
        return (parts, envelope.into_body()).into_response();
    }
    response
}

async fn handle_middleware_error(err: BoxError) -> AppError {
    if err.is::<Elapsed>() {
        tracing::warn!("Request exceeded its deadline");
        AppError::Timeout
    } else {
        AppError::internal(err.to_string())
    }
}
