//! Paging query extractor.

use axum::{
    async_trait,
    extract::{FromRequestParts, OriginalUri},
    http::{header::HOST, request::Parts},
};
use axum_extra::extract::Query;

use crate::config::FORWARDED_PROTO_HEADER;
use crate::errors::AppError;
use crate::types::PageQuery;

/// `page`, `size` and repeatable `sort` query parameters plus the request
/// URI they were sent to, for building `Link` headers.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub query: PageQuery,
    /// Absolute URI without query string when the request carries a
    /// `Host` header (scheme from `X-Forwarded-Proto`, else `http`), the
    /// bare path otherwise.
    pub base: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<PageQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::bad_request(e.to_string()))?;

        let path = match parts.extensions.get::<OriginalUri>() {
            Some(OriginalUri(uri)) => uri.path().to_string(),
            None => parts.uri.path().to_string(),
        };
        let base = match header_value(parts, HOST.as_str()) {
            Some(host) => {
                let scheme = header_value(parts, FORWARDED_PROTO_HEADER).unwrap_or("http");
                format!("{scheme}://{host}{path}")
            }
            None => path,
        };

        Ok(Self { query, base })
    }
}

/// First value of a possibly comma separated header.
fn header_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn base_for(request: Request<()>) -> String {
        let (mut parts, _) = request.into_parts();
        Pagination::from_request_parts(&mut parts, &()).await.unwrap().base
    }

    #[tokio::test]
    async fn test_base_without_host_is_the_path() {
        let request = Request::builder().uri("/api/projects?page=1").body(()).unwrap();
        assert_eq!(base_for(request).await, "/api/projects");
    }

    #[tokio::test]
    async fn test_base_defaults_to_http() {
        let request = Request::builder()
            .uri("/api/projects")
            .header(HOST, "localhost:8080")
            .body(())
            .unwrap();
        assert_eq!(base_for(request).await, "http://localhost:8080/api/projects");
    }

    #[tokio::test]
    async fn test_base_honours_forwarded_proto() {
        let request = Request::builder()
            .uri("/api/projects")
            .header(HOST, "tasks.example.com")
            .header(FORWARDED_PROTO_HEADER, "https, http")
            .body(())
            .unwrap();
        assert_eq!(base_for(request).await, "https://tasks.example.com/api/projects");
    }
}
