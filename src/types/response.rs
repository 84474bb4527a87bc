//! Response helpers shared by handlers.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::pagination::Page;
use crate::config::TOTAL_COUNT_HEADER;

/// `201 Created` with a `Location` header.
pub struct Created<T: Serialize> {
    pub location: String,
    pub body: T,
}

impl<T: Serialize> Created<T> {
    pub fn at(location: impl Into<String>, body: T) -> Self {
        Self {
            location: location.into(),
            body,
        }
    }
}

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        let mut response = (StatusCode::CREATED, Json(self.body)).into_response();
        if let Ok(value) = HeaderValue::from_str(&self.location) {
            response.headers_mut().insert(header::LOCATION, value);
        }
        response
    }
}

/// `204 No Content`
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> Response {
        StatusCode::NO_CONTENT.into_response()
    }
}

/// A page rendered as a bare JSON array with `Link` and `X-Total-Count`.
pub struct Paged<T: Serialize> {
    pub page: Page<T>,
    /// Request URI without query string.
    pub base: String,
}

impl<T: Serialize> Paged<T> {
    pub fn new(page: Page<T>, base: impl Into<String>) -> Self {
        Self {
            page,
            base: base.into(),
        }
    }
}

impl<T: Serialize> IntoResponse for Paged<T> {
    fn into_response(self) -> Response {
        let link = self.page.link_header(&self.base);
        let total = self.page.total;
        let mut response = Json(self.page.items).into_response();

        let headers = response.headers_mut();
        if let Ok(value) = HeaderValue::from_str(&link) {
            headers.insert(header::LINK, value);
        }
        headers.insert(TOTAL_COUNT_HEADER, HeaderValue::from(total));
        response
    }
}
