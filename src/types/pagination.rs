//! Pagination and sorting for list endpoints.
//!
//! Query input is decoded into [`PageQuery`], turned into a [`PageRequest`]
//! (range checked or clamped, sort restricted to an allowlist) and answered
//! with a [`Page`], which renders the RFC 5988 `Link` header.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, DEFAULT_SORT_PROPERTY, MAX_PAGE_SIZE};
use crate::errors::{AppError, AppResult, FieldErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }

    fn parse(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("asc") {
            Some(Direction::Asc)
        } else if token.eq_ignore_ascii_case("desc") {
            Some(Direction::Desc)
        } else {
            None
        }
    }
}

/// One `(property, direction)` sort directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub property: String,
    pub direction: Direction,
}

impl SortOrder {
    pub fn new(property: impl Into<String>, direction: Direction) -> Self {
        Self {
            property: property.into(),
            direction,
        }
    }

    pub fn asc(property: impl Into<String>) -> Self {
        Self::new(property, Direction::Asc)
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self::new(property, Direction::Desc)
    }
}

/// Parse `sort` query values.
///
/// Each value is a comma separated list of `property,direction` pairs. The
/// token after a property is always its direction; anything other than
/// `asc`/`desc` there (or nothing) sorts ascending. This accepts both
/// `sort=name,desc` and the joined form emitted in `Link` headers
/// (`sort=name,DESC,createdAt,ASC`).
pub fn parse_sort(values: &[String]) -> Vec<SortOrder> {
    let mut orders = Vec::new();
    for value in values {
        let tokens: Vec<&str> = value
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();
        for pair in tokens.chunks(2) {
            let direction = pair
                .get(1)
                .and_then(|d| Direction::parse(d))
                .unwrap_or(Direction::Asc);
            orders.push(SortOrder::new(pair[0], direction));
        }
    }
    orders
}

/// Keep only allowed properties, in request order.
///
/// Falls back to `createdAt DESC` when nothing survives.
pub fn sanitize_sort(orders: Vec<SortOrder>, allowed: &[&str]) -> Vec<SortOrder> {
    let kept: Vec<SortOrder> = orders
        .into_iter()
        .filter(|o| allowed.contains(&o.property.as_str()))
        .collect();

    if kept.is_empty() {
        vec![SortOrder::desc(DEFAULT_SORT_PROPERTY)]
    } else {
        kept
    }
}

/// Raw `page`, `size` and `sort` query parameters.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Zero-based page index
    pub page: Option<i64>,
    /// Page size (1..100)
    pub size: Option<i64>,
    /// Sort directives: `property,(asc|desc)`; repeatable
    #[serde(default)]
    pub sort: Vec<String>,
}

impl PageQuery {
    /// Reject out of range values with field errors.
    pub fn checked(&self, allowed: &[&str]) -> AppResult<PageRequest> {
        let page = self.page.unwrap_or(DEFAULT_PAGE_NUMBER as i64);
        let size = self.size.unwrap_or(DEFAULT_PAGE_SIZE as i64);

        let mut fields = FieldErrors::new();
        if page < 0 {
            fields
                .entry("page".to_string())
                .or_default()
                .push("must be greater than or equal to 0".to_string());
        }
        if !(1..=MAX_PAGE_SIZE as i64).contains(&size) {
            fields
                .entry("size".to_string())
                .or_default()
                .push(format!("must be between 1 and {}", MAX_PAGE_SIZE));
        }
        if !fields.is_empty() {
            return Err(AppError::Validation(fields));
        }

        Ok(PageRequest::new(page as u64, size as u64, self.sort(allowed)))
    }

    /// Clamp out of range values into range.
    pub fn clamped(&self, allowed: &[&str]) -> PageRequest {
        let page = self.page.unwrap_or(DEFAULT_PAGE_NUMBER as i64).max(0);
        let size = self
            .size
            .unwrap_or(DEFAULT_PAGE_SIZE as i64)
            .clamp(1, MAX_PAGE_SIZE as i64);

        PageRequest::new(page as u64, size as u64, self.sort(allowed))
    }

    fn sort(&self, allowed: &[&str]) -> Vec<SortOrder> {
        sanitize_sort(parse_sort(&self.sort), allowed)
    }
}

/// Validated paging input handed to repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
    pub sort: Vec<SortOrder>,
}

impl PageRequest {
    pub fn new(page: u64, size: u64, sort: Vec<SortOrder>) -> Self {
        Self { page, size, sort }
    }

    /// Rows to skip, capped at `i64::MAX` so it always binds as a SQL bigint.
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size).min(i64::MAX as u64)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(
            DEFAULT_PAGE_NUMBER,
            DEFAULT_PAGE_SIZE,
            vec![SortOrder::desc(DEFAULT_SORT_PROPERTY)],
        )
    }
}

/// One page of results plus what is needed to link to its neighbours.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub request: PageRequest,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            request,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.request.size == 0 {
            0
        } else {
            self.total.div_ceil(self.request.size)
        }
    }

    pub fn has_previous(&self) -> bool {
        self.request.page > 0
    }

    pub fn has_next(&self) -> bool {
        self.request.page + 1 < self.total_pages()
    }

    /// `Link` header value for this page, relative to `base` (a URI
    /// without query string).
    pub fn link_header(&self, base: &str) -> String {
        let last = self.total_pages().saturating_sub(1);
        let mut links = Vec::with_capacity(4);

        if self.has_previous() {
            links.push(self.link(base, self.request.page - 1, "prev"));
        }
        links.push(self.link(base, 0, "first"));
        links.push(self.link(base, last, "last"));
        if self.has_next() {
            links.push(self.link(base, self.request.page + 1, "next"));
        }

        links.join(", ")
    }

    fn link(&self, base: &str, page: u64, rel: &str) -> String {
        let sort = self
            .request
            .sort
            .iter()
            .map(|o| format!("{},{}", o.property, o.direction.as_str()))
            .collect::<Vec<_>>()
            .join(",");

        let mut uri = format!("{}?page={}&size={}", base, page, self.request.size);
        if !sort.is_empty() {
            uri.push_str("&sort=");
            uri.push_str(&sort);
        }
        format!("<{}>; rel=\"{}\"", uri, rel)
    }
}
