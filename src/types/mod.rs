//! Shared types for list and write endpoints.

mod pagination;
mod response;

pub use pagination::{
    parse_sort, sanitize_sort, Direction, Page, PageQuery, PageRequest, SortOrder,
};
pub use response::{Created, NoContent, Paged};
