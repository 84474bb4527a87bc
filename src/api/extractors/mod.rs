//! Custom request extractors.

mod current_user;
mod pagination;
mod validated_json;
mod validated_path;

pub use current_user::CurrentUser;
pub use pagination::Pagination;
pub use validated_json::ValidatedJson;
pub use validated_path::ValidatedPath;
