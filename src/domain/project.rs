//! Project aggregate: a named container of tasks owned by one user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::validation::not_blank;

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: String, owner_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            owner_id,
            created_at: Utc::now(),
        }
    }

    pub fn rename(&mut self, name: String) {
        self.name = name;
    }
}

/// Create / rename payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ProjectRequest {
    #[validate(
        custom(function = "not_blank"),
        length(min = 3, max = 100, message = "size must be between 3 and 100")
    )]
    #[schema(example = "My First Project", min_length = 3, max_length = 100)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: Uuid,
    #[schema(example = "My First Project")]
    pub name: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            owner_id: project.owner_id,
            created_at: project.created_at,
        }
    }
}
