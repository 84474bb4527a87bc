//! Task entity: a unit of work inside a project.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use super::validation::{future_or_present, length_between, not_blank, Checks, MSG_NOT_BLANK};
use crate::config::{
    MAX_TASK_DESCRIPTION_LENGTH, MAX_TASK_PRIORITY, MAX_TASK_TITLE_LENGTH, MIN_TASK_PRIORITY,
    MIN_TASK_TITLE_LENGTH,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
        }
    }
}

impl From<&str> for TaskStatus {
    fn from(s: &str) -> Self {
        match s {
            "IN_PROGRESS" => TaskStatus::InProgress,
            "DONE" => TaskStatus::Done,
            _ => TaskStatus::Todo,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Option<i32>,
    pub due_date: Option<NaiveDate>,
    pub project_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// New task in `project_id`; status defaults to TODO.
    pub fn new(project_id: Uuid, title: String, req: TaskRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description: req.description,
            status: req.status.unwrap_or_default(),
            priority: req.priority,
            due_date: req.due_date,
            project_id,
            created_at: Utc::now(),
        }
    }

    /// Overwrite the fields present in `req`; absent fields are kept.
    pub fn apply(&mut self, req: TaskRequest) {
        if let Some(title) = req.title {
            self.title = title;
        }
        if let Some(description) = req.description {
            self.description = Some(description);
        }
        if let Some(status) = req.status {
            self.status = status;
        }
        if let Some(priority) = req.priority {
            self.priority = Some(priority);
        }
        if let Some(due_date) = req.due_date {
            self.due_date = Some(due_date);
        }
    }
}

/// Task payload. `title` is mandatory on create and optional on update.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    #[schema(example = "Write the report", min_length = 3, max_length = 200)]
    pub title: Option<String>,
    #[schema(max_length = 2000)]
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    #[schema(minimum = 1, maximum = 3, example = 2)]
    pub priority: Option<i32>,
    #[schema(value_type = Option<String>, format = Date, example = "2030-01-31")]
    pub due_date: Option<NaiveDate>,
}

impl TaskRequest {
    fn checks(&self) -> Checks {
        let mut checks = Checks::new();
        if let Some(title) = &self.title {
            checks
                .check("title", not_blank(title))
                .check("title", length_between(title, MIN_TASK_TITLE_LENGTH, MAX_TASK_TITLE_LENGTH));
        }
        if let Some(description) = &self.description {
            checks.check(
                "description",
                length_between(description, 0, MAX_TASK_DESCRIPTION_LENGTH),
            );
        }
        if let Some(priority) = self.priority {
            if !(MIN_TASK_PRIORITY..=MAX_TASK_PRIORITY).contains(&priority) {
                checks.check(
                    "priority",
                    Err(validator::ValidationError::new("range").with_message(
                        format!("must be between {MIN_TASK_PRIORITY} and {MAX_TASK_PRIORITY}").into(),
                    )),
                );
            }
        }
        if let Some(due_date) = &self.due_date {
            checks.check("due_date", future_or_present(due_date));
        }
        checks
    }
}

impl Validate for TaskRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.checks().finish()
    }
}

/// Create form of [`TaskRequest`], requiring a title.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct NewTaskRequest(pub TaskRequest);

impl Validate for NewTaskRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut checks = self.0.checks();
        if self.0.title.is_none() {
            checks.check(
                "title",
                Err(validator::ValidationError::new("not_blank").with_message(MSG_NOT_BLANK.into())),
            );
        }
        checks.finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Option<i32>,
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,
    pub project_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            project_id: task.project_id,
            created_at: task.created_at,
        }
    }
}
