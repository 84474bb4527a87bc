//! Task repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::task::{self, ActiveModel, Entity as TaskEntity};
use super::paging::fetch_page;
use crate::domain::Task;
use crate::errors::AppResult;
use crate::types::PageRequest;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Task repository trait. Every lookup is scoped to a project.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn find_by_id_and_project_id(&self, id: Uuid, project_id: Uuid) -> AppResult<Option<Task>>;

    /// Newest first.
    async fn find_all_by_project_id(&self, project_id: Uuid) -> AppResult<Vec<Task>>;

    async fn find_page_by_project_id(
        &self,
        project_id: Uuid,
        request: &PageRequest,
    ) -> AppResult<(Vec<Task>, u64)>;

    async fn insert(&self, task: Task) -> AppResult<Task>;

    async fn update(&self, task: Task) -> AppResult<Task>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Returns the number of deleted rows.
    async fn delete_all_by_project_id(&self, project_id: Uuid) -> AppResult<u64>;
}

/// Task repository bound to one transaction.
pub struct TaskStore<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TaskStore<'a> {
    pub fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }
}

fn sort_column(property: &str) -> Option<task::Column> {
    match property {
        "createdAt" => Some(task::Column::CreatedAt),
        "title" => Some(task::Column::Title),
        "status" => Some(task::Column::Status),
        "priority" => Some(task::Column::Priority),
        "dueDate" => Some(task::Column::DueDate),
        "id" => Some(task::Column::Id),
        _ => None,
    }
}

fn active_model(task: Task) -> ActiveModel {
    ActiveModel {
        id: Set(task.id),
        title: Set(task.title),
        description: Set(task.description),
        status: Set(task.status.as_str().to_string()),
        priority: Set(task.priority),
        due_date: Set(task.due_date),
        project_id: Set(task.project_id),
        created_at: Set(task.created_at),
    }
}

#[async_trait]
impl TaskRepository for TaskStore<'_> {
    async fn find_by_id_and_project_id(&self, id: Uuid, project_id: Uuid) -> AppResult<Option<Task>> {
        let result = TaskEntity::find_by_id(id)
            .filter(task::Column::ProjectId.eq(project_id))
            .one(self.txn)
            .await?;

        Ok(result.map(Task::from))
    }

    async fn find_all_by_project_id(&self, project_id: Uuid) -> AppResult<Vec<Task>> {
        let models = TaskEntity::find()
            .filter(task::Column::ProjectId.eq(project_id))
            .order_by_desc(task::Column::CreatedAt)
            .order_by_asc(task::Column::Id)
            .all(self.txn)
            .await?;

        Ok(models.into_iter().map(Task::from).collect())
    }

    async fn find_page_by_project_id(
        &self,
        project_id: Uuid,
        request: &PageRequest,
    ) -> AppResult<(Vec<Task>, u64)> {
        let select = TaskEntity::find().filter(task::Column::ProjectId.eq(project_id));
        let (models, total) =
            fetch_page(self.txn, select, request, sort_column, task::Column::Id).await?;

        Ok((models.into_iter().map(Task::from).collect(), total))
    }

    async fn insert(&self, task: Task) -> AppResult<Task> {
        let model = active_model(task).insert(self.txn).await?;
        Ok(Task::from(model))
    }

    async fn update(&self, task: Task) -> AppResult<Task> {
        // Key, parent and creation time never change
        let active = ActiveModel {
            id: Unchanged(task.id),
            project_id: Unchanged(task.project_id),
            created_at: Unchanged(task.created_at),
            ..active_model(task)
        };

        let model = active.update(self.txn).await?;
        Ok(Task::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        TaskEntity::delete_by_id(id).exec(self.txn).await?;
        Ok(())
    }

    async fn delete_all_by_project_id(&self, project_id: Uuid) -> AppResult<u64> {
        let result = TaskEntity::delete_many()
            .filter(task::Column::ProjectId.eq(project_id))
            .exec(self.txn)
            .await?;
        Ok(result.rows_affected)
    }
}
