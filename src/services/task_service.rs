//! Task service - tasks inside a project owned by the caller.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::{MSG_PROJECT_NOT_OWNED, MSG_TASK_NOT_FOUND};
use crate::domain::validation::MSG_NOT_BLANK;
use crate::domain::{NewTaskRequest, Project, Task, TaskRequest};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{TransactionContext, UnitOfWork};
use crate::types::{Page, PageRequest};
use crate::{read_only, with_transaction};

/// Task service trait for dependency injection.
#[async_trait]
pub trait TaskService: Send + Sync {
    async fn create(&self, owner_id: Uuid, project_id: Uuid, req: NewTaskRequest) -> AppResult<Task>;

    /// Newest first.
    async fn list(&self, owner_id: Uuid, project_id: Uuid) -> AppResult<Vec<Task>>;

    async fn page(&self, owner_id: Uuid, project_id: Uuid, request: PageRequest) -> AppResult<Page<Task>>;

    async fn get(&self, owner_id: Uuid, project_id: Uuid, id: Uuid) -> AppResult<Task>;

    /// Overwrite only the fields present in `req`.
    async fn update(&self, owner_id: Uuid, project_id: Uuid, id: Uuid, req: TaskRequest) -> AppResult<Task>;

    async fn delete(&self, owner_id: Uuid, project_id: Uuid, id: Uuid) -> AppResult<()>;
}

pub struct TaskManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> TaskManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

/// The project, if `owner_id` owns it.
async fn require_owned_project(
    ctx: TransactionContext<'_>,
    owner_id: Uuid,
    project_id: Uuid,
) -> AppResult<Project> {
    ctx.projects()
        .find_by_id_and_owner_id(project_id, owner_id)
        .await?
        .ok_or_not_found(MSG_PROJECT_NOT_OWNED)
}

async fn require_task(ctx: TransactionContext<'_>, project_id: Uuid, id: Uuid) -> AppResult<Task> {
    ctx.tasks()
        .find_by_id_and_project_id(id, project_id)
        .await?
        .ok_or_not_found(MSG_TASK_NOT_FOUND)
}

#[async_trait]
impl<U: UnitOfWork> TaskService for TaskManager<U> {
    async fn create(&self, owner_id: Uuid, project_id: Uuid, req: NewTaskRequest) -> AppResult<Task> {
        let NewTaskRequest(mut req) = req;
        let title = req
            .title
            .take()
            .ok_or_else(|| AppError::invalid_field("title", MSG_NOT_BLANK))?;

        with_transaction!(self.uow, |ctx| {
            let project = require_owned_project(ctx, owner_id, project_id).await?;
            ctx.tasks().insert(Task::new(project.id, title, req)).await
        })
    }

    async fn list(&self, owner_id: Uuid, project_id: Uuid) -> AppResult<Vec<Task>> {
        read_only!(self.uow, |ctx| {
            require_owned_project(ctx, owner_id, project_id).await?;
            ctx.tasks().find_all_by_project_id(project_id).await
        })
    }

    async fn page(&self, owner_id: Uuid, project_id: Uuid, request: PageRequest) -> AppResult<Page<Task>> {
        let query = request.clone();
        let (items, total) = read_only!(self.uow, |ctx| {
            require_owned_project(ctx, owner_id, project_id).await?;
            ctx.tasks().find_page_by_project_id(project_id, &query).await
        })?;
        Ok(Page::new(items, total, request))
    }

    async fn get(&self, owner_id: Uuid, project_id: Uuid, id: Uuid) -> AppResult<Task> {
        read_only!(self.uow, |ctx| {
            require_owned_project(ctx, owner_id, project_id).await?;
            require_task(ctx, project_id, id).await
        })
    }

    async fn update(&self, owner_id: Uuid, project_id: Uuid, id: Uuid, req: TaskRequest) -> AppResult<Task> {
        with_transaction!(self.uow, |ctx| {
            require_owned_project(ctx, owner_id, project_id).await?;
            let mut task = require_task(ctx, project_id, id).await?;
            task.apply(req);
            ctx.tasks().update(task).await
        })
    }

    async fn delete(&self, owner_id: Uuid, project_id: Uuid, id: Uuid) -> AppResult<()> {
        with_transaction!(self.uow, |ctx| {
            require_owned_project(ctx, owner_id, project_id).await?;
            let task = require_task(ctx, project_id, id).await?;
            ctx.tasks().delete(task.id).await
        })
    }
}
