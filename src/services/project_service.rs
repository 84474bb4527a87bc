//! Project service - owner-scoped project use cases.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::{MSG_PROJECT_NOT_FOUND, MSG_USER_NOT_FOUND};
use crate::domain::{Project, ProjectRequest};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Page, PageRequest};
use crate::{read_only, with_transaction};

/// Project service trait for dependency injection.
///
/// Every operation takes the caller's user id. A project owned by anyone
/// else is reported exactly like a missing one.
#[async_trait]
pub trait ProjectService: Send + Sync {
    async fn create(&self, owner_id: Uuid, req: ProjectRequest) -> AppResult<Project>;

    async fn list(&self, owner_id: Uuid) -> AppResult<Vec<Project>>;

    async fn page(&self, owner_id: Uuid, request: PageRequest) -> AppResult<Page<Project>>;

    async fn get(&self, owner_id: Uuid, id: Uuid) -> AppResult<Project>;

    async fn update_name(&self, owner_id: Uuid, id: Uuid, req: ProjectRequest) -> AppResult<Project>;

    /// Delete the project together with its tasks.
    async fn delete(&self, owner_id: Uuid, id: Uuid) -> AppResult<()>;
}

pub struct ProjectManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ProjectManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> ProjectService for ProjectManager<U> {
    async fn create(&self, owner_id: Uuid, req: ProjectRequest) -> AppResult<Project> {
        with_transaction!(self.uow, |ctx| {
            if !ctx.users().exists_by_id(owner_id).await? {
                return Err(AppError::not_found(MSG_USER_NOT_FOUND));
            }
            ctx.projects().insert(Project::new(req.name, owner_id)).await
        })
    }

    async fn list(&self, owner_id: Uuid) -> AppResult<Vec<Project>> {
        read_only!(self.uow, |ctx| ctx.projects().find_all_by_owner_id(owner_id).await)
    }

    async fn page(&self, owner_id: Uuid, request: PageRequest) -> AppResult<Page<Project>> {
        let query = request.clone();
        let (items, total) = read_only!(self.uow, |ctx| {
            ctx.projects().find_page_by_owner_id(owner_id, &query).await
        })?;
        Ok(Page::new(items, total, request))
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> AppResult<Project> {
        read_only!(self.uow, |ctx| ctx.projects().find_by_id_and_owner_id(id, owner_id).await)?
            .ok_or_not_found(MSG_PROJECT_NOT_FOUND)
    }

    async fn update_name(&self, owner_id: Uuid, id: Uuid, req: ProjectRequest) -> AppResult<Project> {
        with_transaction!(self.uow, |ctx| {
            let mut project = ctx
                .projects()
                .find_by_id_and_owner_id(id, owner_id)
                .await?
                .ok_or_not_found(MSG_PROJECT_NOT_FOUND)?;
            project.rename(req.name);
            ctx.projects().update(project).await
        })
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> AppResult<()> {
        let removed = with_transaction!(self.uow, |ctx| {
            let project = ctx
                .projects()
                .find_by_id_and_owner_id(id, owner_id)
                .await?
                .ok_or_not_found(MSG_PROJECT_NOT_FOUND)?;
            let removed = ctx.tasks().delete_all_by_project_id(project.id).await?;
            ctx.projects().delete(project.id).await?;
            Ok(removed)
        })?;
        tracing::debug!(project_id = %id, tasks = removed, "Deleted project");
        Ok(())
    }
}
