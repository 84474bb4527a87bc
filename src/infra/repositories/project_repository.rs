//! Project repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, DatabaseTransaction, EntityTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use super::entities::project::{self, ActiveModel, Entity as ProjectEntity};
use super::paging::fetch_page;
use crate::domain::Project;
use crate::errors::AppResult;
use crate::types::PageRequest;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Project repository trait. Every lookup is scoped to an owner.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn find_by_id_and_owner_id(&self, id: Uuid, owner_id: Uuid) -> AppResult<Option<Project>>;

    async fn find_all_by_owner_id(&self, owner_id: Uuid) -> AppResult<Vec<Project>>;

    /// One sorted page plus the owner's total project count.
    async fn find_page_by_owner_id(
        &self,
        owner_id: Uuid,
        request: &PageRequest,
    ) -> AppResult<(Vec<Project>, u64)>;

    async fn insert(&self, project: Project) -> AppResult<Project>;

    async fn update(&self, project: Project) -> AppResult<Project>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// Project repository bound to one transaction.
pub struct ProjectStore<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> ProjectStore<'a> {
    pub fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }
}

fn sort_column(property: &str) -> Option<project::Column> {
    match property {
        "createdAt" => Some(project::Column::CreatedAt),
        "name" => Some(project::Column::Name),
        "id" => Some(project::Column::Id),
        _ => None,
    }
}

#[async_trait]
impl ProjectRepository for ProjectStore<'_> {
    async fn find_by_id_and_owner_id(&self, id: Uuid, owner_id: Uuid) -> AppResult<Option<Project>> {
        let result = ProjectEntity::find_by_id(id)
            .filter(project::Column::OwnerId.eq(owner_id))
            .one(self.txn)
            .await?;

        Ok(result.map(Project::from))
    }

    async fn find_all_by_owner_id(&self, owner_id: Uuid) -> AppResult<Vec<Project>> {
        let models = ProjectEntity::find()
            .filter(project::Column::OwnerId.eq(owner_id))
            .all(self.txn)
            .await?;

        Ok(models.into_iter().map(Project::from).collect())
    }

    async fn find_page_by_owner_id(
        &self,
        owner_id: Uuid,
        request: &PageRequest,
    ) -> AppResult<(Vec<Project>, u64)> {
        let select = ProjectEntity::find().filter(project::Column::OwnerId.eq(owner_id));
        let (models, total) =
            fetch_page(self.txn, select, request, sort_column, project::Column::Id).await?;

        Ok((models.into_iter().map(Project::from).collect(), total))
    }

    async fn insert(&self, project: Project) -> AppResult<Project> {
        let active_model = ActiveModel {
            id: Set(project.id),
            name: Set(project.name),
            owner_id: Set(project.owner_id),
            created_at: Set(project.created_at),
        };

        let model = active_model.insert(self.txn).await?;
        Ok(Project::from(model))
    }

    async fn update(&self, project: Project) -> AppResult<Project> {
        let active_model = ActiveModel {
            id: Unchanged(project.id),
            name: Set(project.name),
            owner_id: Unchanged(project.owner_id),
            created_at: Unchanged(project.created_at),
        };

        let model = active_model.update(self.txn).await?;
        Ok(Project::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        ProjectEntity::delete_by_id(id).exec(self.txn).await?;
        Ok(())
    }
}
