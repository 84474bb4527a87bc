//! User repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::{normalize_email, User};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Lookup is case-insensitive; stored emails are lower case.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn exists_by_id(&self, id: Uuid) -> AppResult<bool>;

    /// Insert a new row. A duplicate id or email is an integrity violation.
    async fn insert(&self, user: User) -> AppResult<User>;

    /// Overwrite the mutable columns of an existing row.
    async fn update(&self, user: User) -> AppResult<User>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// User repository bound to one transaction.
pub struct UserStore<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> UserStore<'a> {
    pub fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }
}

#[async_trait]
impl UserRepository for UserStore<'_> {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(self.txn).await?;
        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(normalize_email(email)))
            .one(self.txn)
            .await?;

        Ok(result.map(User::from))
    }

    async fn exists_by_id(&self, id: Uuid) -> AppResult<bool> {
        let count = UserEntity::find()
            .filter(user::Column::Id.eq(id))
            .count(self.txn)
            .await?;
        Ok(count > 0)
    }

    async fn insert(&self, user: User) -> AppResult<User> {
        let active_model = ActiveModel {
            id: Set(user.id),
            email: Set(normalize_email(&user.email)),
            password_hash: Set(user.password_hash),
            role: Set(user.role.to_string()),
            created_at: Set(user.created_at),
        };

        let model = active_model.insert(self.txn).await?;
        Ok(User::from(model))
    }

    async fn update(&self, user: User) -> AppResult<User> {
        // id and created_at are immutable
        let active_model = ActiveModel {
            id: Unchanged(user.id),
            email: Set(normalize_email(&user.email)),
            password_hash: Set(user.password_hash),
            role: Set(user.role.to_string()),
            created_at: Unchanged(user.created_at),
        };

        let model = active_model.update(self.txn).await?;
        Ok(User::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        UserEntity::delete_by_id(id).exec(self.txn).await?;
        Ok(())
    }
}
