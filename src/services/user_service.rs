//! User service - registration and account management.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::MSG_USER_NOT_FOUND;
use crate::domain::{
    normalize_email, CreateUserRequest, Password, UpdateUserPasswordRequest, UpdateUserRequest,
    User, UserRole,
};
use crate::errors::{AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::{read_only, with_transaction};

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Create a user with a fresh id. A taken email is an integrity violation.
    async fn register(&self, req: CreateUserRequest) -> AppResult<User>;

    async fn get_current_user(&self, user_id: Uuid) -> AppResult<User>;

    /// Admin lookup by id
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    async fn update_my_password(&self, user_id: Uuid, req: UpdateUserPasswordRequest) -> AppResult<()>;

    async fn update_my_account(&self, user_id: Uuid, req: UpdateUserRequest) -> AppResult<User>;

    async fn admin_update_user(&self, id: Uuid, req: UpdateUserRequest) -> AppResult<User>;

    /// Create the user unless one with this email exists.
    ///
    /// Returns the new user, or `None` when nothing was created.
    async fn ensure_user(&self, email: &str, password: &str, role: UserRole) -> AppResult<Option<User>>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
    password_cost: u32,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>, password_cost: u32) -> Self {
        Self { uow, password_cost }
    }

    fn digest(&self, plain: &str) -> AppResult<String> {
        Ok(Password::with_cost(plain, self.password_cost)?.into_string())
    }

    /// Apply every present field of `req` to user `id`.
    async fn apply_update(&self, id: Uuid, req: UpdateUserRequest) -> AppResult<User> {
        let digest = req.password.as_deref().map(|p| self.digest(p)).transpose()?;

        with_transaction!(self.uow, |ctx| {
            let mut user = ctx
                .users()
                .find_by_id(id)
                .await?
                .ok_or_not_found(MSG_USER_NOT_FOUND)?;

            if let Some(email) = req.email {
                user.change_email(&email);
            }
            if let Some(role) = req.role {
                user.change_role(role);
            }
            if let Some(digest) = digest {
                user.change_password_hash(digest);
            }

            ctx.users().update(user).await
        })
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn register(&self, req: CreateUserRequest) -> AppResult<User> {
        let user = User::new(
            Uuid::new_v4(),
            &req.email,
            self.digest(&req.password)?,
            UserRole::User,
        );

        let user = with_transaction!(self.uow, |ctx| ctx.users().insert(user).await)?;
        tracing::info!(user_id = %user.id, "Registered user");
        Ok(user)
    }

    async fn get_current_user(&self, user_id: Uuid) -> AppResult<User> {
        self.get_user(user_id).await
    }

    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        read_only!(self.uow, |ctx| ctx.users().find_by_id(id).await)?
            .ok_or_not_found(MSG_USER_NOT_FOUND)
    }

    async fn update_my_password(&self, user_id: Uuid, req: UpdateUserPasswordRequest) -> AppResult<()> {
        let digest = self.digest(&req.new_password)?;

        with_transaction!(self.uow, |ctx| {
            let mut user = ctx
                .users()
                .find_by_id(user_id)
                .await?
                .ok_or_not_found(MSG_USER_NOT_FOUND)?;
            user.change_password_hash(digest);
            ctx.users().update(user).await.map(|_| ())
        })
    }

    async fn update_my_account(&self, user_id: Uuid, req: UpdateUserRequest) -> AppResult<User> {
        self.apply_update(user_id, req).await
    }

    async fn admin_update_user(&self, id: Uuid, req: UpdateUserRequest) -> AppResult<User> {
        let user = self.apply_update(id, req).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "Administrator updated user");
        Ok(user)
    }

    async fn ensure_user(&self, email: &str, password: &str, role: UserRole) -> AppResult<Option<User>> {
        let lookup = normalize_email(email);
        if read_only!(self.uow, |ctx| ctx.users().find_by_email(&lookup).await)?.is_some() {
            return Ok(None);
        }

        let user = User::new(Uuid::new_v4(), email, self.digest(password)?, role);
        with_transaction!(self.uow, |ctx| ctx.users().insert(user).await).map(Some)
    }
}
