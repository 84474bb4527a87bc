//! Default administrator for development databases.

use crate::config::Config;
use crate::domain::UserRole;
use crate::errors::AppResult;

use super::UserService;

/// Create the configured admin user when seeding applies and no user with
/// that email exists yet. Returns whether a user was created.
pub async fn seed_default_user(users: &dyn UserService, config: &Config) -> AppResult<bool> {
    if !config.seed.enabled || !config.is_dev_profile() {
        return Ok(false);
    }

    match users
        .ensure_user(&config.seed.email, &config.seed.password, UserRole::Admin)
        .await?
    {
        Some(user) => {
            tracing::warn!(
                email = %user.email,
                "Created default admin user; change its password before exposing this instance"
            );
            Ok(true)
        }
        None => {
            tracing::debug!(email = %config.seed.email, "Default admin user already present");
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        CreateUserRequest, UpdateUserPasswordRequest, UpdateUserRequest, User,
    };
    use async_trait::async_trait;
    use mockall::mock;
    use uuid::Uuid;

    mock! {
        Users {}

        #[async_trait]
        impl UserService for Users {
            async fn register(&self, req: CreateUserRequest) -> AppResult<User>;
            async fn get_current_user(&self, user_id: Uuid) -> AppResult<User>;
            async fn get_user(&self, id: Uuid) -> AppResult<User>;
            async fn update_my_password(&self, user_id: Uuid, req: UpdateUserPasswordRequest) -> AppResult<()>;
            async fn update_my_account(&self, user_id: Uuid, req: UpdateUserRequest) -> AppResult<User>;
            async fn admin_update_user(&self, id: Uuid, req: UpdateUserRequest) -> AppResult<User>;
            async fn ensure_user(&self, email: &str, password: &str, role: UserRole) -> AppResult<Option<User>>;
        }
    }

    fn config(profile: &str) -> Config {
        let mut config = Config::default();
        config.profile = profile.into();
        config
    }

    fn dev_config() -> Config {
        config("dev")
    }

    #[tokio::test]
    async fn test_seeds_admin_in_dev_profile() {
        let mut users = MockUsers::new();
        users
            .expect_ensure_user()
            .withf(|_, _, role| *role == UserRole::Admin)
            .times(1)
            .returning(|email, _, role| {
                Ok(Some(User::new(Uuid::new_v4(), email, "digest".into(), role)))
            });

        assert!(seed_default_user(&users, &dev_config()).await.unwrap());
    }

    #[tokio::test]
    async fn test_existing_admin_is_left_alone() {
        let mut users = MockUsers::new();
        users.expect_ensure_user().times(1).returning(|_, _, _| Ok(None));

        assert!(!seed_default_user(&users, &dev_config()).await.unwrap());
    }

    #[tokio::test]
    async fn test_skipped_outside_dev_profiles() {
        let mut users = MockUsers::new();
        users.expect_ensure_user().never();

        assert!(!seed_default_user(&users, &config("prod")).await.unwrap());

        let mut disabled = dev_config();
        disabled.seed.enabled = false;
        assert!(!seed_default_user(&users, &disabled).await.unwrap());
    }
}
