//! Authentication service.
//!
//! Verifies bearer tokens, provisions local users for first-seen token
//! subjects and maps the authenticated principal to a local user id.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::authorities::KeycloakAuthorities;
use crate::config::LOCAL_EMAIL_DOMAIN;
use crate::domain::{normalize_email, Authentication, Password, Principal, User, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::{JwtDecoder, UnitOfWork};
use crate::{read_only, with_transaction};

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Verify a bearer token and derive its authorities.
    async fn authenticate(&self, token: &str) -> AppResult<Authentication>;

    /// Create the local user for a token subject seen for the first time.
    ///
    /// Losing an insert race to a concurrent request is not an error.
    async fn provision(&self, auth: &Authentication) -> AppResult<()>;

    /// Local user id of the current principal.
    async fn resolve_user_id(&self, auth: Option<&Authentication>) -> AppResult<Uuid>;
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    decoder: Arc<dyn JwtDecoder>,
    authorities: KeycloakAuthorities,
    dev_user_id: Option<Uuid>,
    password_cost: u32,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(
        uow: Arc<U>,
        decoder: Arc<dyn JwtDecoder>,
        authorities: KeycloakAuthorities,
        dev_user_id: Option<Uuid>,
        password_cost: u32,
    ) -> Self {
        Self {
            uow,
            decoder,
            authorities,
            dev_user_id,
            password_cost,
        }
    }

    /// Id and email for a user that should exist but doesn't.
    async fn missing_user(&self, auth: &Authentication) -> AppResult<Option<(Uuid, String)>> {
        if let Some(id) = auth.subject_id() {
            if read_only!(self.uow, |ctx| ctx.users().exists_by_id(id).await)? {
                return Ok(None);
            }
            let email = auth
                .email()
                .map(normalize_email)
                .unwrap_or_else(|| format!("{id}@{LOCAL_EMAIL_DOMAIN}"));
            return Ok(Some((id, email)));
        }

        let Some(email) = auth.email().map(normalize_email) else {
            return Ok(None);
        };
        let lookup = email.clone();
        if read_only!(self.uow, |ctx| ctx.users().find_by_email(&lookup).await)?.is_some() {
            return Ok(None);
        }
        Ok(Some((Uuid::new_v4(), email)))
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn authenticate(&self, token: &str) -> AppResult<Authentication> {
        let claims = self.decoder.decode(token).await?;
        let authorities = self.authorities.convert(&claims);
        Ok(Authentication::jwt(claims, authorities))
    }

    async fn provision(&self, auth: &Authentication) -> AppResult<()> {
        if auth.claims().is_none() {
            return Ok(());
        }
        let Some((id, email)) = self.missing_user(auth).await? else {
            return Ok(());
        };

        let role = if auth.is_admin() {
            UserRole::Admin
        } else {
            UserRole::User
        };
        let digest = Password::random(self.password_cost)?.into_string();
        let user = User::new(id, &email, digest, role);

        match with_transaction!(self.uow, |ctx| ctx.users().insert(user).await) {
            Ok(user) => {
                tracing::info!(user_id = %user.id, email = %user.email, role = %user.role, "Provisioned user from token");
                Ok(())
            }
            Err(e) if e.is_integrity_violation() => {
                // A concurrent request created the row first
                let lookup = email.clone();
                let reloaded = read_only!(self.uow, |ctx| {
                    match ctx.users().find_by_id(id).await? {
                        Some(user) => Ok(Some(user)),
                        None => ctx.users().find_by_email(&lookup).await,
                    }
                })?;
                match reloaded {
                    Some(user) => tracing::debug!(user_id = %user.id, "Provisioning race reconciled"),
                    None => tracing::warn!(user_id = %id, email = %email, "Provisioning conflicted with an unrelated row"),
                }
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn resolve_user_id(&self, auth: Option<&Authentication>) -> AppResult<Uuid> {
        if let Some(auth) = auth {
            match &auth.principal {
                Principal::Jwt(_) => {
                    if let Some(id) = auth.subject_id() {
                        if read_only!(self.uow, |ctx| ctx.users().exists_by_id(id).await)? {
                            return Ok(id);
                        }
                    }
                    if let Some(email) = auth.email().map(normalize_email) {
                        let lookup = email.clone();
                        let user =
                            read_only!(self.uow, |ctx| ctx.users().find_by_email(&lookup).await)?;
                        return user.map(|u| u.id).ok_or_else(|| {
                            AppError::IdentityUnmapped(format!("no local user with email {email}"))
                        });
                    }
                }
                Principal::Named(name) => {
                    if let Ok(id) = Uuid::parse_str(name) {
                        return Ok(id);
                    }
                }
            }
        }

        if let Some(id) = self.dev_user_id {
            return Ok(id);
        }

        Err(AppError::IdentityUnmapped(
            "principal does not map to a local user".to_string(),
        ))
    }
}
