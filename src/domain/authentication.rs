//! Authenticated principal attached to a request.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::config::ROLE_ADMIN_AUTHORITY;

/// Verified JWT claims.
pub type Claims = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Principal {
    /// Bearer token principal with its verified claims.
    Jwt(Claims),
    /// Any other authenticated principal, known only by name.
    Named(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Authentication {
    pub principal: Principal,
    /// Insertion-ordered, duplicate free.
    pub authorities: Vec<String>,
}

impl Authentication {
    pub fn jwt(claims: Claims, authorities: Vec<String>) -> Self {
        Self {
            principal: Principal::Jwt(claims),
            authorities,
        }
    }

    pub fn named(name: impl Into<String>, authorities: Vec<String>) -> Self {
        Self {
            principal: Principal::Named(name.into()),
            authorities,
        }
    }

    pub fn claims(&self) -> Option<&Claims> {
        match &self.principal {
            Principal::Jwt(claims) => Some(claims),
            Principal::Named(_) => None,
        }
    }

    /// `sub` for JWT principals, the name otherwise.
    pub fn name(&self) -> Option<&str> {
        match &self.principal {
            Principal::Jwt(_) => self.claim("sub"),
            Principal::Named(name) => Some(name),
        }
    }

    /// String claim, `None` when absent, not a string, or blank.
    pub fn claim(&self, name: &str) -> Option<&str> {
        self.claims()?
            .get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// `sub` parsed as a UUID.
    pub fn subject_id(&self) -> Option<Uuid> {
        self.claim("sub").and_then(|s| Uuid::parse_str(s).ok())
    }

    /// `email`, falling back to `preferred_username`.
    pub fn email(&self) -> Option<&str> {
        self.claim("email")
            .or_else(|| self.claim("preferred_username"))
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }

    pub fn is_admin(&self) -> bool {
        self.has_authority(ROLE_ADMIN_AUTHORITY)
    }
}
