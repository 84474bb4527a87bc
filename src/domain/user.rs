//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use super::validation::{email_address, password_strength, Checks};
use crate::config::{ROLE_ADMIN, ROLE_USER};

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => ROLE_ADMIN,
            UserRole::User => ROLE_USER,
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::User
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        if s.eq_ignore_ascii_case(ROLE_ADMIN) {
            UserRole::Admin
        } else {
            UserRole::User
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User domain entity
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a user; the email is stored lower-cased.
    pub fn new(id: Uuid, email: &str, password_hash: String, role: UserRole) -> Self {
        Self {
            id,
            email: normalize_email(email),
            password_hash,
            role,
            created_at: Utc::now(),
        }
    }

    /// Check if user has admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn change_email(&mut self, email: &str) {
        self.email = normalize_email(email);
    }

    pub fn change_role(&mut self, role: UserRole) {
        self.role = role;
    }

    pub fn change_password_hash(&mut self, password_hash: String) {
        self.password_hash = password_hash;
    }
}

/// Emails are compared and stored in lower case.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Registration payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    /// User email address
    #[validate(custom(function = "email_address"))]
    #[schema(example = "user@example.com", max_length = 254)]
    pub email: String,
    /// Password with at least one letter and one digit
    #[validate(custom(function = "password_strength"))]
    #[schema(example = "Password123", min_length = 8, max_length = 100)]
    pub password: String,
}

/// Partial account update; every present field overwrites.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    #[schema(example = "new-address@example.com")]
    pub email: Option<String>,
    #[schema(example = "ADMIN")]
    pub role: Option<UserRole>,
    #[schema(example = "NewPassword1", min_length = 8, max_length = 100)]
    pub password: Option<String>,
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut checks = Checks::new();
        if let Some(email) = &self.email {
            checks.check("email", email_address(email));
        }
        if let Some(password) = &self.password {
            checks.check("password", password_strength(password));
        }
        checks.finish()
    }
}

/// Password change payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPasswordRequest {
    #[validate(custom(function = "password_strength"))]
    #[schema(example = "NewPassword1", min_length = 8, max_length = 100)]
    pub new_password: String,
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// User email address
    #[schema(example = "user@example.com")]
    pub email: String,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_normalizes_email() {
        let user = User::new(Uuid::new_v4(), " Int-User@Example.COM ", String::new(), UserRole::User);
        assert_eq!(user.email, "int-user@example.com");
        assert!(!user.is_admin());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(UserRole::from("ADMIN"), UserRole::Admin);
        assert_eq!(UserRole::from("admin"), UserRole::Admin);
        assert_eq!(UserRole::from("anything"), UserRole::User);
        assert_eq!(UserRole::Admin.to_string(), "ADMIN");
    }

    #[test]
    fn test_create_request_validation() {
        let ok = CreateUserRequest {
            email: "int-user@example.com".into(),
            password: "Password123".into(),
        };
        assert!(ok.validate().is_ok());

        let bad = CreateUserRequest {
            email: "nope".into(),
            password: "password".into(),
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_update_request_only_checks_present_fields() {
        assert!(UpdateUserRequest::default().validate().is_ok());

        let bad = UpdateUserRequest {
            password: Some("short".into()),
            ..Default::default()
        };
        assert!(bad.validate().unwrap_err().field_errors().contains_key("password"));
    }

    #[test]
    fn test_response_hides_credentials() {
        let user = User::new(Uuid::new_v4(), "a@example.com", "secret-hash".into(), UserRole::Admin);
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
    }
}
