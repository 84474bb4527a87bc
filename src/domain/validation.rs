//! Field rules shared by request DTOs.
//!
//! Each rule returns a [`ValidationError`] carrying the client-facing message,
//! so it can be used both from `#[validate(custom(...))]` and from
//! hand-written `Validate` impls.

use std::borrow::Cow;

use chrono::{NaiveDate, Utc};
use validator::{ValidateEmail, ValidationError, ValidationErrors};

use crate::config::{MAX_EMAIL_LENGTH, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};

pub const MSG_NOT_BLANK: &str = "must not be blank";
pub const MSG_EMAIL: &str = "must be a well-formed email address";
pub const MSG_FUTURE_OR_PRESENT: &str = "must be a date in the present or in the future";
pub const MSG_PASSWORD: &str =
    "password must be 8-100 characters and contain at least one letter and one digit";

fn rule(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// Size message in the same wording for every bounded field.
pub fn size_message(min: u64, max: u64) -> String {
    format!("size must be between {min} and {max}")
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule("not_blank", MSG_NOT_BLANK));
    }
    Ok(())
}

/// At least one letter and one digit, 8 to 100 characters.
pub fn password_strength(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count() as u64;
    let has_letter = value.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());

    if (MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&len) && has_letter && has_digit {
        Ok(())
    } else {
        Err(rule("password", MSG_PASSWORD))
    }
}

pub fn email_address(value: &str) -> Result<(), ValidationError> {
    if value.chars().count() as u64 > MAX_EMAIL_LENGTH {
        return Err(rule("length", size_message(0, MAX_EMAIL_LENGTH)));
    }
    if !value.validate_email() {
        return Err(rule("email", MSG_EMAIL));
    }
    Ok(())
}

/// Dates are compared against the current UTC calendar day.
pub fn future_or_present(value: &NaiveDate) -> Result<(), ValidationError> {
    if *value < Utc::now().date_naive() {
        return Err(rule("future_or_present", MSG_FUTURE_OR_PRESENT));
    }
    Ok(())
}

pub fn length_between(value: &str, min: u64, max: u64) -> Result<(), ValidationError> {
    let len = value.chars().count() as u64;
    if len < min || len > max {
        return Err(rule("length", size_message(min, max)));
    }
    Ok(())
}

/// Collects rule failures for hand-written `Validate` impls.
#[derive(Default)]
pub struct Checks {
    errors: ValidationErrors,
}

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, field: &'static str, result: Result<(), ValidationError>) -> &mut Self {
        if let Err(err) = result {
            self.errors.add(field, err);
        }
        self
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_not_blank() {
        assert!(not_blank("x").is_ok());
        assert!(not_blank("   ").is_err());
        assert!(not_blank("").is_err());
    }

    #[test]
    fn test_password_strength() {
        assert!(password_strength("Password123").is_ok());
        assert!(password_strength("abcdefgh").is_err());
        assert!(password_strength("12345678").is_err());
        assert!(password_strength("abc123").is_err());
        assert!(password_strength(&format!("a1{}", "x".repeat(99))).is_err());
    }

    #[test]
    fn test_future_or_present() {
        let today = Utc::now().date_naive();
        assert!(future_or_present(&today).is_ok());
        assert!(future_or_present(&(today + Duration::days(3))).is_ok());
        assert!(future_or_present(&(today - Duration::days(1))).is_err());
    }

    #[test]
    fn test_email_address() {
        assert!(email_address("user@example.com").is_ok());
        assert!(email_address("not-an-email").is_err());
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(email_address(&long).is_err());
    }

    #[test]
    fn test_checks_collects_by_field() {
        let mut checks = Checks::new();
        checks
            .check("title", not_blank(" "))
            .check("title", length_between(" ", 3, 200))
            .check("priority", Ok(()));
        let errors = checks.finish().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields["title"].len(), 2);
        assert!(!fields.contains_key("priority"));
    }
}
