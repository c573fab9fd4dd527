use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-field messages keyed by the form field name.
pub type FieldErrors = BTreeMap<String, String>;

pub const MIN_USERNAME_LEN: usize = 4;
pub const MIN_PASSWORD_LEN: usize = 6;

/// Client-side validation failure, surfaced next to the offending inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FormError {
    pub message: String,
    pub field_errors: FieldErrors,
}

impl FormError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field_errors: FieldErrors::new(),
        }
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut field_errors = FieldErrors::new();
        field_errors.insert(field.to_string(), message.clone());
        Self { message, field_errors }
    }

    fn from_fields(message: &str, field_errors: FieldErrors) -> Result<(), Self> {
        if field_errors.is_empty() {
            Ok(())
        } else {
            Err(Self {
                message: message.to_string(),
                field_errors,
            })
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), FormError> {
        if self.username.trim().is_empty() || self.password.trim().is_empty() {
            return Err(FormError::new("Please fill in all fields"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

/// Body of `POST /auth/register`; the confirmation never leaves the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub username: String,
    pub password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), FormError> {
        let mut errors = FieldErrors::new();

        if self.name.trim().is_empty() {
            errors.insert("name".into(), "Name is required".into());
        }

        if self.username.trim().is_empty() {
            errors.insert("username".into(), "Username is required".into());
        } else if self.username.chars().count() < MIN_USERNAME_LEN {
            errors.insert(
                "username".into(),
                format!("Username must be at least {} characters", MIN_USERNAME_LEN),
            );
        }

        if self.password.is_empty() {
            errors.insert("password".into(), "Password is required".into());
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.insert(
                "password".into(),
                format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
            );
        }

        if self.password != self.confirm_password {
            errors.insert("confirm_password".into(), "Passwords do not match".into());
        }

        FormError::from_fields("Please fix the errors in the form", errors)
    }

    pub fn to_request(&self) -> RegisterRequest {
        RegisterRequest {
            name: self.name.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(name: &str, username: &str, password: &str, confirm: &str) -> RegisterForm {
        RegisterForm {
            name: name.into(),
            username: username.into(),
            password: password.into(),
            confirm_password: confirm.into(),
        }
    }

    #[test]
    fn login_requires_both_fields() {
        assert!(LoginForm::new("alice", "secret").validate().is_ok());
        let err = LoginForm::new("  ", "secret").validate().unwrap_err();
        assert_eq!(err.message, "Please fill in all fields");
        assert!(LoginForm::new("alice", "   ").validate().is_err());
    }

    #[test]
    fn register_accepts_valid_form() {
        assert!(register("Alice", "alice", "secret1", "secret1").validate().is_ok());
    }

    #[test]
    fn register_collects_every_field_error() {
        let err = register(" ", "abc", "12345", "54321").validate().unwrap_err();
        assert_eq!(err.message, "Please fix the errors in the form");
        assert_eq!(err.field_errors["name"], "Name is required");
        assert_eq!(err.field_errors["username"], "Username must be at least 4 characters");
        assert_eq!(err.field_errors["password"], "Password must be at least 6 characters");
        assert_eq!(err.field_errors["confirm_password"], "Passwords do not match");
    }

    #[test]
    fn register_reports_missing_password_once() {
        let err = register("Alice", "alice", "", "").validate().unwrap_err();
        assert_eq!(err.field_errors.len(), 1);
        assert_eq!(err.field_errors["password"], "Password is required");
    }

    #[test]
    fn register_request_drops_confirmation() {
        let body = serde_json::to_value(register("A", "alice", "secret1", "secret1").to_request()).unwrap();
        assert!(body.get("confirm_password").is_none());
        assert_eq!(body["username"], "alice");
    }
}
