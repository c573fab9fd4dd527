// Backend client error types
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::FieldErrors;

/// Failure talking to the inventory backend, classified by HTTP status.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    // 400 / 422
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: FieldErrors,
    },

    // 401
    #[error("Unauthorized: {}", or_default(.0, "please log in again"))]
    Unauthorized(Option<String>),

    // 403
    #[error("Forbidden: {}", or_default(.0, "not allowed"))]
    Forbidden(Option<String>),

    // 404
    #[error("Not found: {}", or_default(.0, "no such resource"))]
    NotFound(Option<String>),

    // Everything else
    #[error("Server responded with {status}: {}", or_default(.message, "no details"))]
    Status { status: u16, message: Option<String> },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

fn or_default<'a>(message: &'a Option<String>, fallback: &'a str) -> &'a str {
    message.as_deref().unwrap_or(fallback)
}

/// Error body shapes seen from the backend; every field is optional.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
    #[serde(alias = "errors")]
    field_errors: Option<Value>,
}

/// Flatten `{field: "msg"}` or `{field: ["msg", ...]}` into one message per field.
fn collect_field_errors(value: Option<Value>) -> FieldErrors {
    let Some(Value::Object(map)) = value else {
        return FieldErrors::new();
    };
    map.into_iter()
        .map(|(field, v)| {
            let message = match v {
                Value::String(s) => s,
                Value::Array(items) => items
                    .iter()
                    .map(|i| i.as_str().map(str::to_string).unwrap_or_else(|| i.to_string()))
                    .collect::<Vec<_>>()
                    .join("; "),
                other => other.to_string(),
            };
            (field, message)
        })
        .collect()
}

impl ClientError {
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let body: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
        let message = body.message.or(body.error);

        match status {
            400 | 422 => ClientError::Validation {
                message: message.unwrap_or_else(|| "Validation failed".to_string()),
                field_errors: collect_field_errors(body.field_errors),
            },
            401 => ClientError::Unauthorized(message),
            403 => ClientError::Forbidden(message),
            404 => ClientError::NotFound(message),
            _ => ClientError::Status { status, message },
        }
    }

    /// HTTP status, when the failure came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Validation { .. } => Some(400),
            ClientError::Unauthorized(_) => Some(401),
            ClientError::Forbidden(_) => Some(403),
            ClientError::NotFound(_) => Some(404),
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            ClientError::InvalidBaseUrl(_) | ClientError::Decode(_) => None,
        }
    }

    /// Message the server supplied, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Validation { message, .. } => Some(message.as_str()),
            ClientError::Unauthorized(m)
            | ClientError::Forbidden(m)
            | ClientError::NotFound(m)
            | ClientError::Status { message: m, .. } => m.as_deref(),
            _ => None,
        }
    }

    /// Server message when present, otherwise the caller's generic text.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_) | ClientError::Forbidden(_))
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ClientError::Validation { field_errors, .. } => Some(field_errors),
            _ => None,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::InvalidBaseUrl(_) => "INVALID_BASE_URL",
            ClientError::Transport(_) => "TRANSPORT_ERROR",
            ClientError::Validation { .. } => "VALIDATION_ERROR",
            ClientError::Unauthorized(_) => "UNAUTHORIZED",
            ClientError::Forbidden(_) => "FORBIDDEN",
            ClientError::NotFound(_) => "NOT_FOUND",
            ClientError::Status { .. } => "SERVER_ERROR",
            ClientError::Decode(_) => "DECODE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_carries_field_errors() {
        let body = br#"{"message": "Invalid product", "errors": {"price": "must be positive"}}"#;
        let err = ClientError::from_status(422, body);
        assert_eq!(err.user_message("Error saving product"), "Invalid product");
        assert_eq!(err.field_errors().unwrap()["price"], "must be positive");
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn list_valued_field_errors_are_joined() {
        let body = br#"{"errors": {"name": ["is required", "is too short"]}}"#;
        let err = ClientError::from_status(400, body);
        assert_eq!(err.field_errors().unwrap()["name"], "is required; is too short");
        assert_eq!(err.to_string(), "Validation failed");
    }

    #[test]
    fn auth_statuses_are_classified() {
        assert!(ClientError::from_status(401, b"").is_auth_failure());
        assert!(ClientError::from_status(403, b"{}").is_auth_failure());
        assert!(!ClientError::from_status(404, b"{}").is_auth_failure());
    }

    #[test]
    fn fallback_used_without_server_message() {
        let err = ClientError::from_status(500, b"<html>oops</html>");
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(err.user_message("Error fetching products"), "Error fetching products");
        assert_eq!(err.to_string(), "Server responded with 500: no details");
    }

    #[test]
    fn error_field_used_when_message_missing() {
        let err = ClientError::from_status(404, br#"{"error": "Product not found"}"#);
        assert_eq!(err.server_message(), Some("Product not found"));
        assert_eq!(err.to_string(), "Not found: Product not found");
    }
}
