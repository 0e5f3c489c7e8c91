//! Error type for resource client operations

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Payload used when the server gives no usable `error` member
pub const GENERIC_SERVER_ERROR: &str = "Server error";

/// Errors returned by [`crate::api::ResourceClient`] operations.
///
/// `InvalidArgument` is produced before any request leaves the client; every
/// other variant comes from the transport or the server.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required argument was missing, falsy (e.g. an id of `0`) or unusable.
    #[error("{reason} \"{parameter}\" when calling {operation}.")]
    InvalidArgument {
        reason: &'static str,
        parameter: String,
        operation: &'static str,
    },

    /// The server answered with a non-success status.
    #[error("API request failed: {status} - {}", payload_text(.payload))]
    Server { status: StatusCode, payload: Value },

    /// The request could not be sent or the response could not be read.
    #[error("Failed to send request: {0}")]
    Transport(#[source] reqwest::Error),

    /// The response body did not have the expected shape.
    #[error("Failed to parse response JSON: {0}")]
    Decode(#[source] serde_json::Error),

    /// The client configuration is invalid.
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ApiError {
    pub(crate) fn missing(parameter: &str, operation: &'static str) -> Self {
        Self::InvalidArgument {
            reason: "Missing required parameter",
            parameter: parameter.to_string(),
            operation,
        }
    }

    pub(crate) fn unusable(parameter: &str, operation: &'static str) -> Self {
        Self::InvalidArgument {
            reason: "Invalid value for parameter",
            parameter: parameter.to_string(),
            operation,
        }
    }

    /// Build a server error from a failed response body
    pub(crate) fn from_response(status: StatusCode, body: &str) -> Self {
        Self::Server {
            status,
            payload: error_payload(body),
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// HTTP status of a server error
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }

    /// Best-effort error payload forwarded from the server
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Server { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

/// Extract the server's `error` member, falling back to [`GENERIC_SERVER_ERROR`]
pub fn error_payload(body: &str) -> Value {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").cloned())
        .filter(is_truthy)
        .unwrap_or_else(|| Value::String(GENERIC_SERVER_ERROR.to_string()))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn payload_text(payload: &Value) -> String {
    // OData servers usually send { "code": ..., "message": ... }
    if let Some(message) = payload.get("message").and_then(|m| m.as_str()) {
        return message.to_string();
    }
    match payload {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Format an API error for display on the command line
pub fn format_api_error(error: &ApiError) -> String {
    match error {
        ApiError::InvalidArgument { .. } | ApiError::Config(_) => error.to_string(),
        ApiError::Server { status, payload } => {
            let hint = match status.as_u16() {
                400 => "Invalid request. Check your query options.",
                401 => "Authentication failed.",
                403 => "Permission denied.",
                404 => "Resource not found.",
                409 => "Resource conflict.",
                412 => "Precondition failed. The item was changed by someone else.",
                429 => "Rate limit exceeded. Please try again later.",
                500..=599 => "Server error. Please try again.",
                _ => "Request failed.",
            };
            format!("{} ({}): {}", hint, status, payload_text(payload))
        }
        ApiError::Transport(_) => {
            "Request failed. Check the base path and your network connection.".to_string()
        }
        ApiError::Decode(_) => "Unexpected response from server.".to_string(),
    }
}
