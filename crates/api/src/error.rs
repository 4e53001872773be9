//! Normalization of failed API calls.
//!
//! The backend reports failures in several body shapes depending on which
//! layer rejected the request:
//!
//! - `{"message": "..."}` from application handlers
//! - `{"detail": "..."}` from framework-level errors
//! - `{"details": {"message" | "detail": "..."}}` from the workflow engine
//! - `{"error": "..."}` or `{"error": {"message": "..."}}` from the gateway
//! - `{"detail": [{"loc": [...], "msg": "...", "type": "..."}]}` or
//!   `{"errors": [{"msg": "..."}]}` from request validation
//!
//! [`parse_api_error`] collapses all of these into one [`ApiError`] whose
//! `message` is safe to show in a toast.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::TransportError;

/// Shown when the request never reached the server.
pub const UNREACHABLE_MESSAGE: &str =
    "Unable to reach the server. Please check your connection and try again.";

/// Shown when neither the body nor the transport has anything better.
pub const GENERIC_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Placeholder some validators emit before the field-specific message.
const GENERIC_MISSING_FIELD: &str = "missing required field";

pub type ApiResult<T> = Result<T, ApiError>;

/// Normalized API error.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    /// HTTP status, `None` when no response was received.
    pub status: Option<u16>,
    /// Raw response body (`null` when there was none).
    pub detail: Value,
}

impl ApiError {
    pub fn is_network(&self) -> bool {
        self.status.is_none()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status == Some(403)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.status, Some(400 | 422))
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self.status, Some(500..=599))
    }
}

/// Normalize a transport failure. Never fails.
pub fn parse_api_error(error: &TransportError) -> ApiError {
    let Some(response) = &error.response else {
        tracing::debug!(transport = %error.message, "API unreachable");
        return ApiError {
            message: UNREACHABLE_MESSAGE.to_string(),
            status: None,
            detail: Value::Null,
        };
    };

    let candidates = message_candidates(&response.data);
    let message = pick_message(&candidates)
        .or_else(|| non_blank(&error.message))
        .unwrap_or(GENERIC_MESSAGE)
        .to_string();

    tracing::debug!(status = response.status, %message, "API request failed");

    ApiError {
        message,
        status: Some(response.status),
        detail: response.data.clone(),
    }
}

/// Structured message candidates, highest priority first, blanks dropped.
fn message_candidates(data: &Value) -> Vec<&str> {
    let error_message = match &data["error"] {
        Value::Object(_) => data["error"]["message"].as_str(),
        other => other.as_str(),
    };

    [
        data["message"].as_str(),
        data["detail"].as_str(),
        data["details"]["message"].as_str(),
        data["details"]["detail"].as_str(),
        error_message,
        first_validation_msg(&data["detail"]),
        first_validation_msg(&data["errors"]),
        data.as_str(),
    ]
    .into_iter()
    .flatten()
    .filter_map(non_blank)
    .collect()
}

fn first_validation_msg(value: &Value) -> Option<&str> {
    value.as_array()?.first()?.get("msg")?.as_str()
}

/// First candidate wins, except that the generic "missing required field"
/// yields to the next, more specific candidate when there is one.
fn pick_message<'a>(candidates: &[&'a str]) -> Option<&'a str> {
    let (&first, rest) = candidates.split_first()?;
    if first.eq_ignore_ascii_case(GENERIC_MISSING_FIELD) {
        if let Some(&specific) = rest
            .iter()
            .find(|c| !c.eq_ignore_ascii_case(GENERIC_MISSING_FIELD))
        {
            return Some(specific);
        }
    }
    Some(first)
}

fn non_blank(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}
