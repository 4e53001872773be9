//! Transport-layer failures as the HTTP client reports them.

use serde_json::Value;
use thiserror::Error;

/// The server's reply to a failed request.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub status: u16,
    /// Decoded body; a non-JSON body is kept as `Value::String`.
    pub data: Value,
}

/// A failed HTTP call before normalization.
///
/// `response` is `None` when the request never got an answer (DNS, refused
/// connection, timeout, CORS).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub response: Option<ErrorResponse>,
}

impl TransportError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response: None,
        }
    }

    pub fn with_response(message: impl Into<String>, status: u16, data: Value) -> Self {
        Self {
            message: message.into(),
            response: Some(ErrorResponse { status, data }),
        }
    }

    pub fn is_network(&self) -> bool {
        self.response.is_none()
    }

    pub fn status(&self) -> Option<u16> {
        self.response.as_ref().map(|r| r.status)
    }
}

/// Decode an error body as the normalizer expects it: JSON when it parses,
/// the raw text otherwise, `Null` when there is nothing but whitespace.
pub fn decode_error_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for TransportError {
    /// `reqwest` errors carry a status for `error_for_status` failures but
    /// never the body; use [`TransportError::from_response`] to keep it.
    fn from(err: reqwest::Error) -> Self {
        let response = err.status().map(|status| ErrorResponse {
            status: status.as_u16(),
            data: Value::Null,
        });
        Self {
            message: err.to_string(),
            response,
        }
    }
}

#[cfg(feature = "reqwest")]
impl TransportError {
    /// Capture a non-success response, body included.
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let data = match response.text().await {
            Ok(body) => decode_error_body(&body),
            Err(err) => {
                tracing::debug!(error = %err, "failed to read error response body");
                Value::Null
            }
        };
        Self::with_response(format!("request failed with status {status}"), status.as_u16(), data)
    }

    /// Pass successful responses through; normalize everything else.
    pub async fn check(
        result: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<reqwest::Response, crate::ApiError> {
        let response = result.map_err(|e| crate::parse_api_error(&Self::from(e)))?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(crate::parse_api_error(&Self::from_response(response).await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn network_errors_have_no_status() {
        let err = TransportError::network("connection refused");
        assert!(err.is_network());
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn error_body_json_is_decoded() {
        assert_eq!(
            decode_error_body(r#"{"detail": "Bad input"}"#),
            json!({"detail": "Bad input"})
        );
        assert_eq!(decode_error_body("[1, 2]"), json!([1, 2]));
    }

    #[test]
    fn error_body_non_json_is_kept_as_text() {
        assert_eq!(
            decode_error_body("<html>502 Bad Gateway</html>"),
            Value::String("<html>502 Bad Gateway</html>".to_string())
        );
    }

    #[test]
    fn error_body_blank_is_null() {
        assert_eq!(decode_error_body(""), Value::Null);
        assert_eq!(decode_error_body(" \n\t"), Value::Null);
    }

    #[test]
    fn response_errors_expose_status() {
        let err = TransportError::with_response("bad request", 400, json!({"detail": "x"}));
        assert!(!err.is_network());
        assert_eq!(err.status(), Some(400));
    }
}

#[cfg(all(test, feature = "reqwest"))]
mod reqwest_tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::{UNREACHABLE_MESSAGE, parse_api_error};

    fn response(status: u16, body: &'static str) -> reqwest::Response {
        reqwest::Response::from(
            http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    /// A port on loopback that nothing listens on.
    fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{port}/")
    }

    #[tokio::test]
    async fn connect_error_has_no_response() {
        let err = reqwest::Client::new()
            .get(closed_port_url())
            .send()
            .await
            .unwrap_err();
        assert!(err.is_connect());

        let transport = TransportError::from(err);
        assert!(transport.is_network());
        assert_eq!(parse_api_error(&transport).message, UNREACHABLE_MESSAGE);
    }

    #[tokio::test]
    async fn timeout_error_has_no_response() {
        // Accepted by the kernel backlog, never answered.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());

        let err = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .unwrap()
            .get(url)
            .send()
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(TransportError::from(err).is_network());
    }

    #[tokio::test]
    async fn from_response_decodes_json_text_and_empty_bodies() {
        let json_body = TransportError::from_response(response(422, r#"{"detail":"Bad input"}"#)).await;
        assert_eq!(json_body.status(), Some(422));
        assert_eq!(json_body.response.unwrap().data, json!({"detail": "Bad input"}));

        let text_body = TransportError::from_response(response(502, "Bad Gateway")).await;
        assert_eq!(text_body.response.unwrap().data, Value::String("Bad Gateway".into()));

        let empty_body = TransportError::from_response(response(500, "")).await;
        assert_eq!(empty_body.response.unwrap().data, Value::Null);
    }

    #[tokio::test]
    async fn check_passes_success_and_normalizes_failures() {
        let ok = TransportError::check(Ok(response(200, "{}"))).await.unwrap();
        assert_eq!(ok.status(), reqwest::StatusCode::OK);

        let err = TransportError::check(Ok(response(403, r#"{"message":"Not your loan"}"#)))
            .await
            .unwrap_err();
        assert_eq!(err.message, "Not your loan");
        assert!(err.is_forbidden());

        let send_err = reqwest::Client::new()
            .get(closed_port_url())
            .send()
            .await;
        let err = TransportError::check(send_err).await.unwrap_err();
        assert!(err.is_network());
    }
}
