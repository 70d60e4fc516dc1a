//! Error types for the SharePoint / Microsoft Graph integration.
//!
//! Fallible internals return `SharePointResult<T>`; the public service
//! boundary folds them into a [`ResponseEnvelope`](crate::envelope::ResponseEnvelope).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Convenience alias.
pub type SharePointResult<T> = Result<T, SharePointError>;

/// Error codes specific to SharePoint / Graph operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SharePointErrorCode {
    /// Access token rejected (HTTP 401).
    AuthFailed,
    /// Insufficient OAuth scopes (HTTP 403).
    InsufficientPermissions,
    /// Rate-limited (HTTP 429).
    RateLimited,
    /// Bad request / invalid parameter.
    InvalidRequest,
    /// Site, list, item or page not found (HTTP 404).
    NotFound,
    /// Conflict (name collision, edit conflict).
    Conflict,
    /// No operation registered under the requested name.
    UnknownOperation,
    /// A path placeholder had no value.
    MissingParameter,
    /// Graph answered with an empty body where a payload was expected.
    EmptyResponse,
    /// A 2xx payload that carries an error object.
    GraphError,
    /// Network / connectivity error.
    NetworkError,
    /// (De)serialization error.
    SerializationError,
    /// Catch-all internal error.
    InternalError,
}

impl fmt::Display for SharePointErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Structured error returned by every fallible internal function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharePointError {
    pub code: SharePointErrorCode,
    pub message: String,
    pub status: Option<u16>,
    pub graph_error_code: Option<String>,
    pub inner_message: Option<String>,
    pub request_id: Option<String>,
}

impl fmt::Display for SharePointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref gc) = self.graph_error_code {
            write!(f, " (graph: {})", gc)?;
        }
        Ok(())
    }
}

impl std::error::Error for SharePointError {}

impl SharePointError {
    /// Create from a code + message.
    pub fn new(code: SharePointErrorCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
            status: None,
            graph_error_code: None,
            inner_message: None,
            request_id: None,
        }
    }

    /// Shortcut: network error.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::new(SharePointErrorCode::NetworkError, msg)
    }

    /// Shortcut: internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(SharePointErrorCode::InternalError, msg)
    }

    pub fn unknown_operation(name: &str) -> Self {
        Self::new(
            SharePointErrorCode::UnknownOperation,
            format!("Unknown SharePoint operation: {}", name),
        )
    }

    pub fn missing_parameter(name: &str) -> Self {
        Self::new(
            SharePointErrorCode::MissingParameter,
            format!("Missing required parameter: {}", name),
        )
    }

    /// Attach the client-side correlation id unless Graph already sent one.
    pub fn with_request_id(mut self, request_id: &str) -> Self {
        if self.request_id.is_none() {
            self.request_id = Some(request_id.to_string());
        }
        self
    }

    /// The most specific human-readable message available: the nested Graph
    /// `error.message`, else our own message, else the display form.
    pub fn best_message(&self) -> String {
        if let Some(ref inner) = self.inner_message {
            if !inner.is_empty() {
                return inner.clone();
            }
        }
        if !self.message.is_empty() {
            return self.message.clone();
        }
        self.to_string()
    }

    /// Build an error from a Graph API error response body.
    pub fn from_graph_response(status: u16, body: &str) -> Self {
        let code = match status {
            401 => SharePointErrorCode::AuthFailed,
            403 => SharePointErrorCode::InsufficientPermissions,
            404 => SharePointErrorCode::NotFound,
            409 => SharePointErrorCode::Conflict,
            429 => SharePointErrorCode::RateLimited,
            _ if status >= 500 => SharePointErrorCode::InternalError,
            _ => SharePointErrorCode::InvalidRequest,
        };

        let (graph_code, inner_msg, request_id) = Self::parse_graph_error_body(body);

        let message = inner_msg
            .clone()
            .unwrap_or_else(|| format!("Graph API error (HTTP {})", status));

        Self {
            code,
            message,
            status: Some(status),
            graph_error_code: graph_code,
            inner_message: inner_msg,
            request_id,
        }
    }

    /// Try to extract Graph error JSON: `{ "error": { "code": "...", "message": "...", "innerError": { "request-id": "..." } } }`.
    fn parse_graph_error_body(body: &str) -> (Option<String>, Option<String>, Option<String>) {
        let Ok(v) = serde_json::from_str::<serde_json::Value>(body) else {
            return (None, None, None);
        };
        let err = &v["error"];
        let code = err["code"].as_str().map(String::from);
        let msg = err["message"].as_str().map(String::from);
        let req_id = err["innerError"]["request-id"]
            .as_str()
            .map(String::from);
        (code, msg, req_id)
    }
}

impl From<reqwest::Error> for SharePointError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            Self::network(format!("Connection failed: {}", err))
        } else {
            Self::internal(format!("HTTP error: {}", err))
        }
    }
}

impl From<serde_json::Error> for SharePointError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(
            SharePointErrorCode::SerializationError,
            format!("JSON error: {}", err),
        )
    }
}

impl From<url::ParseError> for SharePointError {
    fn from(err: url::ParseError) -> Self {
        Self::new(
            SharePointErrorCode::InvalidRequest,
            format!("URL parse error: {}", err),
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_graph_response_404() {
        let body = r#"{"error":{"code":"itemNotFound","message":"The site does not exist","innerError":{"request-id":"abc-123"}}}"#;
        let err = SharePointError::from_graph_response(404, body);
        assert_eq!(err.code, SharePointErrorCode::NotFound);
        assert_eq!(err.graph_error_code.as_deref(), Some("itemNotFound"));
        assert_eq!(err.request_id.as_deref(), Some("abc-123"));
        assert_eq!(err.best_message(), "The site does not exist");
    }

    #[test]
    fn test_from_graph_response_without_body() {
        let err = SharePointError::from_graph_response(429, "");
        assert_eq!(err.code, SharePointErrorCode::RateLimited);
        assert_eq!(err.best_message(), "Graph API error (HTTP 429)");
    }

    #[test]
    fn test_from_graph_response_5xx() {
        let err = SharePointError::from_graph_response(502, "bad gateway");
        assert_eq!(err.code, SharePointErrorCode::InternalError);
        assert_eq!(err.status, Some(502));
    }

    #[test]
    fn test_best_message_falls_back_to_display() {
        let err = SharePointError::new(SharePointErrorCode::InternalError, "");
        assert_eq!(err.best_message(), "[InternalError] ");
    }

    #[test]
    fn test_with_request_id_keeps_graph_id() {
        let body = r#"{"error":{"code":"x","message":"y","innerError":{"request-id":"graph-1"}}}"#;
        let err = SharePointError::from_graph_response(400, body).with_request_id("local-1");
        assert_eq!(err.request_id.as_deref(), Some("graph-1"));

        let err = SharePointError::network("down").with_request_id("local-2");
        assert_eq!(err.request_id.as_deref(), Some("local-2"));
    }

    #[test]
    fn test_error_display() {
        let err = SharePointError {
            code: SharePointErrorCode::NotFound,
            message: "missing".into(),
            status: Some(404),
            graph_error_code: Some("itemNotFound".into()),
            inner_message: None,
            request_id: None,
        };
        let s = format!("{}", err);
        assert!(s.contains("missing"));
        assert!(s.contains("itemNotFound"));
    }

    #[test]
    fn test_missing_parameter_message() {
        let err = SharePointError::missing_parameter("site_id");
        assert_eq!(err.code, SharePointErrorCode::MissingParameter);
        assert_eq!(err.message, "Missing required parameter: site_id");
    }
}
