//! The uniform `{success, data, error, message}` envelope returned by every
//! public operation, and the normalizer that turns a raw Graph payload
//! into one.

use crate::error::{SharePointError, SharePointErrorCode, SharePointResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error text for a missing or `null` payload.
pub const EMPTY_RESPONSE_ERROR: &str = "Empty response";

/// Outcome of a single SharePoint call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResponseEnvelope {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    pub fn ok_with_message(data: Value, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok(data)
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
        }
    }

    /// Envelope as a JSON object.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Envelope as a JSON string.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"success":false,"error":{}}}"#,
                Value::String("Failed to serialize response".into())
            )
        })
    }

    /// Back into a `Result` so callers must handle the failure branch.
    pub fn into_result(self) -> Result<Option<Value>, String> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self.error.unwrap_or_else(|| "Unknown error".into()))
        }
    }
}

impl From<SharePointResult<Value>> for ResponseEnvelope {
    fn from(result: SharePointResult<Value>) -> Self {
        match result {
            Ok(raw) => normalize_response(Some(raw)),
            Err(err) => Self::from(err),
        }
    }
}

impl From<SharePointError> for ResponseEnvelope {
    fn from(err: SharePointError) -> Self {
        Self::fail(err.best_message())
    }
}

/// Normalize a raw Graph payload.
///
/// Failure when the payload is absent/`null` or carries an error in one of
/// three shapes: a non-null `error` member (object with `code`/`message`, or
/// a bare value), or sibling `code` + `message` strings at the top level.
/// Every other shape is a success with the payload attached unchanged.
pub fn normalize_response(raw: Option<Value>) -> ResponseEnvelope {
    match raw {
        None => ResponseEnvelope::fail(EMPTY_RESPONSE_ERROR),
        Some(v) => match check_payload(v) {
            Ok(v) => ResponseEnvelope::ok(v),
            Err(e) => ResponseEnvelope::from(e),
        },
    }
}

/// The same failure rules as [`normalize_response`], as a `Result` for
/// internal callers that keep going on success (pagination, search).
pub fn check_payload(raw: Value) -> SharePointResult<Value> {
    if raw.is_null() {
        return Err(SharePointError::new(
            SharePointErrorCode::EmptyResponse,
            EMPTY_RESPONSE_ERROR,
        ));
    }
    match detect_error(&raw) {
        Some(err) => Err(SharePointError::new(SharePointErrorCode::GraphError, err)),
        None => Ok(raw),
    }
}

fn detect_error(raw: &Value) -> Option<String> {
    let obj = raw.as_object()?;

    match obj.get("error") {
        Some(Value::Null) | None => {}
        Some(Value::Object(err)) => {
            return Some(compose(
                err.get("code").and_then(scalar_text),
                err.get("message").and_then(scalar_text),
            )
            .unwrap_or_else(|| Value::Object(err.clone()).to_string()));
        }
        Some(other) => return Some(scalar_text(other).unwrap_or_else(|| other.to_string())),
    }

    match (obj.get("code"), obj.get("message")) {
        (Some(Value::String(code)), Some(Value::String(message))) => {
            compose(Some(code.clone()), Some(message.clone()))
        }
        _ => None,
    }
}

fn compose(code: Option<String>, message: Option<String>) -> Option<String> {
    match (code, message) {
        (Some(c), Some(m)) => Some(format!("{}: {}", c, m)),
        (Some(c), None) => Some(c),
        (None, Some(m)) => Some(m),
        (None, None) => None,
    }
}

fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
