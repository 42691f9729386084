//! The backend's response envelope: `{success, data?, error?, message?, errors?}`.

use famcal_core::validation::ValidationErrors;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<Value>,
}

impl Envelope {
    /// Turn a decoded envelope into either the payload or a typed error.
    pub fn into_result(self, status: u16) -> ApiResult<Option<Value>> {
        let ok = self.success && (200..300).contains(&status);
        if ok {
            return Ok(self.data);
        }

        let errors = self
            .errors
            .as_ref()
            .map(validation_errors_from)
            .unwrap_or_default();
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        let message = self
            .error
            .or(self.message)
            .unwrap_or_else(|| "request failed".to_string());
        Err(ApiError::Server { status, message })
    }
}

/// Decode the `data` member into `T`.
pub(crate) fn decode_data<T: DeserializeOwned>(data: Option<Value>) -> ApiResult<T> {
    let data = data.ok_or_else(|| ApiError::Decode("response has no data".into()))?;
    serde_json::from_value(data).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Field errors as the backend sends them. Accepts
/// `{"field": "message"}`, `{"field": ["message", ...]}` and
/// `[{"field"|"path"|"param": ..., "message"|"msg": ...}]`.
pub(crate) fn validation_errors_from(value: &Value) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    match value {
        Value::Object(fields) => {
            for (field, messages) in fields {
                match messages {
                    Value::String(m) => errors.add(field, m.clone()),
                    Value::Array(items) => items
                        .iter()
                        .filter_map(Value::as_str)
                        .for_each(|m| errors.add(field, m)),
                    _ => {}
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                let field = ["field", "path", "param"]
                    .iter()
                    .find_map(|k| item.get(k).and_then(Value::as_str))
                    .unwrap_or("form");
                let message = ["message", "msg"]
                    .iter()
                    .find_map(|k| item.get(k).and_then(Value::as_str));
                if let Some(message) = message {
                    errors.add(field, message);
                }
            }
        }
        _ => {}
    }

    errors
}
