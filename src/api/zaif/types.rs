use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::client::Page;
use crate::api::error::ApiError;

/// Zaif private API response wrapper
///
/// `{"success": 1, "return": {...}}` on success,
/// `{"success": 0, "error": "..."}` on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZaifResponse {
    pub success: i64,
    #[serde(rename = "return")]
    pub data: Option<Value>,
    pub error: Option<String>,
}

impl ZaifResponse {
    /// Unwrap the envelope into the `return` payload
    pub fn into_result(self) -> Result<Value, ApiError> {
        if self.success != 1 {
            return Err(ApiError::ExchangeError(
                self.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        self.data
            .ok_or_else(|| ApiError::ParseError("Response has no return value".to_string()))
    }
}

/// Interpret a history payload as a page. The API answers an empty page with
/// `[]` instead of `{}`.
pub fn payload_to_page(payload: Value) -> Result<Page, ApiError> {
    match payload {
        Value::Object(map) => Ok(map),
        Value::Array(items) if items.is_empty() => Ok(Page::new()),
        other => Err(ApiError::ParseError(format!(
            "Expected history object, got: {}",
            other
        ))),
    }
}

/// Request for one private API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateCall {
    /// Endpoint URL (trade or leverage API)
    pub url: &'static str,
    /// Value of the `method` form field
    pub method: &'static str,
    /// Remaining form fields, in order
    pub params: Vec<(&'static str, String)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope() {
        let response: ZaifResponse =
            serde_json::from_value(json!({"success": 1, "return": {"182": {"amount": 0.03}}}))
                .unwrap();
        let page = payload_to_page(response.into_result().unwrap()).unwrap();
        assert_eq!(page.len(), 1);
        assert!(page.contains_key("182"));
    }

    #[test]
    fn test_failure_envelope_keeps_message() {
        let response: ZaifResponse = serde_json::from_value(
            json!({"success": 0, "error": "time wait restriction, please try later."}),
        )
        .unwrap();
        let err = response.into_result().unwrap_err();
        assert!(matches!(err, ApiError::ExchangeError(ref m) if m.starts_with("time wait")));
    }

    #[test]
    fn test_empty_array_is_empty_page() {
        assert!(payload_to_page(json!([])).unwrap().is_empty());
        assert!(payload_to_page(json!([1])).is_err());
        assert!(payload_to_page(json!("nope")).is_err());
    }
}
