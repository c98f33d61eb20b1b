//! Request DTOs.

use serde::Deserialize;
use serde_json::Value;

/// Body of `POST /render`.
///
/// Fields are kept as raw JSON so that wrong types (`4` instead of
/// `"4"`) fail validation with a field-specific 400 rather than a
/// generic deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequestBody {
    /// Expected to be `"4"` or `"6"`.
    #[serde(default)]
    pub post_count: Option<Value>,
    /// Expected to be `"red"`, `"blue"` or `"white"`.
    #[serde(default)]
    pub color: Option<Value>,
}

impl RenderRequestBody {
    /// `postCount` if it is a JSON string.
    pub fn post_count(&self) -> Option<&str> {
        self.post_count.as_ref().and_then(Value::as_str)
    }

    /// `color` if it is a JSON string.
    pub fn color(&self) -> Option<&str> {
        self.color.as_ref().and_then(Value::as_str)
    }
}
