//! Request and result types exchanged with resize clients

use serde::{Deserialize, Deserializer, Serialize};

/// A batch of source images to resize to one target size
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeRequest {
    #[serde(default)]
    pub urls: Vec<String>,
    /// Target width; 0 keeps the aspect ratio using `height`
    #[serde(default)]
    pub width: u32,
    /// Target height; 0 keeps the aspect ratio using `width`
    #[serde(default)]
    pub height: u32,
    /// Fire-and-forget mode. Anything that is not a boolean reads as false.
    #[serde(default, rename = "async", deserialize_with = "lenient_bool")]
    pub is_async: bool,
}

/// Outcome tag for a single URL in a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeStatus {
    Success,
    InProgress,
    Failure,
}

/// Per-URL result, returned in request order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeResult {
    pub result: ResizeStatus,
    /// Servable location of the resized image; absent on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub cached: bool,
}

impl ResizeResult {
    pub fn success(url: String, cached: bool) -> Self {
        Self {
            result: ResizeStatus::Success,
            url: Some(url),
            cached,
        }
    }

    pub fn in_progress(url: String) -> Self {
        Self {
            result: ResizeStatus::InProgress,
            url: Some(url),
            cached: false,
        }
    }

    pub fn failure() -> Self {
        Self {
            result: ResizeStatus::Failure,
            url: None,
            cached: false,
        }
    }
}

/// Everything a worker or the inline path needs to produce one image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeData {
    pub key: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Parse an `async` flag the way the resize endpoint accepts it.
///
/// Only the usual boolean spellings count; everything else means synchronous.
pub fn parse_async_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Some(true),
        "0" | "f" | "false" => Some(false),
        _ => None,
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(flag) => flag,
        serde_json::Value::String(text) => parse_async_flag(&text).unwrap_or(false),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_request_defaults_to_synchronous() {
        let request: ResizeRequest =
            serde_json::from_value(json!({"urls": ["http://a/b.jpg"], "width": 10})).unwrap();
        assert!(!request.is_async);
        assert_eq!(request.height, 0);
        assert_eq!(request.urls.len(), 1);
    }

    #[rstest]
    #[case(json!(true), true)]
    #[case(json!(false), false)]
    #[case(json!("true"), true)]
    #[case(json!("nope"), false)]
    #[case(json!(1), false)]
    #[case(json!(null), false)]
    fn test_request_async_flag_is_lenient(#[case] flag: serde_json::Value, #[case] expected: bool) {
        let request: ResizeRequest =
            serde_json::from_value(json!({"urls": [], "async": flag})).unwrap();
        assert_eq!(request.is_async, expected);
    }

    #[rstest]
    #[case("true", Some(true))]
    #[case("T", Some(true))]
    #[case("1", Some(true))]
    #[case("false", Some(false))]
    #[case("0", Some(false))]
    #[case("yes", None)]
    #[case("", None)]
    fn test_parse_async_flag(#[case] input: &str, #[case] expected: Option<bool>) {
        assert_eq!(parse_async_flag(input), expected);
    }

    #[test]
    fn test_result_wire_format() {
        let ok = serde_json::to_value(ResizeResult::success("http://x/y.jpeg".into(), true)).unwrap();
        assert_eq!(
            ok,
            json!({"result": "success", "url": "http://x/y.jpeg", "cached": true})
        );

        let pending = serde_json::to_value(ResizeResult::in_progress("http://x/y.jpeg".into())).unwrap();
        assert_eq!(pending["result"], "in-progress");
        assert_eq!(pending["cached"], false);

        let failed = serde_json::to_value(ResizeResult::failure()).unwrap();
        assert_eq!(failed, json!({"result": "failure", "cached": false}));
    }
}
