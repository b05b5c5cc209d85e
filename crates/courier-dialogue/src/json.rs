//! Lenient JSON parsing for model output.

use serde_json::{Map, Value};

/// Parse JSON that may be wrapped in a Markdown code fence.
///
/// Strips surrounding backticks and an optional language tag line before
/// parsing. Anything unparseable yields an empty object.
pub fn parse_json_loose(text: &str) -> Value {
    let mut t = text.trim();

    if t.starts_with("```") {
        t = t.trim_matches('`');
        if let Some((first, rest)) = t.split_once('\n') {
            // Drop a tag line like "json"; keep it if it already holds JSON.
            if !first.trim_start().starts_with(['{', '[']) {
                t = rest;
            }
        }
        t = t.trim();
    }

    serde_json::from_str(t).unwrap_or_else(|_| Value::Object(Map::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_json() {
        let v = parse_json_loose(r#"{"reply": "hi"}"#);
        assert_eq!(v, json!({"reply": "hi"}));
    }

    #[test]
    fn test_fenced_json_with_tag() {
        let text = "```json\n{\"shipment\": {\"ship_to_city\": \"York\"}}\n```";
        let v = parse_json_loose(text);
        assert_eq!(v["shipment"]["ship_to_city"], "York");
    }

    #[test]
    fn test_fenced_json_without_tag() {
        let text = "```\n{\"a\": 1}\n```";
        assert_eq!(parse_json_loose(text), json!({"a": 1}));
    }

    #[test]
    fn test_fence_on_single_line() {
        assert_eq!(parse_json_loose("```{\"a\": 2}```"), json!({"a": 2}));
    }

    #[test]
    fn test_garbage_yields_empty_object() {
        assert_eq!(parse_json_loose("sorry, I can't help"), json!({}));
        assert_eq!(parse_json_loose(""), json!({}));
        assert_eq!(parse_json_loose("```json\n{broken\n```"), json!({}));
    }

    #[test]
    fn test_surrounding_whitespace() {
        assert_eq!(parse_json_loose("   \n {\"a\": true}\n  "), json!({"a": true}));
    }
}
