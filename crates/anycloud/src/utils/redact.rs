//! Secret redaction for logged payloads and headers.

use std::collections::BTreeMap;

use reqwest::header::{AUTHORIZATION, COOKIE, HeaderMap};
use serde_json::Value;

/// Marker substituted for payload values whose key looks secret.
pub const REDACTED_VALUE: &str = "***";

/// Marker substituted for redacted header values.
pub const REDACTED_HEADER: &str = "[REDACTED]";

/// Lowercase substrings that mark a key as secret-bearing. Includes the
/// vendor's streaming-credential key names.
const SECRET_KEY_MARKERS: &[&str] = &[
    "accesskey",
    "secretkey",
    "sessiontoken",
    "token",
    "authorization",
    "awsaccesskey",
    "awssecretkey",
    "cookie",
    "agora_token",
    "shengwang",
];

fn is_secret_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SECRET_KEY_MARKERS.iter().any(|marker| key.contains(marker))
}

/// Return a copy of `value` with every secret-keyed entry replaced by
/// [`REDACTED_VALUE`].
///
/// Recurses through objects and arrays; scalar leaves pass through
/// unchanged. Matching is on the containing key, case-insensitively, so a
/// secret nested under an innocuous key chain is still caught at its own
/// level.
pub fn redact_value(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(redact_value).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    if is_secret_key(key) {
                        (key.clone(), Value::String(REDACTED_VALUE.to_string()))
                    } else {
                        (key.clone(), redact_value(value))
                    }
                })
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}

/// Redacted view of a header map for logging. Only `Authorization` and
/// `Cookie` are special-cased; everything else passes through verbatim.
pub fn redact_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut redacted = BTreeMap::new();
    for (name, value) in headers {
        let shown = if name == &AUTHORIZATION || name == &COOKIE {
            REDACTED_HEADER.to_string()
        } else {
            value.to_str().unwrap_or("<binary>").to_string()
        };
        redacted.insert(name.as_str().to_string(), shown);
    }
    redacted
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    #[test]
    fn test_redact_nested_payload() {
        let payload = json!({
            "token": "abc",
            "nested": {"secretKey": "xyz", "ok": "fine"}
        });
        let expected = json!({
            "token": "***",
            "nested": {"secretKey": "***", "ok": "fine"}
        });
        assert_eq!(redact_value(&payload), expected);
    }

    #[test]
    fn test_redact_arrays_and_scalars() {
        let payload = json!([
            {"Agora_Token": "secret", "size": 42},
            "plain string",
            7
        ]);
        let redacted = redact_value(&payload);
        assert_eq!(redacted[0]["Agora_Token"], "***");
        assert_eq!(redacted[0]["size"], 42);
        assert_eq!(redacted[1], "plain string");
        assert_eq!(redacted[2], 7);
    }

    #[test]
    fn test_redact_matches_key_substring_case_insensitively() {
        let payload = json!({
            "AWSAccessKeyId": "AKIA...",
            "x-session-Token-extra": "s",
            "filename": "benchy.gcode"
        });
        let redacted = redact_value(&payload);
        assert_eq!(redacted["AWSAccessKeyId"], "***");
        assert_eq!(redacted["x-session-Token-extra"], "***");
        assert_eq!(redacted["filename"], "benchy.gcode");
    }

    #[test]
    fn test_redact_headers_special_cases_two_names() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer tok"));
        headers.insert(COOKIE, HeaderValue::from_static("sid=abc"));
        headers.insert("XX-Nonce", HeaderValue::from_static("n-1"));
        // Not on the header denylist even though the payload denylist would
        // catch the name.
        headers.insert("XX-Token", HeaderValue::from_static("tok"));

        let redacted = redact_headers(&headers);
        assert_eq!(redacted["authorization"], "[REDACTED]");
        assert_eq!(redacted["cookie"], "[REDACTED]");
        assert_eq!(redacted["xx-nonce"], "n-1");
        assert_eq!(redacted["xx-token"], "tok");
    }
}
