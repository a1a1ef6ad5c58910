//! HTTP Archive ingestion.
//!
//! A HAR recorded while logged in to the vendor web app carries everything a
//! session needs: cookies on both sides of every exchange, and the auth
//! tokens the web app traded during login. Extraction is best-effort per
//! entry; a malformed body never aborts the whole import.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use super::error::SessionError;
use super::types::CredentialSet;

/// Extract a credential set from a browser-exported HAR file.
///
/// Every `log.entries[]` element is visited. Cookies are taken from the
/// structured request/response cookie lists, with the raw `Cookie` and
/// `Set-Cookie` headers parsed as a fallback for recorders that leave the
/// structured lists empty. Tokens are pulled from the handful of body fields
/// the vendor login flow is known to use; the exact key set is a
/// compatibility contract with the remote service and must not be widened.
pub fn load_session_from_har(path: &Path) -> Result<CredentialSet, SessionError> {
    let text = fs::read_to_string(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            SessionError::NotFound(path.to_path_buf())
        } else {
            SessionError::Io(e)
        }
    })?;
    let data: Value = serde_json::from_str(&text)?;

    let mut creds = CredentialSet::new();

    let entries = data
        .get("log")
        .and_then(|log| log.get("entries"))
        .and_then(Value::as_array);
    let Some(entries) = entries else {
        debug!("HAR has no log.entries; returning empty credential set");
        return Ok(creds);
    };

    for entry in entries {
        let request = entry.get("request");
        let response = entry.get("response");

        for side in [request, response].into_iter().flatten() {
            collect_structured_cookies(&mut creds, side);
        }

        if let Some(request) = request {
            collect_cookie_header(&mut creds, request);
            collect_request_tokens(&mut creds, request);
        }
        if let Some(response) = response {
            collect_set_cookie_headers(&mut creds, response);
            collect_response_tokens(&mut creds, response);
        }
    }

    Ok(creds)
}

fn headers_of(side: &Value) -> impl Iterator<Item = (&str, &str)> {
    side.get("headers")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|h| {
            let name = h.get("name").and_then(Value::as_str)?;
            let value = h.get("value").and_then(Value::as_str)?;
            Some((name, value))
        })
}

fn collect_structured_cookies(creds: &mut CredentialSet, side: &Value) {
    let Some(cookies) = side.get("cookies").and_then(Value::as_array) else {
        return;
    };
    for cookie in cookies {
        let name = cookie.get("name").and_then(Value::as_str).unwrap_or("");
        let value = cookie.get("value").and_then(Value::as_str).unwrap_or("");
        let domain = cookie
            .get("domain")
            .and_then(Value::as_str)
            .map(str::to_string);
        let path = cookie.get("path").and_then(Value::as_str).unwrap_or("/");
        creds.set_cookie(name, value, domain, path);
    }
}

/// Fallback: parse the raw `Cookie` request header, a semicolon-separated
/// list of `name=value` pairs.
fn collect_cookie_header(creds: &mut CredentialSet, request: &Value) {
    for (name, value) in headers_of(request) {
        if !name.eq_ignore_ascii_case("cookie") {
            continue;
        }
        for part in value.split(';') {
            if let Some((name, value)) = part.split_once('=') {
                creds.set_cookie(name.trim(), value.trim(), None, "/");
            }
        }
    }
}

/// Fallback: parse raw `Set-Cookie` response headers. The first segment is
/// the `name=value` pair; `Domain=` and `Path=` attributes are recognized
/// case-insensitively among the remaining segments.
fn collect_set_cookie_headers(creds: &mut CredentialSet, response: &Value) {
    for (name, value) in headers_of(response) {
        if !name.eq_ignore_ascii_case("set-cookie") {
            continue;
        }
        let mut parts = value.split(';').map(str::trim).filter(|p| !p.is_empty());
        let Some(first) = parts.next() else { continue };
        let Some((cookie_name, cookie_value)) = first.split_once('=') else {
            continue;
        };

        let mut domain = None;
        let mut path = "/";
        for attr in parts {
            let lower = attr.to_ascii_lowercase();
            if lower.starts_with("domain=") {
                domain = attr.split_once('=').map(|(_, v)| v.to_string());
            }
            if lower.starts_with("path=") {
                path = attr.split_once('=').map(|(_, v)| v).unwrap_or("/");
            }
        }
        creds.set_cookie(cookie_name, cookie_value, domain, path);
    }
}

fn json_body(side: &Value, container: &str) -> Option<Value> {
    let text = side.get(container)?.get("text")?.as_str()?;
    // HAR entries routinely carry non-JSON payloads; skip those silently.
    serde_json::from_str(text).ok()
}

/// Capture `data.id_token` / `data.token` from JSON response bodies. Later
/// entries overwrite earlier ones for the same key.
fn collect_response_tokens(creds: &mut CredentialSet, response: &Value) {
    let Some(body) = json_body(response, "content") else {
        return;
    };
    let Some(data) = body.get("data").and_then(Value::as_object) else {
        return;
    };
    for key in ["id_token", "token"] {
        if let Some(value) = data.get(key).and_then(Value::as_str) {
            creds.set_token(key, value);
        }
    }
}

/// Capture `access_token` from JSON request POST bodies.
fn collect_request_tokens(creds: &mut CredentialSet, request: &Value) {
    let Some(body) = json_body(request, "postData") else {
        return;
    };
    if let Some(value) = body.get("access_token").and_then(Value::as_str) {
        creds.set_token("access_token", value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn har_file(entries: Value) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.har");
        let har = json!({"log": {"version": "1.2", "entries": entries}});
        fs::write(&path, serde_json::to_string(&har).unwrap()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_structured_cookies_from_both_sides() {
        let (_dir, path) = har_file(json!([{
            "request": {
                "cookies": [{"name": "req_c", "value": "1"}],
                "headers": []
            },
            "response": {
                "cookies": [{"name": "resp_c", "value": "2", "domain": "example.com", "path": "/x"}],
                "headers": []
            }
        }]));
        let creds = load_session_from_har(&path).unwrap();
        assert_eq!(creds.cookies.len(), 2);
        let resp = creds.cookies.iter().find(|c| c.name == "resp_c").unwrap();
        assert_eq!(resp.domain.as_deref(), Some("example.com"));
        assert_eq!(resp.path, "/x");
    }

    #[test]
    fn test_cookie_header_fallback() {
        let (_dir, path) = har_file(json!([{
            "request": {
                "headers": [{"name": "Cookie", "value": "a=1; b=2; malformed"}]
            },
            "response": {}
        }]));
        let creds = load_session_from_har(&path).unwrap();
        assert_eq!(creds.cookies.len(), 2);
        assert_eq!(creds.cookies[0].name, "a");
        assert_eq!(creds.cookies[1].value, "2");
    }

    #[test]
    fn test_set_cookie_header_with_attributes() {
        let (_dir, path) = har_file(json!([{
            "request": {},
            "response": {
                "headers": [{
                    "name": "Set-Cookie",
                    "value": "sid=abc123; Path=/app; Domain=example.com; HttpOnly"
                }]
            }
        }]));
        let creds = load_session_from_har(&path).unwrap();
        assert_eq!(creds.cookies.len(), 1);
        let c = &creds.cookies[0];
        assert_eq!(c.name, "sid");
        assert_eq!(c.value, "abc123");
        assert_eq!(c.path, "/app");
        assert_eq!(c.domain.as_deref(), Some("example.com"));
    }

    #[test]
    fn test_token_extraction_and_overwrite() {
        let (_dir, path) = har_file(json!([
            {
                "request": {
                    "postData": {"text": "{\"access_token\": \"first\"}"}
                },
                "response": {
                    "content": {"text": "{\"data\": {\"id_token\": \"id1\", \"token\": \"t1\"}}"}
                }
            },
            {
                "request": {},
                "response": {
                    "content": {"text": "{\"data\": {\"token\": \"t2\"}}"}
                }
            }
        ]));
        let creds = load_session_from_har(&path).unwrap();
        assert_eq!(creds.token("access_token"), Some("first"));
        assert_eq!(creds.token("id_token"), Some("id1"));
        assert_eq!(creds.token("token"), Some("t2"));
    }

    #[test]
    fn test_non_json_bodies_are_skipped() {
        let (_dir, path) = har_file(json!([{
            "request": {
                "postData": {"text": "a=b&c=d"}
            },
            "response": {
                "content": {"text": "<html>not json</html>"}
            }
        }]));
        let creds = load_session_from_har(&path).unwrap();
        assert!(creds.tokens.is_empty());
    }

    #[test]
    fn test_missing_entries_yields_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.har");
        fs::write(&path, r#"{"log": {}}"#).unwrap();
        let creds = load_session_from_har(&path).unwrap();
        assert!(creds.is_empty());
    }
}
