//! Cookie/token JSON parsing and session file persistence.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use super::error::SessionError;
use super::types::CredentialSet;

/// Default session file location, relative to the working directory.
pub const DEFAULT_SESSION_PATH: &str = ".anycloud/session.json";

fn read_file(path: &Path) -> Result<String, SessionError> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            SessionError::NotFound(path.to_path_buf())
        } else {
            SessionError::Io(e)
        }
    })
}

fn json_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

/// Parse a browser cookie export.
///
/// Two shapes are accepted:
/// - a list of `{name, value, domain?, path?}` objects (the common browser
///   extension export format), or
/// - a map from cookie name to either a plain string value or a
///   `{value, domain?, path?}` object.
///
/// Entries without a non-empty name and value are dropped. Any other
/// top-level shape is a [`SessionError::Format`].
pub fn load_cookies_from_json(path: &Path) -> Result<CredentialSet, SessionError> {
    let data: Value = serde_json::from_str(&read_file(path)?)?;
    let mut creds = CredentialSet::new();

    match data {
        Value::Array(items) => {
            for item in &items {
                let Some(obj) = item.as_object() else {
                    debug!("skipping non-object cookie entry");
                    continue;
                };
                let name = obj.get("name").and_then(json_str);
                let value = obj.get("value").and_then(json_str);
                if let (Some(name), Some(value)) = (name, value) {
                    let domain = obj
                        .get("domain")
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    let cookie_path = obj.get("path").and_then(Value::as_str).unwrap_or("/");
                    creds.set_cookie(name, value, domain, cookie_path);
                }
            }
        }
        Value::Object(map) => {
            for (name, value) in &map {
                match value {
                    Value::Object(obj) if obj.contains_key("value") => {
                        if let Some(value) = obj.get("value").and_then(json_str) {
                            let domain = obj
                                .get("domain")
                                .and_then(Value::as_str)
                                .map(str::to_string);
                            let cookie_path =
                                obj.get("path").and_then(Value::as_str).unwrap_or("/");
                            creds.set_cookie(name, value, domain, cookie_path);
                        }
                    }
                    Value::String(value) => creds.set_cookie(name, value, None, "/"),
                    _ => debug!(cookie = %name, "skipping cookie with non-string value"),
                }
            }
        }
        _ => {
            return Err(SessionError::Format(
                "unsupported cookies JSON format".to_string(),
            ));
        }
    }

    Ok(creds)
}

/// Parse a token export. The top level must be a JSON object; values that are
/// not strings are rendered to their JSON text form.
pub fn load_tokens_from_json(path: &Path) -> Result<BTreeMap<String, String>, SessionError> {
    let data: Value = serde_json::from_str(&read_file(path)?)?;

    let Value::Object(map) = data else {
        return Err(SessionError::Format(
            "tokens file must be a JSON object".to_string(),
        ));
    };

    let mut tokens = BTreeMap::new();
    for (key, value) in map {
        let value = match value {
            Value::String(s) => s,
            other => other.to_string(),
        };
        tokens.insert(key, value);
    }
    Ok(tokens)
}

/// Write the session file: pretty JSON, trailing newline, owner-only
/// permissions. Parent directories are created as needed and any existing
/// file at `path` is overwritten.
pub fn save_session(path: &Path, credentials: &CredentialSet) -> Result<(), SessionError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let mut payload = serde_json::to_string_pretty(credentials)?;
    payload.push('\n');
    fs::write(path, payload)?;

    // Credentials at rest must not be world-readable.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

/// Read a session file previously written by [`save_session`].
///
/// Cookie entries are re-filtered through the same empty-name/value invariant
/// as the import paths, so a hand-edited file cannot smuggle blank cookies in.
pub fn load_session(path: &Path) -> Result<CredentialSet, SessionError> {
    let data: Value = serde_json::from_str(&read_file(path)?)?;

    if !data.is_object() {
        return Err(SessionError::Format(
            "session file must be a JSON object".to_string(),
        ));
    }

    let raw: CredentialSet = serde_json::from_value(data)?;
    let mut creds = CredentialSet::new();
    for cookie in &raw.cookies {
        creds.set_cookie(&cookie.name, &cookie.value, cookie.domain.clone(), &cookie.path);
    }
    creds.tokens = raw.tokens;
    Ok(creds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.json");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_cookie_array_defaults_path() {
        let (_dir, path) = write_temp(
            r#"[
                {"name": "sid", "value": "abc", "domain": "example.com"},
                {"name": "theme", "value": "dark", "path": "/app"},
                {"name": "", "value": "dropped"},
                {"name": "no_value"}
            ]"#,
        );
        let creds = load_cookies_from_json(&path).unwrap();
        assert_eq!(creds.cookies.len(), 2);
        assert_eq!(creds.cookies[0].name, "sid");
        assert_eq!(creds.cookies[0].path, "/");
        assert_eq!(creds.cookies[0].domain.as_deref(), Some("example.com"));
        assert_eq!(creds.cookies[1].path, "/app");
    }

    #[test]
    fn test_cookie_map_accepts_strings_and_objects() {
        let (_dir, path) = write_temp(
            r#"{
                "plain": "value1",
                "scoped": {"value": "value2", "domain": "example.com", "path": "/x"},
                "numeric": 42
            }"#,
        );
        let creds = load_cookies_from_json(&path).unwrap();
        assert_eq!(creds.cookies.len(), 2);
        let scoped = creds.cookies.iter().find(|c| c.name == "scoped").unwrap();
        assert_eq!(scoped.value, "value2");
        assert_eq!(scoped.path, "/x");
    }

    #[test]
    fn test_cookie_scalar_top_level_is_format_error() {
        let (_dir, path) = write_temp(r#""just a string""#);
        assert!(matches!(
            load_cookies_from_json(&path),
            Err(SessionError::Format(_))
        ));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        assert!(matches!(
            load_cookies_from_json(&path),
            Err(SessionError::NotFound(_))
        ));
        assert!(matches!(
            load_session(&path),
            Err(SessionError::NotFound(_))
        ));
    }

    #[test]
    fn test_tokens_require_object() {
        let (_dir, path) = write_temp(r#"["not", "an", "object"]"#);
        assert!(matches!(
            load_tokens_from_json(&path),
            Err(SessionError::Format(_))
        ));
    }

    #[test]
    fn test_tokens_stringify_non_string_values() {
        let (_dir, path) = write_temp(r#"{"token": "abc", "expires_in": 3600}"#);
        let tokens = load_tokens_from_json(&path).unwrap();
        assert_eq!(tokens.get("token").unwrap(), "abc");
        assert_eq!(tokens.get("expires_in").unwrap(), "3600");
    }

    #[test]
    fn test_session_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/session.json");

        let mut creds = CredentialSet::new();
        creds.set_cookie("sid", "abc", Some("example.com".to_string()), "/");
        creds.set_cookie("theme", "dark", None, "/app");
        creds.set_token("token", "tok1");
        creds.set_token("id_token", "tok2");

        save_session(&path, &creds).unwrap();
        let loaded = load_session(&path).unwrap();
        assert_eq!(loaded, creds);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.ends_with('\n'));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_session_top_level_array_is_format_error() {
        let (_dir, path) = write_temp("[]");
        assert!(matches!(load_session(&path), Err(SessionError::Format(_))));
    }
}
