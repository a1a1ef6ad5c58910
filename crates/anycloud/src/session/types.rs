//! Core credential types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

fn default_cookie_path() -> String {
    "/".to_string()
}

/// A single cookie extracted from a browser artifact.
///
/// Only the attributes the vendor API cares about are kept; expiry and
/// security flags are dropped during import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default = "default_cookie_path")]
    pub path: String,
}

/// Normalized cookies and tokens extracted from one of the supported input
/// formats (cookie JSON, token JSON, or HAR).
///
/// The cookie sequence preserves insertion order. Names are NOT unique:
/// the same name may appear under several (domain, path) scopes. Writing a
/// cookie whose (name, domain, path) triple already exists replaces the old
/// entry in place, so exports are last-write-wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialSet {
    #[serde(default)]
    pub cookies: Vec<Cookie>,
    #[serde(default)]
    pub tokens: BTreeMap<String, String>,
}

impl CredentialSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a cookie, replacing any existing entry with the same
    /// (name, domain, path) triple.
    ///
    /// Cookies with an empty name or empty value are dropped.
    pub fn set_cookie<N, V>(&mut self, name: N, value: V, domain: Option<String>, path: &str)
    where
        N: AsRef<str>,
        V: AsRef<str>,
    {
        let name = name.as_ref();
        let value = value.as_ref();
        if name.is_empty() || value.is_empty() {
            return;
        }
        let path = if path.is_empty() { "/" } else { path };

        if let Some(existing) = self
            .cookies
            .iter_mut()
            .find(|c| c.name == name && c.domain == domain && c.path == path)
        {
            existing.value = value.to_string();
            return;
        }

        self.cookies.push(Cookie {
            name: name.to_string(),
            value: value.to_string(),
            domain,
            path: path.to_string(),
        });
    }

    /// Store a token under the given key, overwriting any previous value.
    pub fn set_token<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.tokens.insert(key.into(), value.into());
    }

    pub fn token(&self, key: &str) -> Option<&str> {
        self.tokens.get(key).map(String::as_str)
    }

    /// The bearer token the vendor API expects in the `XX-Token` header.
    pub fn bearer_token(&self) -> Option<&str> {
        self.token("token")
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty() && self.tokens.is_empty()
    }

    /// Assemble a `Cookie` request header value from all stored cookies.
    ///
    /// Domain/path matching is the transport's concern; every cookie is
    /// included. Returns `None` when there are no cookies.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }

        let mut header = String::with_capacity(
            self.cookies
                .iter()
                .map(|c| c.name.len() + 1 + c.value.len() + 2)
                .sum(),
        );

        for cookie in &self.cookies {
            if !header.is_empty() {
                header.push_str("; ");
            }
            header.push_str(&cookie.name);
            header.push('=');
            header.push_str(&cookie.value);
        }

        Some(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_cookie_drops_empty_name_or_value() {
        let mut creds = CredentialSet::new();
        creds.set_cookie("", "value", None, "/");
        creds.set_cookie("name", "", None, "/");
        assert!(creds.cookies.is_empty());
    }

    #[test]
    fn test_set_cookie_last_write_wins_per_scope() {
        let mut creds = CredentialSet::new();
        creds.set_cookie("sid", "old", Some("example.com".to_string()), "/");
        creds.set_cookie("sid", "new", Some("example.com".to_string()), "/");
        assert_eq!(creds.cookies.len(), 1);
        assert_eq!(creds.cookies[0].value, "new");
    }

    #[test]
    fn test_same_name_different_scope_coexists() {
        let mut creds = CredentialSet::new();
        creds.set_cookie("sid", "a", Some("example.com".to_string()), "/");
        creds.set_cookie("sid", "b", Some("other.com".to_string()), "/");
        creds.set_cookie("sid", "c", Some("example.com".to_string()), "/app");
        assert_eq!(creds.cookies.len(), 3);
    }

    #[test]
    fn test_empty_path_defaults_to_root() {
        let mut creds = CredentialSet::new();
        creds.set_cookie("sid", "abc", None, "");
        assert_eq!(creds.cookies[0].path, "/");
    }

    #[test]
    fn test_cookie_header_joins_in_order() {
        let mut creds = CredentialSet::new();
        assert_eq!(creds.cookie_header(), None);
        creds.set_cookie("a", "1", None, "/");
        creds.set_cookie("b", "2", None, "/");
        assert_eq!(creds.cookie_header().as_deref(), Some("a=1; b=2"));
    }

    #[test]
    fn test_bearer_token_reads_token_key() {
        let mut creds = CredentialSet::new();
        assert_eq!(creds.bearer_token(), None);
        creds.set_token("id_token", "x");
        assert_eq!(creds.bearer_token(), None);
        creds.set_token("token", "bearer-value");
        assert_eq!(creds.bearer_token(), Some("bearer-value"));
    }
}
