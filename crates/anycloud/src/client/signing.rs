//! Per-request signature and header construction.
//!
//! The vendor web app signs every API call with an MD5 digest over a fixed
//! concatenation of app identity constants, a nonce, and a millisecond
//! timestamp. The concatenation order (app id appearing both first and last)
//! is a wire contract and must not change.

use std::str::FromStr;

use md5::{Digest, Md5};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;
use uuid::Uuid;

use crate::session::CredentialSet;

/// Application identity constants extracted from the vendor web app bundle.
///
/// These identify the client software, not the user; they are embedded
/// configuration rather than secrets.
#[derive(Debug, Clone)]
pub struct AppIdentity {
    pub app_id: &'static str,
    pub app_secret: &'static str,
    pub app_version: &'static str,
}

impl Default for AppIdentity {
    fn default() -> Self {
        Self {
            app_id: "f9b3528877c94d5c9c5af32245db46ef",
            app_secret: "0cf75926606049a3937f56b0373b99fb",
            app_version: "1.0.0",
        }
    }
}

impl AppIdentity {
    /// Compute the request signature for a nonce/timestamp pair.
    ///
    /// Formula: `md5(app_id + timestamp + version + app_secret + nonce + app_id)`,
    /// hex-encoded. Deterministic: the same inputs always produce the same
    /// signature.
    pub fn sign(&self, nonce: &str, timestamp_ms: &str) -> String {
        let mut hasher = Md5::new();
        hasher.update(self.app_id);
        hasher.update(timestamp_ms);
        hasher.update(self.app_version);
        hasher.update(self.app_secret);
        hasher.update(nonce);
        hasher.update(self.app_id);
        let digest = hasher.finalize();
        format!("{digest:x}")
    }

    /// Build the signed default header set for one outgoing request.
    ///
    /// Each call generates a fresh nonce and timestamp, so two calls never
    /// produce the same signature; nothing here is cached or reused. The
    /// bearer header is only present when the credential set carries a token.
    pub fn build_headers(&self, credentials: &CredentialSet) -> HeaderMap {
        let nonce = Uuid::new_v4().to_string();
        let timestamp = chrono::Utc::now().timestamp_millis().to_string();
        let signature = self.sign(&nonce, &timestamp);

        let mut headers = HeaderMap::new();
        insert_header(&mut headers, "XX-Device-Type", "web");
        insert_header(&mut headers, "XX-IS-CN", "2");
        insert_header(&mut headers, "XX-Version", self.app_version);
        insert_header(&mut headers, "XX-Nonce", &nonce);
        insert_header(&mut headers, "XX-Timestamp", &timestamp);
        insert_header(&mut headers, "XX-Signature", &signature);

        if let Some(token) = credentials.bearer_token() {
            insert_header(&mut headers, "XX-Token", token);
        }

        headers
    }
}

fn insert_header(headers: &mut HeaderMap, name: &'static str, value: &str) {
    match (HeaderName::from_str(name), HeaderValue::from_str(value)) {
        (Ok(name), Ok(value)) => {
            headers.insert(name, value);
        }
        (Err(e), _) => {
            debug!(header = name, error = %e, "Invalid header name; skipping");
        }
        (_, Err(e)) => {
            debug!(header = name, error = %e, "Invalid header value; skipping");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sign_is_deterministic() {
        let identity = AppIdentity::default();
        let a = identity.sign("nonce-1", "1700000000000");
        let b = identity.sign("nonce-1", "1700000000000");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_sign_changes_with_any_input() {
        let identity = AppIdentity::default();
        let base = identity.sign("nonce-1", "1700000000000");
        assert_ne!(base, identity.sign("nonce-2", "1700000000000"));
        assert_ne!(base, identity.sign("nonce-1", "1700000000001"));

        let other = AppIdentity {
            app_id: "f9b3528877c94d5c9c5af32245db46ee",
            ..AppIdentity::default()
        };
        assert_ne!(base, other.sign("nonce-1", "1700000000000"));
    }

    #[test]
    fn test_known_signature_vector() {
        // md5("abc" + "1" + "v" + "sec" + "n" + "abc")
        let identity = AppIdentity {
            app_id: "abc",
            app_secret: "sec",
            app_version: "v",
        };
        let expected = format!("{:x}", Md5::digest(b"abc1vsecnabc"));
        assert_eq!(identity.sign("n", "1"), expected);
    }

    #[test]
    fn test_build_headers_fixed_set() {
        let identity = AppIdentity::default();
        let headers = identity.build_headers(&CredentialSet::new());
        for name in [
            "XX-Device-Type",
            "XX-IS-CN",
            "XX-Version",
            "XX-Nonce",
            "XX-Timestamp",
            "XX-Signature",
        ] {
            assert!(headers.contains_key(name), "missing {name}");
        }
        assert!(!headers.contains_key("XX-Token"));

        let nonce = headers.get("XX-Nonce").unwrap().to_str().unwrap();
        let ts = headers.get("XX-Timestamp").unwrap().to_str().unwrap();
        let sig = headers.get("XX-Signature").unwrap().to_str().unwrap();
        assert_eq!(identity.sign(nonce, ts), sig);
    }

    #[test]
    fn test_build_headers_includes_token_when_present() {
        let identity = AppIdentity::default();
        let mut creds = CredentialSet::new();
        creds.set_token("token", "bearer-1");
        let headers = identity.build_headers(&creds);
        assert_eq!(headers.get("XX-Token").unwrap(), "bearer-1");
    }

    #[test]
    fn test_nonces_never_repeat() {
        let identity = AppIdentity::default();
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let headers = identity.build_headers(&CredentialSet::new());
            let nonce = headers
                .get("XX-Nonce")
                .unwrap()
                .to_str()
                .unwrap()
                .to_string();
            assert!(seen.insert(nonce), "nonce reused");
        }
    }
}
