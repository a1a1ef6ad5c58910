//! Session import and persistence.
//!
//! Credentials reach this client as browser artifacts: a cookie JSON export,
//! a token JSON export, or a full HTTP Archive recorded while logged in to
//! the vendor web app. This module normalizes any of those into a
//! [`CredentialSet`] and persists it as a session file for later launches.

mod error;
mod har;
mod store;
mod types;

pub use error::SessionError;
pub use har::load_session_from_har;
pub use store::{
    DEFAULT_SESSION_PATH, load_cookies_from_json, load_session, load_tokens_from_json,
    save_session,
};
pub use types::{Cookie, CredentialSet};
