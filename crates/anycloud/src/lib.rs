//! Client library for a vendor cloud-printing service.
//!
//! Sessions are imported from browser artifacts (HAR captures or raw
//! cookie/token JSON), every API call is stamped with the vendor's signed
//! header set, and thumbnail fetches go through a bounded two-tier cache.
//!
//! ```rust,no_run
//! use anycloud_client::api;
//! use anycloud_client::client::CloudClient;
//! use anycloud_client::session::load_session;
//!
//! # async fn doc() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = load_session(std::path::Path::new(".anycloud/session.json"))?;
//! let client = CloudClient::new(credentials);
//! for file in api::list_files(&client, 1, 10).await? {
//!     println!("{}\t{}", file.id, file.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod image_cache;
pub mod session;
pub mod utils;

pub use client::{ClientError, CloudClient};
pub use image_cache::{CacheConfig, ImageCache};
pub use session::{Cookie, CredentialSet, SessionError};
