//! Signed HTTP client for the vendor cloud API.
//!
//! [`CloudClient`] holds an immutable credential set and stamps every
//! outgoing request with the signed default headers plus a `Cookie` header
//! assembled from the stored cookies. Request/response traffic is mirrored
//! to the wire log in redacted form.

mod error;
mod signing;

pub use error::ClientError;
pub use signing::AppIdentity;

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::COOKIE;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use tracing::debug;

use crate::api::endpoints::{BASE_URL, Endpoint};
use crate::image_cache::{self, CacheConfig, ImageCache};
use crate::session::CredentialSet;
use crate::utils::http_log::{DEFAULT_HTTP_LOG, HttpLog};
use crate::utils::{redact_headers, redact_value, truncate_text};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the shared HTTP client used for all vendor API traffic.
pub fn default_client() -> Client {
    Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .expect("Failed to create HTTP client")
}

pub struct CloudClient {
    base_url: String,
    client: Client,
    credentials: CredentialSet,
    identity: AppIdentity,
    http_log: HttpLog,
    image_cache: ImageCache,
}

impl CloudClient {
    /// Create a client against the production base URL, with the image cache
    /// configured from the environment.
    pub fn new(credentials: CredentialSet) -> Self {
        Self::with_base_url(BASE_URL, credentials)
    }

    pub fn with_base_url(base_url: impl Into<String>, credentials: CredentialSet) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: default_client(),
            credentials,
            identity: AppIdentity::default(),
            http_log: HttpLog::new(DEFAULT_HTTP_LOG),
            image_cache: ImageCache::new(CacheConfig::from_env()),
        }
    }

    /// Replace the image cache, e.g. to isolate cache directories in tests.
    pub fn with_image_cache(mut self, cache: ImageCache) -> Self {
        self.image_cache = cache;
        self
    }

    pub fn credentials(&self) -> &CredentialSet {
        &self.credentials
    }

    pub fn image_cache(&self) -> &ImageCache {
        &self.image_cache
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    /// Create a request with the signed default headers and the stored
    /// cookies pre-applied, plus the redacted header view for logging.
    fn signed_request(
        &self,
        method: Method,
        path: &str,
    ) -> (RequestBuilder, BTreeMap<String, String>) {
        let mut headers = self.identity.build_headers(&self.credentials);

        if let Some(cookie_header) = self.credentials.cookie_header() {
            match reqwest::header::HeaderValue::from_str(&cookie_header) {
                Ok(value) => {
                    headers.insert(COOKIE, value);
                }
                Err(e) => {
                    // A malformed cookie value must not produce an invalid header.
                    debug!(error = %e, "Failed to build Cookie header; skipping");
                }
            }
        }

        let redacted = redact_headers(&headers);
        let builder = self
            .client
            .request(method, self.url_for(path))
            .headers(headers);
        (builder, redacted)
    }

    /// Create a signed request. Which cookies apply to which request is the
    /// transport's concern; all of them are sent.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.signed_request(method, path).0
    }

    /// Call an endpoint with no payload.
    pub async fn call(&self, endpoint: &Endpoint) -> Result<Value, ClientError> {
        let (builder, redacted) = self.signed_request(endpoint.method.clone(), endpoint.path);
        self.send_json(&endpoint.method, endpoint.path, builder, redacted, None)
            .await
    }

    /// Call an endpoint with query parameters.
    pub async fn call_with_query(
        &self,
        endpoint: &Endpoint,
        query: &[(&str, String)],
    ) -> Result<Value, ClientError> {
        let (builder, redacted) = self.signed_request(endpoint.method.clone(), endpoint.path);
        self.send_json(
            &endpoint.method,
            endpoint.path,
            builder.query(query),
            redacted,
            None,
        )
        .await
    }

    /// Call an endpoint with a JSON body.
    pub async fn call_with_json(
        &self,
        endpoint: &Endpoint,
        body: &Value,
    ) -> Result<Value, ClientError> {
        let (builder, redacted) = self.signed_request(endpoint.method.clone(), endpoint.path);
        self.send_json(
            &endpoint.method,
            endpoint.path,
            builder.json(body),
            redacted,
            Some(body),
        )
        .await
    }

    /// Call an endpoint with a URL-encoded form body.
    pub async fn call_with_form(
        &self,
        endpoint: &Endpoint,
        form: &[(String, String)],
    ) -> Result<Value, ClientError> {
        let (builder, redacted) = self.signed_request(endpoint.method.clone(), endpoint.path);
        let payload = Value::Object(
            form.iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        );
        self.send_json(
            &endpoint.method,
            endpoint.path,
            builder.form(form),
            redacted,
            Some(&payload),
        )
        .await
    }

    async fn send_json(
        &self,
        method: &Method,
        path: &str,
        builder: RequestBuilder,
        redacted: BTreeMap<String, String>,
        payload: Option<&Value>,
    ) -> Result<Value, ClientError> {
        let url = self.url_for(path);

        debug!("HTTP {} {} headers={:?}", method, url, redacted);
        match payload {
            Some(payload) => {
                let redacted_payload =
                    serde_json::to_string(&redact_value(payload)).unwrap_or_default();
                self.http_log.append(&format!(
                    "{method} {url} headers={redacted:?} payload={redacted_payload}"
                ));
            }
            None => {
                self.http_log
                    .append(&format!("{method} {url} headers={redacted:?}"));
            }
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        let body: Option<Value> = serde_json::from_str(&text).ok();
        let logged = match &body {
            Some(value) => serde_json::to_string(&redact_value(value)).unwrap_or_default(),
            None => truncate_text(&text, 2000),
        };
        self.http_log
            .append(&format!("{method} {url} status={status} response={logged}"));

        if !status.is_success() {
            return Err(ClientError::http_status(status, url));
        }

        body.ok_or_else(|| ClientError::NonJson(truncate_text(&text, 200)))
    }

    /// PUT a local file to a presigned storage URL. The presigned URL embeds
    /// its own authorization, so no signed headers are attached.
    pub async fn put_presigned(&self, url: &str, file: &Path) -> Result<(), ClientError> {
        let handle = tokio::fs::File::open(file).await?;
        let stream = tokio_util::io::ReaderStream::new(handle);
        let body = reqwest::Body::wrap_stream(stream);

        let response = self.client.put(url).body(body).send().await?;
        let status = response.status();
        self.http_log.append(&format!(
            "PUT {url} status={status} response=<presigned upload>"
        ));
        if !status.is_success() {
            return Err(ClientError::http_status(status, url));
        }
        Ok(())
    }

    /// Fetch image bytes through the two-tier cache.
    pub async fn fetch_image_bytes(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<Bytes, ClientError> {
        image_cache::fetch_image_bytes(&self.client, &self.image_cache, url, timeout).await
    }
}
