use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    #[error("request failed with HTTP {status} for {url}")]
    HttpStatus { status: StatusCode, url: String },

    #[error("non-JSON response: {0}")]
    NonJson(String),

    #[error("unexpected response shape: {0}")]
    UnexpectedResponse(String),

    #[error("API error: code={code} msg={msg}")]
    Api { code: i64, msg: String },

    #[error("missing preSignUrl from lockStorageSpace")]
    MissingPresignUrl,

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl ClientError {
    pub fn http_status(status: StatusCode, url: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            url: url.into(),
        }
    }

    pub fn unexpected(reason: impl Into<String>) -> Self {
        Self::UnexpectedResponse(reason.into())
    }
}
