use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every way a call into the FMP pipeline can fail.
///
/// Transport errors carry no URL: the request URL embeds the access key, so
/// it is stripped before the error leaves the client.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ──
    #[error("{0}")]
    Transport(reqwest::Error),

    #[error("HTTP {status} returned from {endpoint}")]
    Http {
        endpoint: String,
        status: reqwest::StatusCode,
    },

    #[error("{0}")]
    Api(String),

    // ── Response shape ──
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),

    // ── User selection ──
    #[error("invalid selection: {0}")]
    Validation(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    // ── Export ──
    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport(e.without_url())
    }
}
