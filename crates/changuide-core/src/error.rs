use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} for URL: {url}")]
    Status { status: u16, url: String },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Login required: {0}")]
    LoginRequired(String),

    #[error("Channel not found: {0}")]
    ChannelNotFound(u64),

    #[error("{0}")]
    Other(String),
}

/// Coarse classification used by widgets to pick a recovery state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request did not complete or returned a non-success status
    Network,
    /// A response arrived but did not have the expected shape
    Malformed,
}

impl Error {
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Json(_) | Error::Malformed(_) | Error::ChannelNotFound(_) => {
                FailureKind::Malformed
            }
            Error::Http(e) if e.is_decode() => FailureKind::Malformed,
            _ => FailureKind::Network,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
