//! Error types for image probing.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProbeError>;

/// Why a candidate image failed to load.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Only http(s) URLs, and file URLs when enabled, are probed.
    #[error("blocked: unsupported scheme `{0}`")]
    UnsupportedScheme(String),

    /// The origin is outside the configured allowlist.
    #[error("blocked: origin `{0}` not allowed")]
    OriginNotAllowed(String),

    /// Probing is switched off.
    #[error("probing disabled")]
    Disabled,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("response larger than {0} bytes")]
    TooLarge(usize),

    /// The bytes are not a decodable image.
    #[error("not an image: {0}")]
    Decode(String),

    /// The worker thread went away without reporting.
    #[error("probe worker exited")]
    WorkerGone,
}

impl From<image::ImageError> for ProbeError {
    fn from(err: image::ImageError) -> Self {
        ProbeError::Decode(err.to_string())
    }
}
