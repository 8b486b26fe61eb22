use std::fmt::Display;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FaultError>;

/// Failures manufactured by the injector for the host to surface.
///
/// These are the injector's product, not its own failures: the host is
/// expected to treat each one exactly as it would treat the real fault of
/// that kind. [`FaultError::is_retryable`] tells the host's retry layer
/// which tier it drew.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FaultError {
    #[error("Connection Error - simulated connection refused: {0}")]
    Connection(String),

    #[error("Timeout Error - simulated timeout: {0}")]
    Timeout(String),

    #[error("HTTP Error - simulated server error (500): {0}")]
    ServerError(String),

    #[error("Image Error - simulated 404 Not Found: {0}")]
    ImageNotFound(String),

    #[error("Image Error - simulated corrupt image data: {0}")]
    CorruptImage(String),

    #[error("Fault Error - simulated unknown failure: {0}")]
    Unknown(String),
}

impl FaultError {
    /// Returns true when the fault is transient and the operation should be
    /// retried or re-queued. Permanent faults (404, corrupt data) should be
    /// reported terminal instead.
    ///
    /// Kinds not known to be transient classify as terminal, so a newly
    /// added variant can never cause a retry loop by omission.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FaultError::Connection(_) | FaultError::Timeout(_) | FaultError::ServerError(_)
        )
    }
}

/// Closed set of image-failure kinds a caller can request from
/// [`image_error`](crate::FaultInjector::image_error).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFaultKind {
    /// The image responds 404 Not Found.
    NotFound,
    /// The image bytes arrive undecodable.
    Corrupt,
    /// The download times out.
    Timeout,
    /// Any other failure; maps to a generic fault rather than silently
    /// succeeding.
    Unknown,
}

impl ImageFaultKind {
    /// Converts a string slice to an `ImageFaultKind` variant.
    /// Case insensitivity is considered to enhance usability; anything
    /// unrecognized maps to [`ImageFaultKind::Unknown`].
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "404" => ImageFaultKind::NotFound,
            "corrupt" => ImageFaultKind::Corrupt,
            "timeout" => ImageFaultKind::Timeout,
            _ => ImageFaultKind::Unknown,
        }
    }
}

impl Display for ImageFaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            ImageFaultKind::NotFound => write!(f, "404"),
            ImageFaultKind::Corrupt => write!(f, "corrupt"),
            ImageFaultKind::Timeout => write!(f, "timeout"),
            ImageFaultKind::Unknown => write!(f, "unknown"),
        }
    }
}
