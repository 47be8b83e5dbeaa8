use thiserror::Error;

/// Invalid input to the URL normalizer. Always the caller's fault, never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("invalid url {url:?}: {reason}")]
    MalformedUrl { url: String, reason: String },
    #[error("unrecognized operation {0:?}, expected one of canonical, redirection, all")]
    UnknownOperation(String),
}
