use thiserror::Error;

pub type Result<T> = std::result::Result<T, IntentError>;

/// Errors raised while loading a ruleset.
///
/// Resolution itself never fails: malformed regex triggers and unparsable
/// numbers degrade to "no match" and "unresolved" respectively.
#[derive(Error, Debug)]
pub enum IntentError {
    #[error("Failed to read ruleset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed ruleset JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid intent at index {index}: {reason}")]
    InvalidIntent { index: usize, reason: String },
}
