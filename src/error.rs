use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced while loading or validating tuning data.
///
/// Gameplay never fails: losses, hits and timeouts are lifecycle transitions,
/// not errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The tuning file could not be read.
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),

    /// The tuning document is not valid JSON for the expected shape.
    #[error("malformed tuning document: {0}")]
    Parse(#[from] serde_json::Error),

    /// A tuning value breaks a numeric constraint (cap below base, empty range, ...).
    #[error("invalid tuning: {0}")]
    InvalidTuning(String),
}
