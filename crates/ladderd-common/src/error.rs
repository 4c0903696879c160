//! Common error types used throughout ladderd.

/// Common error type for ladderd.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A `"<width>x<height>"` string could not be parsed.
    #[error("invalid resolution '{input}': {reason}")]
    ResolutionParseFailed { input: String, reason: String },

    /// A request path escapes the work root or is otherwise unusable.
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl Error {
    /// Create a new ResolutionParseFailed error.
    pub fn resolution<S: Into<String>, R: Into<String>>(input: S, reason: R) -> Self {
        Self::ResolutionParseFailed {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a new InvalidPath error.
    pub fn invalid_path<S: Into<String>>(msg: S) -> Self {
        Self::InvalidPath(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
