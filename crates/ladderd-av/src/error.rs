//! Error types for ladderd-av.

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised at the probe/encode process boundary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required external tool is not available.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// The prober could not run or exited non-zero.
    #[error("probe failed: {0}")]
    ProbeInvocationFailed(String),

    /// The prober's output (or one of its numeric fields) was malformed.
    #[error("failed to parse probe output: {0}")]
    ProbeParseFailed(String),

    /// The probe succeeded but the file carries no video stream.
    #[error("no video stream found in the file")]
    NoVideoStream,

    /// A resolution string could not be parsed.
    #[error(transparent)]
    ResolutionParseFailed(#[from] ladderd_common::Error),

    /// The encoder could not run or exited non-zero.
    #[error("encode failed: {0}")]
    EncodeInvocationFailed(String),
}

impl Error {
    /// Create a tool not found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create a probe invocation error.
    pub fn probe_failed(message: impl Into<String>) -> Self {
        Self::ProbeInvocationFailed(message.into())
    }

    /// Create a probe parse error.
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::ProbeParseFailed(message.into())
    }

    /// Create an encode invocation error.
    pub fn encode_failed(message: impl Into<String>) -> Self {
        Self::EncodeInvocationFailed(message.into())
    }
}
