use thiserror::Error;

/// Errors from the upstream tag source or the image registry.
///
/// Any of these aborts the run before building anything.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limited: retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors from an external image tool invocation, scoped to one candidate.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command `{command}` exited with status {code:?}")]
    Failed { command: String, code: Option<i32> },

    #[error("Image {image} does not report version {expected}")]
    VersionMismatch { expected: String, image: String },
}
