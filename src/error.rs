use thiserror::Error;

/// Error types that can occur while scoring and rendering worker responses.
#[derive(Debug, Error)]
pub enum HivemindError {
    /// The query layer could not reach any worker
    #[error("Transport error: {0}")]
    Transport(String),
    /// A code block could not be highlighted
    #[error("Highlight error: {0}")]
    Highlight(String),
    /// Invalid configuration values
    #[error("Config error: {0}")]
    Config(String),
    /// JSON serialization/deserialization errors
    #[error("JSON parse error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for HivemindError {
    fn from(err: serde_json::Error) -> Self {
        HivemindError::Json(format!(
            "{} at line {} column {}",
            err,
            err.line(),
            err.column()
        ))
    }
}

impl From<syntect::Error> for HivemindError {
    fn from(err: syntect::Error) -> Self {
        HivemindError::Highlight(err.to_string())
    }
}
