use std::path::PathBuf;

/// Result type for split operations
pub type SplitResult<T> = Result<T, SplitError>;

/// Fatal errors that abort a split run.
///
/// Per-file relocation problems are not represented here; they are collected
/// as [`crate::core::RelocationFailure`] values so the run can continue.
#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    /// A required input path does not exist or is not a directory.
    #[error("path not found: {path:?} ({reason})")]
    PathNotFound { path: PathBuf, reason: String },

    /// A configuration value is outside its accepted range.
    #[error("invalid value for {name}: {message}")]
    InvalidArgument { name: &'static str, message: String },

    /// A filesystem operation that the run cannot continue without failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The split report could not be serialized.
    #[error("failed to serialize split report: {0}")]
    Report(#[from] serde_json::Error),
}

impl SplitError {
    pub(crate) fn path_not_found(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        SplitError::PathNotFound {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        SplitError::Io {
            context: context.into(),
            source,
        }
    }
}
