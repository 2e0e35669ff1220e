use thiserror::Error;

#[derive(Error, Debug)]
pub enum TfError {
    /// The requested time is older than the oldest sample of a dynamic edge.
    #[error("Attempted lookup in the past: {0}")]
    AttemptedLookupInPast(String),

    /// The requested time is newer than the latest sample of a dynamic edge.
    #[error("Attempted lookup in the future: {0}")]
    AttemptedLookUpInFuture(String),

    /// Unknown frame, disconnected frames or an edge without samples.
    #[error("Could not find transform: {0}")]
    CouldNotFindTransform(String),

    /// The update would break the tree: cycle, second parent or kind change.
    #[error("Invalid graph: {0}")]
    InvalidGraph(String),

    #[error("observer must be callable")]
    ObserverNotCallable,

    #[error("Loader error: {0}")]
    LoaderError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TfError {
    /// Prefix the detail message with where the error happened.
    pub fn with_context(self, context: &str) -> Self {
        match self {
            TfError::AttemptedLookupInPast(msg) => {
                TfError::AttemptedLookupInPast(format!("{context}: {msg}"))
            }
            TfError::AttemptedLookUpInFuture(msg) => {
                TfError::AttemptedLookUpInFuture(format!("{context}: {msg}"))
            }
            TfError::CouldNotFindTransform(msg) => {
                TfError::CouldNotFindTransform(format!("{context}: {msg}"))
            }
            TfError::InvalidGraph(msg) => TfError::InvalidGraph(format!("{context}: {msg}")),
            TfError::LoaderError(msg) => TfError::LoaderError(format!("{context}: {msg}")),
            TfError::Config(msg) => TfError::Config(format!("{context}: {msg}")),
            other => other,
        }
    }
}

pub type TfResult<T> = Result<T, TfError>;
