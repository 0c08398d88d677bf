use std::path::PathBuf;

/// Outcome channel for every remote operation and for the tree walk.
///
/// Recovery rules are narrow: `ResourceDoesNotExist` is recoverable during
/// section overwrite (lookup miss means "go straight to create") and during
/// delete (already absent). Every other variant aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The remote answered 404, or a section lookup found no match.
    #[error("the requested resource does not exist on the helpdesk")]
    ResourceDoesNotExist,

    /// Non-404 HTTP failure or transport error. Carries the raw response
    /// body so the run's final message is enough to debug the request.
    #[error("unexpected request error (status {status:?}): {detail}")]
    UnexpectedRequestError {
        status: Option<u16>,
        detail: String,
    },

    /// A 2xx response whose body is missing a required field or cannot be
    /// decoded into the expected shape.
    #[error("unexpected request result: {0}")]
    UnexpectedRequestResult(String),

    /// An article file with no enclosing section directory.
    #[error("invalid file structure: {0}")]
    InvalidFileStructure(String),

    /// An already-created article came back without an id during publish.
    #[error("article has no id, cannot publish its translations")]
    MissingArticleId,

    /// Local filesystem failure while reading an article body or an
    /// attachment payload.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }
}
