//! Error types for the tree store.

/// Errors raised by the path store and its collaborators.
///
/// Every failure reported by a [`TreeClient`](crate::TreeClient) surfaces as
/// [`Error::Transport`] and is returned to the caller as-is. Nothing in this
/// crate retries.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed folder reference, malformed path, or a value that is not bytes.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// The path is not a key of the current index.
    #[error("not found: {path}")]
    NotFound { path: String },

    /// The remote backend (network, auth, quota, server) failed.
    #[error("transport failure: {message}")]
    Transport { message: String },

    /// The tree client could not be constructed.
    #[error("backend unavailable: {message}")]
    BackendUnavailable { message: String },
}

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput {
            message: message.into(),
        }
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Error::NotFound { path: path.into() }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Error::Transport {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput { .. })
    }
}
