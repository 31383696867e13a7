/// Errors from world-state store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store did not answer or refused the call.
    #[error("world state unavailable: {0}")]
    Unavailable(String),

    /// The store rejected a write.
    #[error("write to {key} rejected: {reason}")]
    Rejected { key: String, reason: String },

    /// A history iterator was used after it was closed.
    #[error("history iterator for {0} is closed")]
    IteratorClosed(String),

    /// Serialization or deserialization failure of a state snapshot.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from a file-backed snapshot.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
