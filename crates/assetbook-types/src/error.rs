use thiserror::Error;

/// Errors produced when parsing caller-supplied values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("{field} must be a decimal number, got {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} must be a finite number, got {value:?}")]
    NonFiniteNumber { field: &'static str, value: String },

    #[error("Transaction type must be either debit or credit, got {0:?}")]
    InvalidTransType(String),
}

/// Errors produced by the asset record codec.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Stored bytes are not a well-formed encoding of an asset record.
    #[error("malformed asset record: {0}")]
    Malformed(String),

    /// A numeric field holds NaN or an infinity and cannot be encoded.
    #[error("cannot encode non-finite value in field {0}")]
    NonFinite(&'static str),
}
