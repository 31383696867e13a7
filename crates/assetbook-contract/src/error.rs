use assetbook_store::StoreError;
use assetbook_types::{CodecError, TypeError};

/// Errors produced by contract operations.
///
/// Any of these aborts the invocation before a write is attempted.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("asset {0} does not exist")]
    NotFound(String),

    #[error("asset {0} already exists")]
    AlreadyExists(String),

    #[error("invalid argument {field}: {reason}")]
    InvalidArgument { field: &'static str, reason: String },

    #[error("stored asset {msisdn} is malformed: {source}")]
    Decode {
        msisdn: String,
        #[source]
        source: CodecError,
    },

    #[error("asset {msisdn} cannot be encoded: {source}")]
    Encode {
        msisdn: String,
        #[source]
        source: CodecError,
    },

    #[error("insufficient funds in {msisdn}: balance {balance}, transaction {amount}")]
    InsufficientFunds {
        msisdn: String,
        balance: f64,
        amount: f64,
    },

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("{operation} expects {expected} arguments, got {actual}")]
    Arity {
        operation: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl From<TypeError> for ContractError {
    fn from(err: TypeError) -> Self {
        let field = match &err {
            TypeError::InvalidNumber { field, .. } | TypeError::NonFiniteNumber { field, .. } => {
                *field
            }
            TypeError::InvalidTransType(_) => "transType",
        };
        Self::InvalidArgument {
            field,
            reason: err.to_string(),
        }
    }
}

pub type ContractResult<T> = Result<T, ContractError>;

/// Errors from loading contract configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
