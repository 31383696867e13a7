//! Foundation types for assetbook.
//!
//! This crate provides the record, history, and temporal types shared by the
//! store and the contract crates, plus the byte codec used to persist asset
//! records in world state.
//!
//! # Key Types
//!
//! - [`AssetRecord`]: The per-subscriber ledger entry keyed by `msisdn`
//! - [`TransType`]: Kind of the most recently applied transaction
//! - [`HistoryEntry`]: Point-in-time snapshot reconstructed from the change log
//! - [`Timestamp`]: Host-assigned commit time
//! - [`codec`]: Deterministic encode/decode of [`AssetRecord`]
//! - [`amount`]: Strict parsing of numeric string arguments

pub mod amount;
pub mod codec;
pub mod error;
pub mod record;
pub mod timestamp;

pub use amount::parse_amount;
pub use codec::{decode, encode};
pub use error::{CodecError, TypeError};
pub use record::{AssetRecord, HistoryEntry, TransType};
pub use timestamp::Timestamp;
