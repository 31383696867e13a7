//! Asset ledger contract for assetbook.
//!
//! This crate is the heart of assetbook. It provides:
//! - [`AssetContract`], the state-transition engine for `CreateAsset`,
//!   `UpdateBalance` and `QueryAsset`
//! - [`HistoryReconstructor`], which turns a key's change log into an ordered
//!   list of snapshots for `GetAssetHistory`
//! - [`Operation`] and [`AssetContract::invoke`], the name-based dispatch
//!   table a host calls with ordered string arguments
//! - [`ContractConfig`], loaded from TOML
//!
//! The world state is always passed in by the caller; the contract keeps no
//! state of its own between invocations.

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod history;

pub use config::{ContractConfig, CreatePolicy};
pub use dispatch::Operation;
pub use engine::AssetContract;
pub use error::{ConfigError, ContractError, ContractResult};
pub use history::HistoryReconstructor;
