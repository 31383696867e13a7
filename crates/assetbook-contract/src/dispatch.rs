use std::fmt;
use std::str::FromStr;

use assetbook_store::WorldState;
use tracing::debug;

use crate::engine::AssetContract;
use crate::error::{ContractError, ContractResult};

/// Named operations a host can invoke.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateAsset,
    UpdateBalance,
    QueryAsset,
    GetAssetHistory,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::CreateAsset,
        Operation::UpdateBalance,
        Operation::QueryAsset,
        Operation::GetAssetHistory,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateAsset => "CreateAsset",
            Self::UpdateBalance => "UpdateBalance",
            Self::QueryAsset => "QueryAsset",
            Self::GetAssetHistory => "GetAssetHistory",
        }
    }

    /// Ordered argument names.
    pub fn params(&self) -> &'static [&'static str] {
        match self {
            Self::CreateAsset => &["dealerID", "msisdn", "mpin", "balance", "status"],
            Self::UpdateBalance => &["msisdn", "transAmount", "transType", "remarks"],
            Self::QueryAsset | Self::GetAssetHistory => &["msisdn"],
        }
    }

    pub fn arity(&self) -> usize {
        self.params().len()
    }

    /// Returns `true` if the operation never writes to world state.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::QueryAsset | Self::GetAssetHistory)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| ContractError::UnknownOperation(s.to_string()))
    }
}

impl AssetContract {
    /// Invoke an operation by name with its ordered string arguments.
    pub async fn invoke<S, A>(
        &self,
        store: &S,
        operation: &str,
        args: &[A],
    ) -> ContractResult<String>
    where
        S: WorldState + ?Sized,
        A: AsRef<str> + Sync,
    {
        let op: Operation = operation.parse()?;
        self.dispatch(store, op, args).await
    }

    /// Run `op` against `store` after checking the argument count.
    pub async fn dispatch<S, A>(
        &self,
        store: &S,
        op: Operation,
        args: &[A],
    ) -> ContractResult<String>
    where
        S: WorldState + ?Sized,
        A: AsRef<str> + Sync,
    {
        if args.len() != op.arity() {
            return Err(ContractError::Arity {
                operation: op.name(),
                expected: op.arity(),
                actual: args.len(),
            });
        }
        let arg = |i: usize| args[i].as_ref();
        debug!(op = %op, "dispatching");

        match op {
            Operation::CreateAsset => {
                self.create_asset(store, arg(0), arg(1), arg(2), arg(3), arg(4))
                    .await
            }
            Operation::UpdateBalance => {
                self.update_balance(store, arg(0), arg(1), arg(2), arg(3))
                    .await
            }
            Operation::QueryAsset => self.query_asset(store, arg(0)).await,
            Operation::GetAssetHistory => self.get_asset_history(store, arg(0)).await,
        }
    }
}
