use assetbook_store::WorldState;
use assetbook_types::{codec, parse_amount, AssetRecord, CodecError, TransType};
use tracing::debug;

use crate::config::{ContractConfig, CreatePolicy};
use crate::error::{ContractError, ContractResult};
use crate::history::HistoryReconstructor;

/// State-transition engine for asset records.
///
/// Holds configuration only; all state lives in the [`WorldState`] passed to
/// each operation. An invocation is a straight read, validate, write sequence
/// with no side effects outside the store, so a host may re-run it from
/// scratch after a commit conflict.
#[derive(Clone, Debug, Default)]
pub struct AssetContract {
    config: ContractConfig,
}

impl AssetContract {
    pub fn new(config: ContractConfig) -> Self {
        Self { config }
    }

    /// Create a record under `msisdn` with no transaction applied.
    pub async fn create_asset<S: WorldState + ?Sized>(
        &self,
        store: &S,
        dealer_id: &str,
        msisdn: &str,
        mpin: &str,
        balance: &str,
        status: &str,
    ) -> ContractResult<String> {
        let balance = parse_amount("balance", balance)?;

        if self.config.create_policy == CreatePolicy::RejectExisting
            && load_bytes(store, msisdn).await?.is_some()
        {
            return Err(ContractError::AlreadyExists(msisdn.to_string()));
        }

        let record = AssetRecord::new(dealer_id, msisdn, mpin, balance, status);
        store.put(msisdn, encode_record(&record)?).await?;

        debug!(msisdn, balance, "asset created");
        Ok(format!("Asset {msisdn} created successfully"))
    }

    /// Apply a debit or credit to the record under `msisdn`.
    pub async fn update_balance<S: WorldState + ?Sized>(
        &self,
        store: &S,
        msisdn: &str,
        trans_amount: &str,
        trans_type: &str,
        remarks: &str,
    ) -> ContractResult<String> {
        let mut record = self.read_asset(store, msisdn).await?;
        let amount = parse_amount("transAmount", trans_amount)?;
        let kind: TransType = trans_type.parse()?;

        let balance = match kind {
            TransType::Debit => record.balance - amount,
            TransType::Credit => record.balance + amount,
            TransType::Unset => {
                return Err(ContractError::InvalidArgument {
                    field: "transType",
                    reason: "Transaction type must be either debit or credit".into(),
                })
            }
        };
        if !balance.is_finite() {
            return Err(ContractError::InvalidArgument {
                field: "transAmount",
                reason: format!("applying {trans_amount} overflows the balance"),
            });
        }
        if !self.config.allow_negative_balance && balance < 0.0 && balance < record.balance {
            return Err(ContractError::InsufficientFunds {
                msisdn: msisdn.to_string(),
                balance: record.balance,
                amount,
            });
        }

        record.balance = balance;
        record.trans_amount = amount;
        record.trans_type = kind;
        record.remarks = remarks.to_string();
        store.put(msisdn, encode_record(&record)?).await?;

        debug!(msisdn, %kind, amount, balance, "balance updated");
        Ok(format!("Balance for asset {msisdn} updated successfully"))
    }

    /// Current record under `msisdn`, rendered as JSON.
    pub async fn query_asset<S: WorldState + ?Sized>(
        &self,
        store: &S,
        msisdn: &str,
    ) -> ContractResult<String> {
        let record = self.read_asset(store, msisdn).await?;
        render(msisdn, &record)
    }

    /// Every stored snapshot of `msisdn`, oldest first, rendered as JSON.
    pub async fn get_asset_history<S: WorldState + ?Sized>(
        &self,
        store: &S,
        msisdn: &str,
    ) -> ContractResult<String> {
        let entries = HistoryReconstructor::reconstruct(store, msisdn).await?;
        render(msisdn, &entries)
    }

    /// Load and decode the record under `msisdn`.
    pub async fn read_asset<S: WorldState + ?Sized>(
        &self,
        store: &S,
        msisdn: &str,
    ) -> ContractResult<AssetRecord> {
        let bytes = load_bytes(store, msisdn)
            .await?
            .ok_or_else(|| ContractError::NotFound(msisdn.to_string()))?;
        codec::decode(&bytes).map_err(|source| ContractError::Decode {
            msisdn: msisdn.to_string(),
            source,
        })
    }
}

/// Read `msisdn`, treating an empty value the same as an absent one.
async fn load_bytes<S: WorldState + ?Sized>(
    store: &S,
    msisdn: &str,
) -> ContractResult<Option<Vec<u8>>> {
    let bytes = store.get(msisdn).await?;
    debug!(msisdn, found = bytes.is_some(), "world state get");
    Ok(bytes.filter(|b| !b.is_empty()))
}

fn encode_record(record: &AssetRecord) -> ContractResult<Vec<u8>> {
    codec::encode(record).map_err(|source| ContractError::Encode {
        msisdn: record.msisdn.clone(),
        source,
    })
}

fn render<T: serde::Serialize + ?Sized>(msisdn: &str, value: &T) -> ContractResult<String> {
    serde_json::to_string(value).map_err(|e| ContractError::Encode {
        msisdn: msisdn.to_string(),
        source: CodecError::Malformed(e.to_string()),
    })
}
