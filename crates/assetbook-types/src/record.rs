use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::timestamp::Timestamp;

/// Kind of the most recent transaction applied to an [`AssetRecord`].
///
/// `Unset` is the state of a freshly created record and serializes as `""`.
/// Callers can only ever request [`TransType::Debit`] or [`TransType::Credit`];
/// see the [`FromStr`] impl.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransType {
    #[default]
    #[serde(rename = "")]
    Unset,
    #[serde(rename = "debit")]
    Debit,
    #[serde(rename = "credit")]
    Credit,
}

impl TransType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unset => "",
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

impl fmt::Display for TransType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransType {
    type Err = TypeError;

    /// Exact, case-sensitive match on `debit` / `credit`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debit" => Ok(Self::Debit),
            "credit" => Ok(Self::Credit),
            other => Err(TypeError::InvalidTransType(other.to_string())),
        }
    }
}

/// Ledger entry for one subscriber, stored in world state under `msisdn`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetRecord {
    #[serde(rename = "dealerID")]
    pub dealer_id: String,
    pub msisdn: String,
    /// Stored verbatim.
    pub mpin: String,
    pub balance: f64,
    pub status: String,
    #[serde(rename = "transAmount")]
    pub trans_amount: f64,
    #[serde(rename = "transType")]
    pub trans_type: TransType,
    pub remarks: String,
}

impl AssetRecord {
    /// A freshly created record with no transaction applied yet.
    pub fn new(
        dealer_id: impl Into<String>,
        msisdn: impl Into<String>,
        mpin: impl Into<String>,
        balance: f64,
        status: impl Into<String>,
    ) -> Self {
        Self {
            dealer_id: dealer_id.into(),
            msisdn: msisdn.into(),
            mpin: mpin.into(),
            balance,
            status: status.into(),
            trans_amount: 0.0,
            trans_type: TransType::Unset,
            remarks: String::new(),
        }
    }

    /// Name of the first numeric field holding NaN or an infinity, if any.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        if !self.balance.is_finite() {
            Some("balance")
        } else if !self.trans_amount.is_finite() {
            Some("transAmount")
        } else {
            None
        }
    }
}

/// One point-in-time snapshot of an asset, reconstructed from the store's
/// change log for its key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "txId")]
    pub tx_id: String,
    pub timestamp: Timestamp,
    #[serde(rename = "isDelete")]
    pub is_delete: bool,
    pub value: AssetRecord,
}
