//! Type definitions for the wallet scanner
//! Collaborator records, payment results and the risk report

use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::constants::{HIGH_RISK_CUTOFF, MEDIUM_RISK_CUTOFF};

// ============================================
// Ledger records (Etherscan txlist)
// ============================================

/// One transaction from the ledger-query API.
/// Only the fields the scorer reads are decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub hash: String,
    #[serde(default)]
    pub from: Option<String>,
    /// Empty or null for contract creations
    #[serde(default)]
    pub to: Option<String>,
    /// Unix seconds, decimal string
    #[serde(default, deserialize_with = "null_as_default")]
    pub time_stamp: String,
    /// "1" when the transaction failed
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_error: String,
}

/// A JSON `null` decodes like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl TransactionRecord {
    pub fn is_failed(&self) -> bool {
        self.is_error == "1"
    }

    /// Parsed timestamp, `None` if the ledger sent something unparsable
    pub fn timestamp_secs(&self) -> Option<i64> {
        self.time_stamp.trim().parse().ok()
    }
}

// ============================================
// Token transfers (Blockscout)
// ============================================

/// A single token-movement entry returned by the block indexer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenTransfer {
    #[serde(default)]
    pub token: Option<TransferToken>,
    #[serde(default)]
    pub from: Option<TransferParty>,
    #[serde(default)]
    pub to: Option<TransferParty>,
    #[serde(default)]
    pub total: Option<TransferTotal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferToken {
    /// Token contract (older indexer versions call it `address`)
    #[serde(default, alias = "address")]
    pub address_hash: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferParty {
    #[serde(default)]
    pub hash: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferTotal {
    /// Smallest-unit integer, decimal string
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub decimals: Option<String>,
}

impl TokenTransfer {
    pub fn token_address(&self) -> Option<&str> {
        self.token.as_ref()?.address_hash.as_deref()
    }

    pub fn sender(&self) -> Option<&str> {
        self.from.as_ref()?.hash.as_deref()
    }

    pub fn recipient(&self) -> Option<&str> {
        self.to.as_ref()?.hash.as_deref()
    }

    pub fn raw_value(&self) -> Option<&str> {
        self.total.as_ref()?.value.as_deref()
    }
}

// ============================================
// Payment verification
// ============================================

/// Outcome of checking a payment reference. Never an error: failures are
/// carried as `Invalid` with a reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentVerification {
    Valid {
        payer: String,
        /// Token amount scaled by the token decimals, 4 places
        amount: String,
    },
    Invalid {
        reason: String,
    },
}

impl PaymentVerification {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Invalid { reason } => Some(reason),
            Self::Valid { .. } => None,
        }
    }

    /// Receipt fields merged into the report for a verified payment
    pub fn receipt(&self) -> Option<PaymentReceipt> {
        match self {
            Self::Valid { payer, amount } => Some(PaymentReceipt {
                payment_verified: true,
                paid_by: payer.clone(),
                amount_paid: amount.clone(),
            }),
            Self::Invalid { .. } => None,
        }
    }
}

/// Payment metadata attached to a scan response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub payment_verified: bool,
    pub paid_by: String,
    pub amount_paid: String,
}

// ============================================
// Risk report
// ============================================

/// Risk level classification for wallets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Inclusive lower bounds, HIGH checked first
    pub fn from_score(score: u32) -> Self {
        if score >= HIGH_RISK_CUTOFF {
            RiskLevel::High
        } else if score >= MEDIUM_RISK_CUTOFF {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full scan result returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReport {
    pub address: String,
    /// Additive, not clamped
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub flags: Vec<String>,
    pub total_transactions: usize,
    pub failed_transactions: usize,
    pub unique_contracts: usize,
    pub ai_explanation: String,
    #[serde(flatten)]
    pub payment: Option<PaymentReceipt>,
}

impl RiskReport {
    pub fn with_payment(mut self, receipt: Option<PaymentReceipt>) -> Self {
        self.payment = receipt;
        self
    }
}

/// What a scan produced: a report, or the ledger's "no data" answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Report(RiskReport),
    NoData { error: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_boundaries() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(24), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(25), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(49), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(50), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(90), RiskLevel::High);
    }

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
    }

    #[test]
    fn test_transaction_record_decodes_etherscan_shape() {
        let raw = serde_json::json!({
            "blockNumber": "123",
            "timeStamp": "1700000000",
            "hash": "0xabc",
            "from": "0x1111111111111111111111111111111111111111",
            "to": "",
            "value": "0",
            "isError": "1",
            "txreceipt_status": "0"
        });
        let tx: TransactionRecord = serde_json::from_value(raw).unwrap();
        assert!(tx.is_failed());
        assert_eq!(tx.timestamp_secs(), Some(1_700_000_000));
        assert_eq!(tx.to.as_deref(), Some(""));
    }

    #[test]
    fn test_transaction_record_tolerates_nulls() {
        let raw = serde_json::json!([
            { "hash": null, "to": null, "timeStamp": null, "isError": null },
            { "hash": "0xdef", "to": "0xa", "timeStamp": "1700000000", "isError": "0" }
        ]);
        let txs: Vec<TransactionRecord> = serde_json::from_value(raw).unwrap();
        assert_eq!(txs.len(), 2);
        assert!(!txs[0].is_failed());
        assert_eq!(txs[0].timestamp_secs(), None);
        assert_eq!(txs[0].hash, "");
        assert_eq!(txs[1].timestamp_secs(), Some(1_700_000_000));
    }

    #[test]
    fn test_token_transfer_accepts_legacy_token_address() {
        let raw = serde_json::json!({
            "token": { "address": "0xToken" },
            "from": { "hash": "0xFrom" },
            "to": { "hash": "0xTo" },
            "total": { "value": "10000", "decimals": "6" }
        });
        let t: TokenTransfer = serde_json::from_value(raw).unwrap();
        assert_eq!(t.token_address(), Some("0xToken"));
        assert_eq!(t.raw_value(), Some("10000"));
    }

    #[test]
    fn test_report_serializes_camel_case_with_payment() {
        let report = RiskReport {
            address: "0xabc".to_string(),
            risk_score: 25,
            risk_level: RiskLevel::Medium,
            flags: vec!["New wallet — only 3 days old".to_string()],
            total_transactions: 3,
            failed_transactions: 0,
            unique_contracts: 2,
            ai_explanation: "ok".to_string(),
            payment: None,
        }
        .with_payment(Some(PaymentReceipt {
            payment_verified: true,
            paid_by: "0xpayer".to_string(),
            amount_paid: "0.0100".to_string(),
        }));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["riskLevel"], "MEDIUM");
        assert_eq!(json["riskScore"], 25);
        assert_eq!(json["uniqueContracts"], 2);
        assert_eq!(json["paymentVerified"], true);
        assert_eq!(json["paidBy"], "0xpayer");
        assert!(json.get("payment").is_none());
    }
}
