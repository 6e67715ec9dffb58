//! API Request/Response Types
//!
//! Bodies are flat JSON objects; error bodies always carry an `error` string.

use serde::{Deserialize, Serialize};

use crate::models::types::PaymentReceipt;
use crate::utils::constants::{PAYMENT_NETWORK, PAYMENT_PRICE};

// ============================================
// Scan
// ============================================

/// Body of `POST /scan`. Anything that fails to decode is treated as an
/// empty request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    #[serde(default)]
    pub address: Option<String>,
    /// Payment reference when proofs travel in the body
    #[serde(default)]
    pub tx_hash: Option<String>,
}

impl ScanRequest {
    pub fn from_slice(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// Trimmed address, `None` when missing or blank
    pub fn address(&self) -> Option<&str> {
        non_blank(self.address.as_deref())
    }

    pub fn tx_hash(&self) -> Option<&str> {
        non_blank(self.tx_hash.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// 200 answer when the ledger had no usable history
#[derive(Debug, Serialize)]
pub struct NoDataResponse {
    pub error: String,
    #[serde(flatten)]
    pub payment: Option<PaymentReceipt>,
}

// ============================================
// Errors
// ============================================

/// Error body for 400 / 402 / 429 / 500 answers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pay_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            reason: None,
            price: None,
            network: None,
            pay_to: None,
            instructions: None,
            details: None,
        }
    }

    /// 402 body; `reason` is set when a reference was checked and rejected
    pub fn payment_required(pay_to: &str, reason: Option<String>) -> Self {
        let error = if reason.is_some() {
            "Payment verification failed"
        } else {
            "Payment Required"
        };
        Self {
            reason,
            price: Some(PAYMENT_PRICE.to_string()),
            network: Some(PAYMENT_NETWORK.to_string()),
            pay_to: Some(pay_to.to_string()),
            instructions: Some(format!(
                "Send {} on {} network then resubmit with your transaction hash",
                PAYMENT_PRICE, PAYMENT_NETWORK
            )),
            ..Self::new(error)
        }
    }

    pub fn scan_failed(details: impl Into<String>) -> Self {
        Self {
            details: Some(details.into()),
            ..Self::new("Scan failed")
        }
    }
}

// ============================================
// Health
// ============================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub payment_mode: String,
}
