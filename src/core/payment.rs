//! Payment Verification Module
//!
//! Confirms that a transaction moved at least the minimum amount of the
//! payment token to the scanner's receiver. Every failure, including
//! transport errors, becomes `PaymentVerification::Invalid` with a reason.

use alloy_primitives::U256;
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::config::{PaymentToken, ScannerConfig};
use crate::models::types::{PaymentVerification, TokenTransfer};
use crate::providers::TransferIndexer;
use crate::utils::constants::{AMOUNT_DISPLAY_PLACES, PAYMENT_NETWORK, PAYMENT_PRICE};

pub struct PaymentVerifier {
    indexer: Arc<dyn TransferIndexer>,
    token: PaymentToken,
    /// As configured, used in client-facing messages
    receiver: String,
    receiver_lower: String,
}

impl PaymentVerifier {
    pub fn new(indexer: Arc<dyn TransferIndexer>, config: &ScannerConfig) -> Self {
        Self {
            indexer,
            token: config.payment_token.clone(),
            receiver: config.receiver_address.clone(),
            receiver_lower: config.receiver_normalized(),
        }
    }

    /// Verify a payment reference. Never fails.
    pub async fn verify(&self, tx_ref: &str) -> PaymentVerification {
        let tx_ref = tx_ref.trim();
        if !is_tx_hash(tx_ref) {
            return PaymentVerification::invalid(
                "Could not verify payment: malformed transaction hash",
            );
        }

        let result = match self.indexer.token_transfers(tx_ref).await {
            Ok(transfers) => self.evaluate(&transfers),
            Err(e) => {
                warn!(code = e.code_str(), "⚠️ Payment lookup failed for {}: {}", tx_ref, e);
                PaymentVerification::invalid(format!("Could not verify payment: {}", e.message))
            }
        };

        match &result {
            PaymentVerification::Valid { payer, amount } => {
                info!("💰 Payment verified: {} USDC from {} ({})", amount, payer, tx_ref)
            }
            PaymentVerification::Invalid { reason } => {
                info!("🚫 Payment rejected for {}: {}", tx_ref, reason)
            }
        }
        result
    }

    /// Judge the transfers of one transaction. The first transfer of the
    /// payment token to the receiver is the one that counts.
    pub fn evaluate(&self, transfers: &[TokenTransfer]) -> PaymentVerification {
        if transfers.is_empty() {
            return PaymentVerification::invalid(format!(
                "Transaction not found on {} network.",
                PAYMENT_NETWORK
            ));
        }

        let contract = self.token.contract.to_lowercase();
        let matched = transfers.iter().find(|t| {
            let is_token = t.token_address().map(str::to_lowercase).as_deref() == Some(contract.as_str());
            let is_to_us =
                t.recipient().map(str::to_lowercase).as_deref() == Some(self.receiver_lower.as_str());
            is_token && is_to_us
        });

        let Some(transfer) = matched else {
            return PaymentVerification::invalid(format!(
                "No USDC payment found to scanner wallet. Send USDC on {} to: {}",
                PAYMENT_NETWORK, self.receiver
            ));
        };

        let Some(value) = transfer.raw_value().and_then(parse_units) else {
            return PaymentVerification::invalid("Could not verify payment: invalid transfer value");
        };

        let amount = format_units(value, self.token.decimals, AMOUNT_DISPLAY_PLACES);
        if value < U256::from(self.token.minimum_units) {
            return PaymentVerification::invalid(format!(
                "Payment too low. Need {}. Found: ${}",
                PAYMENT_PRICE, amount
            ));
        }

        match transfer.sender() {
            Some(payer) => PaymentVerification::Valid {
                payer: payer.to_string(),
                amount,
            },
            None => PaymentVerification::invalid("Could not verify payment: transfer has no sender"),
        }
    }
}

/// `0x` followed by 32 bytes of hex
pub fn is_tx_hash(candidate: &str) -> bool {
    candidate
        .strip_prefix("0x")
        .map_or(false, |h| h.len() == 64 && hex::decode(h).is_ok())
}

fn parse_units(raw: &str) -> Option<U256> {
    U256::from_str_radix(raw.trim(), 10).ok()
}

/// Scale a smallest-unit value by `decimals`, rounded half-up to `places`
pub fn format_units(value: U256, decimals: u8, places: u32) -> String {
    let ten = U256::from(10u64);
    let decimals = decimals as u32;

    let scaled = if places >= decimals {
        value.saturating_mul(ten.pow(U256::from(places - decimals)))
    } else {
        // divide first, round on the remainder; no intermediate overflow
        let divisor = ten.pow(U256::from(decimals - places));
        let quotient = value / divisor;
        let remainder = value % divisor;
        if remainder >= divisor - remainder {
            quotient + U256::from(1u64)
        } else {
            quotient
        }
    };

    if places == 0 {
        return scaled.to_string();
    }
    let unit = ten.pow(U256::from(places));
    let whole = scaled / unit;
    let frac = scaled % unit;
    format!(
        "{}.{:0>width$}",
        whole,
        frac.to_string(),
        width = places as usize
    )
}
