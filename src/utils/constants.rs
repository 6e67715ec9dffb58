//! Constants Module - Single Source of Truth
//!
//! Every threshold, weight, endpoint and token parameter used by the scanner
//! lives here. Other modules import these instead of repeating literals.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "WalletScanner";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for outbound HTTP requests
pub const USER_AGENT: &str = "WalletScanner/0.1.0";

/// Default listening port
pub const DEFAULT_PORT: u16 = 3000;

/// Default listening host
pub const DEFAULT_HOST: &str = "0.0.0.0";

// ============================================
// HTTP CLIENT POLICY
// ============================================

/// Default timeout for every collaborator call (seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Default attempts per collaborator call (1 = no retries)
pub const DEFAULT_HTTP_MAX_ATTEMPTS: u32 = 1;

/// Base retry delay in milliseconds
pub const RETRY_BASE_DELAY_MS: u64 = 1000;

/// Retry delay cap in milliseconds
pub const RETRY_MAX_DELAY_MS: u64 = 64_000;

/// Jitter applied to each retry delay (percent of the delay)
pub const RETRY_JITTER_PERCENT: u64 = 20;

/// Floor for a jittered delay in milliseconds
pub const RETRY_MIN_DELAY_MS: u64 = 100;

/// Default requests per client per minute on the scan endpoint
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 100;

// ============================================
// PAYMENT (USDC ON BASE)
// ============================================

/// USDC token contract on Base
pub const USDC_CONTRACT_BASE: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";

/// USDC decimal precision
pub const USDC_DECIMALS: u8 = 6;

/// Minimum accepted payment in smallest units (~$0.01 at 6 decimals)
pub const MINIMUM_PAYMENT_UNITS: u64 = 9000;

/// Decimal places used when reporting a paid amount
pub const AMOUNT_DISPLAY_PLACES: u32 = 4;

/// Advertised price
pub const PAYMENT_PRICE: &str = "$0.01 USDC";

/// Advertised network
pub const PAYMENT_NETWORK: &str = "Base";

/// Default header carrying the payment reference in header mode
pub const DEFAULT_PAYMENT_HEADER: &str = "X-PAYMENT";

// ============================================
// COLLABORATOR ENDPOINTS
// ============================================

/// Blockscout (Base) base URL
pub const BLOCKSCOUT_BASE_URL: &str = "https://base.blockscout.com";

/// Etherscan v2 base URL
pub const ETHERSCAN_BASE_URL: &str = "https://api.etherscan.io/v2/api";

/// Chain queried for wallet history (Ethereum mainnet)
pub const HISTORY_CHAIN_ID: u64 = 1;

/// Page size for the history query
pub const HISTORY_PAGE_SIZE: u32 = 100;

/// Highest block passed to the history query
pub const HISTORY_END_BLOCK: u64 = 99_999_999;

/// Groq OpenAI-compatible base URL
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default explanation model
pub const GROQ_DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Generation budget for the explanation
pub const EXPLANATION_MAX_TOKENS: u32 = 300;

// ============================================
// RISK SCORING
// ============================================

/// Score added when the wallet has no history
pub const WEIGHT_NO_HISTORY: u32 = 20;

/// Score added for too many failed transactions
pub const WEIGHT_FAILED_TX: u32 = 30;

/// Score added for a young wallet
pub const WEIGHT_NEW_WALLET: u32 = 25;

/// Score added for many distinct counterparties
pub const WEIGHT_MANY_CONTRACTS: u32 = 15;

/// Failed transactions tolerated before flagging (strictly greater flags)
pub const FAILED_TX_THRESHOLD: usize = 5;

/// Wallets younger than this many days are flagged
pub const NEW_WALLET_DAYS: f64 = 30.0;

/// Distinct recipients tolerated before flagging (strictly greater flags)
pub const UNIQUE_CONTRACTS_THRESHOLD: usize = 50;

/// Inclusive lower bound of HIGH
pub const HIGH_RISK_CUTOFF: u32 = 50;

/// Inclusive lower bound of MEDIUM
pub const MEDIUM_RISK_CUTOFF: u32 = 25;

/// Seconds per day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_cutoffs_ordered() {
        assert!(HIGH_RISK_CUTOFF > MEDIUM_RISK_CUTOFF);
    }

    #[test]
    fn test_minimum_payment_is_about_one_cent() {
        let dollars = MINIMUM_PAYMENT_UNITS as f64 / 10f64.powi(USDC_DECIMALS as i32);
        assert!(dollars > 0.0 && dollars <= 0.01);
    }
}
