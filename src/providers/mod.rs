//! Providers Module - External Data Sources
//!
//! One client per collaborator (Blockscout, Etherscan, Groq), each behind a
//! trait so the scanning core can run against in-memory fakes.

pub mod blockscout;
pub mod etherscan;
pub mod groq;
pub mod retry;

pub use blockscout::BlockscoutClient;
pub use etherscan::EtherscanClient;
pub use groq::GroqClient;
pub use retry::RetryPolicy;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, USER_AGENT};

use crate::models::config::HttpPolicy;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{TokenTransfer, TransactionRecord};
use crate::utils::constants::USER_AGENT as USER_AGENT_CONST;

/// Block indexer: token transfers recorded in one transaction
#[async_trait]
pub trait TransferIndexer: Send + Sync {
    async fn token_transfers(&self, tx_hash: &str) -> AppResult<Vec<TokenTransfer>>;
}

/// Ledger query: most recent transactions of an address, newest first
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn recent_transactions(&self, address: &str) -> AppResult<LedgerPage>;
}

/// Text generation: opaque prose for a prompt
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> AppResult<String>;
}

/// What the ledger returned for a history query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerPage {
    Transactions(Vec<TransactionRecord>),
    /// `result` was not a list (bad address, bad key, ...); carries the
    /// ledger's own message
    NotAList(String),
}

/// HTTP client shared by the providers: user agent, gzip, policy timeout
pub(crate) fn build_client(policy: &HttpPolicy) -> AppResult<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(policy.timeout)
        .gzip(true)
        .build()
        .map_err(|e| AppError::with_source(ErrorCode::ConfigInvalidValue, "Failed to build HTTP client", e))
}

/// Reject non-success statuses, tagging the error with the service name
pub(crate) fn check_status(service: &str, response: reqwest::Response) -> AppResult<reqwest::Response> {
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::upstream_status(service, status.as_u16()));
    }
    Ok(response)
}
