//! Blockscout API Client (Base)
//!
//! Looks up the token transfers recorded in a single transaction.
//!
//! API: GET {base}/api/v2/transactions/{hash}/token-transfers
//! Free, no API key required

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use super::{build_client, check_status, TransferIndexer};
use crate::models::config::{HttpPolicy, ScannerConfig};
use crate::models::errors::AppResult;
use crate::models::types::TokenTransfer;
use crate::providers::retry::RetryPolicy;

const SERVICE: &str = "Blockscout";

/// Token-transfers endpoint response
#[derive(Debug, Deserialize)]
pub struct TokenTransfersResponse {
    #[serde(default)]
    pub items: Option<Vec<TokenTransfer>>,
}

/// Blockscout API client
pub struct BlockscoutClient {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl BlockscoutClient {
    pub fn new(base_url: impl Into<String>, policy: &HttpPolicy) -> AppResult<Self> {
        Ok(Self {
            client: build_client(policy)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: policy.retry,
        })
    }

    pub fn from_config(config: &ScannerConfig) -> AppResult<Self> {
        Self::new(config.blockscout_url.clone(), &config.http)
    }

    fn transfers_url(&self, tx_hash: &str) -> String {
        format!(
            "{}/api/v2/transactions/{}/token-transfers",
            self.base_url, tx_hash
        )
    }
}

#[async_trait]
impl TransferIndexer for BlockscoutClient {
    async fn token_transfers(&self, tx_hash: &str) -> AppResult<Vec<TokenTransfer>> {
        let url = self.transfers_url(tx_hash);

        info!("🔍 Blockscout: fetching token transfers for {}", tx_hash);

        let data = self.retry.run(SERVICE, || fetch_transfers(&self.client, &url)).await?;

        let items = data.items.unwrap_or_default();
        debug!("📊 Blockscout: {} transfers in {}", items.len(), tx_hash);
        Ok(items)
    }
}

async fn fetch_transfers(client: &reqwest::Client, url: &str) -> AppResult<TokenTransfersResponse> {
    let response = check_status(SERVICE, client.get(url).send().await?)?;
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfers_url_trims_trailing_slash() {
        let client = BlockscoutClient::new("https://base.blockscout.com/", &HttpPolicy::default())
            .unwrap();
        assert_eq!(
            client.transfers_url("0xabc"),
            "https://base.blockscout.com/api/v2/transactions/0xabc/token-transfers"
        );
    }

    #[test]
    fn test_missing_items_decodes_as_none() {
        let data: TokenTransfersResponse = serde_json::from_str("{}").unwrap();
        assert!(data.items.is_none());
    }
}
