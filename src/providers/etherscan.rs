//! Etherscan v2 API Client
//!
//! Fetches the most recent transactions of an address
//! (`module=account&action=txlist`, newest first, one page of 100).
//!
//! Etherscan answers HTTP 200 even for bad input; in that case `result` is a
//! message string instead of a list.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{build_client, check_status, LedgerClient, LedgerPage};
use crate::models::config::{HttpPolicy, ScannerConfig};
use crate::models::errors::AppResult;
use crate::models::types::TransactionRecord;
use crate::providers::retry::RetryPolicy;
use crate::utils::constants::{HISTORY_CHAIN_ID, HISTORY_END_BLOCK, HISTORY_PAGE_SIZE};

const SERVICE: &str = "Etherscan";

/// txlist response envelope
#[derive(Debug, Deserialize)]
pub struct TxListResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: serde_json::Value,
}

impl TxListResponse {
    /// Split into a transaction list or the ledger's complaint
    pub fn into_page(self) -> AppResult<LedgerPage> {
        match self.result {
            serde_json::Value::Array(_) => {
                let records: Vec<TransactionRecord> = serde_json::from_value(self.result)?;
                Ok(LedgerPage::Transactions(records))
            }
            serde_json::Value::String(text) => Ok(LedgerPage::NotAList(text)),
            other => Ok(LedgerPage::NotAList(
                self.message.unwrap_or_else(|| other.to_string()),
            )),
        }
    }
}

/// Etherscan API client
pub struct EtherscanClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    chain_id: u64,
    retry: RetryPolicy,
}

impl EtherscanClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        policy: &HttpPolicy,
    ) -> AppResult<Self> {
        Ok(Self {
            client: build_client(policy)?,
            base_url: base_url.into(),
            api_key: api_key.into(),
            chain_id: HISTORY_CHAIN_ID,
            retry: policy.retry,
        })
    }

    pub fn from_config(config: &ScannerConfig) -> AppResult<Self> {
        Self::new(
            config.etherscan_url.clone(),
            config.etherscan_api_key.clone(),
            &config.http,
        )
    }

    /// Query string for one history page; the key is included, so never log it
    fn query(&self, address: &str) -> Vec<(&'static str, String)> {
        vec![
            ("module", "account".to_string()),
            ("action", "txlist".to_string()),
            ("address", address.to_string()),
            ("startblock", "0".to_string()),
            ("endblock", HISTORY_END_BLOCK.to_string()),
            ("page", "1".to_string()),
            ("offset", HISTORY_PAGE_SIZE.to_string()),
            ("sort", "desc".to_string()),
            ("apikey", self.api_key.clone()),
            ("chainid", self.chain_id.to_string()),
        ]
    }
}

#[async_trait]
impl LedgerClient for EtherscanClient {
    async fn recent_transactions(&self, address: &str) -> AppResult<LedgerPage> {
        let query = self.query(address);

        info!("🔍 Etherscan: fetching history for {}", address);

        let response = self
            .retry
            .run(SERVICE, || fetch_txlist(&self.client, &self.base_url, &query))
            .await?;

        if response.status.as_deref() == Some("0") {
            debug!(
                "Etherscan status 0: {}",
                response.message.as_deref().unwrap_or("no message")
            );
        }

        let page = response.into_page()?;
        match &page {
            LedgerPage::Transactions(txs) => {
                info!("📊 Etherscan: {} transactions for {}", txs.len(), address)
            }
            LedgerPage::NotAList(message) => {
                warn!("⚠️ Etherscan returned no list for {}: {}", address, message)
            }
        }
        Ok(page)
    }
}

async fn fetch_txlist(
    client: &reqwest::Client,
    url: &str,
    query: &[(&'static str, String)],
) -> AppResult<TxListResponse> {
    let response = check_status(SERVICE, client.get(url).query(query).send().await?)?;
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_result_becomes_transactions() {
        let raw = serde_json::json!({
            "status": "1",
            "message": "OK",
            "result": [
                { "hash": "0x1", "to": "0xa", "timeStamp": "1700000000", "isError": "0" },
                { "hash": "0x2", "to": null, "timeStamp": "1690000000", "isError": "1" }
            ]
        });
        let response: TxListResponse = serde_json::from_value(raw).unwrap();
        match response.into_page().unwrap() {
            LedgerPage::Transactions(txs) => {
                assert_eq!(txs.len(), 2);
                assert!(txs[1].is_failed());
                assert!(txs[1].to.is_none());
            }
            other => panic!("unexpected page: {:?}", other),
        }
    }

    #[test]
    fn test_null_field_does_not_fail_page() {
        let raw = serde_json::json!({
            "status": "1",
            "message": "OK",
            "result": [
                { "hash": "0x1", "to": "0xa", "timeStamp": "1700000000", "isError": null },
                { "hash": "0x2", "to": "0xb", "timeStamp": "1690000000", "isError": "1" }
            ]
        });
        let response: TxListResponse = serde_json::from_value(raw).unwrap();
        match response.into_page().unwrap() {
            LedgerPage::Transactions(txs) => {
                assert_eq!(txs.len(), 2);
                assert!(!txs[0].is_failed());
                assert!(txs[1].is_failed());
            }
            other => panic!("unexpected page: {:?}", other),
        }
    }

    #[test]
    fn test_string_result_is_not_a_list() {
        let raw = serde_json::json!({
            "status": "0",
            "message": "NOTOK",
            "result": "Error! Invalid address format"
        });
        let response: TxListResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(
            response.into_page().unwrap(),
            LedgerPage::NotAList("Error! Invalid address format".to_string())
        );
    }

    #[test]
    fn test_missing_result_is_not_a_list() {
        let response: TxListResponse =
            serde_json::from_value(serde_json::json!({ "message": "NOTOK" })).unwrap();
        assert_eq!(
            response.into_page().unwrap(),
            LedgerPage::NotAList("NOTOK".to_string())
        );
    }

    #[test]
    fn test_query_is_descending_page_of_100() {
        let client = EtherscanClient::new("http://localhost", "key", &HttpPolicy::default()).unwrap();
        let query = client.query("0xabc");
        assert!(query.contains(&("sort", "desc".to_string())));
        assert!(query.contains(&("offset", "100".to_string())));
        assert!(query.contains(&("chainid", "1".to_string())));
        assert!(query.contains(&("address", "0xabc".to_string())));
    }
}
