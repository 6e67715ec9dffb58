//! Wallet Scanner - fetch, score, explain
//!
//! One history page from the ledger, the heuristic score, then a prose
//! explanation from the text generator. At most two outbound calls; any
//! collaborator failure propagates to the caller.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::core::risk_score::{score_transactions, RiskScore};
use crate::models::errors::AppResult;
use crate::models::types::{RiskReport, ScanOutcome};
use crate::providers::{LedgerClient, LedgerPage, TextGenerator};

/// Body of the "no data" answer when the ledger does not return a list
pub const NO_DATA_ERROR: &str = "Invalid wallet address or no transactions found";

pub struct WalletScanner {
    ledger: Arc<dyn LedgerClient>,
    explainer: Arc<dyn TextGenerator>,
}

impl WalletScanner {
    pub fn new(ledger: Arc<dyn LedgerClient>, explainer: Arc<dyn TextGenerator>) -> Self {
        Self { ledger, explainer }
    }

    /// Scan against the wall clock
    pub async fn scan(&self, address: &str) -> AppResult<ScanOutcome> {
        self.scan_at(address, chrono::Utc::now().timestamp()).await
    }

    /// Scan with an explicit "now" (unix seconds)
    pub async fn scan_at(&self, address: &str, now_secs: i64) -> AppResult<ScanOutcome> {
        let start = Instant::now();

        let transactions = match self.ledger.recent_transactions(address).await? {
            LedgerPage::Transactions(txs) => txs,
            LedgerPage::NotAList(message) => {
                debug!("No usable history for {}: {}", address, message);
                return Ok(ScanOutcome::NoData {
                    error: NO_DATA_ERROR.to_string(),
                });
            }
        };

        let score = score_transactions(&transactions, now_secs);
        info!(
            "📊 {} scored {} ({}) with {} flag(s)",
            address,
            score.total,
            score.level,
            score.flags.len()
        );

        let prompt = build_prompt(address, &score);
        let ai_explanation = self.explainer.generate(&prompt).await?;

        info!("✅ Scan of {} finished in {:?}", address, start.elapsed());

        Ok(ScanOutcome::Report(RiskReport {
            address: address.to_string(),
            risk_score: score.total,
            risk_level: score.level,
            flags: score.flags,
            total_transactions: score.total_transactions,
            failed_transactions: score.failed_transactions,
            unique_contracts: score.unique_contracts,
            ai_explanation,
            payment: None,
        }))
    }
}

/// Explanation prompt for one scored wallet
pub fn build_prompt(address: &str, score: &RiskScore) -> String {
    let flags = if score.flags.is_empty() {
        "None".to_string()
    } else {
        score.flags.join(", ")
    };

    format!(
        "You are a blockchain security expert. Analyze this wallet and give a 3-4 sentence plain English explanation.\n\
         Wallet: {}\n\
         Risk Score: {}/100\n\
         Risk Level: {}\n\
         Total Transactions: {}\n\
         Failed Transactions: {}\n\
         Unique Contracts: {}\n\
         Flags: {}",
        address,
        score.total,
        score.level,
        score.total_transactions,
        score.failed_transactions,
        score.unique_contracts,
        flags
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::AppError;
    use crate::models::types::{RiskLevel, TransactionRecord};
    use async_trait::async_trait;
    use std::sync::Mutex;

    const ADDRESS: &str = "0x1111111111111111111111111111111111111111";
    const NOW: i64 = 1_760_000_000;

    struct FixedLedger(LedgerPage);

    #[async_trait]
    impl LedgerClient for FixedLedger {
        async fn recent_transactions(&self, _address: &str) -> AppResult<LedgerPage> {
            Ok(self.0.clone())
        }
    }

    struct BrokenLedger;

    #[async_trait]
    impl LedgerClient for BrokenLedger {
        async fn recent_transactions(&self, _address: &str) -> AppResult<LedgerPage> {
            Err(AppError::upstream_status("Etherscan", 502))
        }
    }

    #[derive(Default)]
    struct RecordingExplainer {
        prompts: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl TextGenerator for RecordingExplainer {
        async fn generate(&self, prompt: &str) -> AppResult<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self.fail {
                return Err(AppError::upstream_status("Groq", 503));
            }
            Ok("Looks fine.".to_string())
        }
    }

    fn record(days_ago: i64) -> TransactionRecord {
        TransactionRecord {
            hash: "0xabc".to_string(),
            from: Some(ADDRESS.to_string()),
            to: Some("0x2222222222222222222222222222222222222222".to_string()),
            time_stamp: (NOW - days_ago * 86_400).to_string(),
            is_error: "0".to_string(),
        }
    }

    #[tokio::test]
    async fn test_report_for_young_wallet() {
        let explainer = Arc::new(RecordingExplainer::default());
        let scanner = WalletScanner::new(
            Arc::new(FixedLedger(LedgerPage::Transactions(vec![record(1), record(3)]))),
            explainer.clone(),
        );

        let outcome = scanner.scan_at(ADDRESS, NOW).await.unwrap();
        let ScanOutcome::Report(report) = outcome else {
            panic!("expected a report");
        };
        assert_eq!(report.risk_score, 25);
        assert_eq!(report.risk_level, RiskLevel::Medium);
        assert_eq!(report.flags, vec!["New wallet — only 3 days old".to_string()]);
        assert_eq!(report.total_transactions, 2);
        assert_eq!(report.unique_contracts, 1);
        assert_eq!(report.ai_explanation, "Looks fine.");
        assert!(report.payment.is_none());

        let prompts = explainer.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Risk Score: 25/100"));
        assert!(prompts[0].contains("Risk Level: MEDIUM"));
        assert!(prompts[0].ends_with("Flags: New wallet — only 3 days old"));
    }

    #[tokio::test]
    async fn test_not_a_list_skips_explanation() {
        let explainer = Arc::new(RecordingExplainer::default());
        let scanner = WalletScanner::new(
            Arc::new(FixedLedger(LedgerPage::NotAList("Error! Invalid address format".to_string()))),
            explainer.clone(),
        );

        let outcome = scanner.scan_at(ADDRESS, NOW).await.unwrap();
        assert_eq!(
            outcome,
            ScanOutcome::NoData {
                error: NO_DATA_ERROR.to_string()
            }
        );
        assert!(explainer.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_explainer_failure_propagates() {
        let explainer = Arc::new(RecordingExplainer {
            fail: true,
            ..Default::default()
        });
        let scanner = WalletScanner::new(
            Arc::new(FixedLedger(LedgerPage::Transactions(vec![]))),
            explainer,
        );
        assert!(scanner.scan_at(ADDRESS, NOW).await.is_err());
    }

    #[tokio::test]
    async fn test_ledger_failure_propagates_before_explanation() {
        let explainer = Arc::new(RecordingExplainer::default());
        let scanner = WalletScanner::new(Arc::new(BrokenLedger), explainer.clone());

        let err = scanner.scan_at(ADDRESS, NOW).await.unwrap_err();
        assert_eq!(err.message, "Etherscan returned HTTP 502");
        assert!(explainer.prompts.lock().unwrap().is_empty());
    }

    #[test]
    fn test_prompt_with_no_flags() {
        let score = score_transactions(&[record(400)], NOW);
        let prompt = build_prompt(ADDRESS, &score);
        assert!(prompt.starts_with("You are a blockchain security expert."));
        assert!(prompt.contains(&format!("\nWallet: {}\n", ADDRESS)));
        assert!(prompt.contains("Total Transactions: 1\nFailed Transactions: 0\nUnique Contracts: 1"));
        assert!(prompt.ends_with("Flags: None"));
    }
}
