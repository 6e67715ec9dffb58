//! Risk Scoring Module
//!
//! Heuristic wallet score over one page of recent transactions (newest
//! first). Each check adds a fixed weight and a flag; checks run in a fixed
//! order with no early exit, and the total is not clamped.
//!
//! - no history           +20
//! - more than 5 failed   +30
//! - younger than 30 days +25
//! - more than 50 distinct recipients +15
//!
//! Level: >= 50 HIGH, >= 25 MEDIUM, otherwise LOW.

use std::collections::HashSet;

use crate::models::types::{RiskLevel, TransactionRecord};
use crate::utils::constants::{
    FAILED_TX_THRESHOLD, NEW_WALLET_DAYS, SECONDS_PER_DAY, UNIQUE_CONTRACTS_THRESHOLD,
    WEIGHT_FAILED_TX, WEIGHT_MANY_CONTRACTS, WEIGHT_NEW_WALLET, WEIGHT_NO_HISTORY,
};

/// Score, level, flags and the counts they were derived from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskScore {
    pub total: u32,
    pub level: RiskLevel,
    pub flags: Vec<String>,
    pub total_transactions: usize,
    pub failed_transactions: usize,
    pub unique_contracts: usize,
}

/// Builder applying the checks one at a time
pub struct RiskScoreBuilder<'a> {
    transactions: &'a [TransactionRecord],
    now_secs: i64,
    total: u32,
    flags: Vec<String>,
    failed: usize,
    unique: usize,
}

impl<'a> RiskScoreBuilder<'a> {
    pub fn new(transactions: &'a [TransactionRecord], now_secs: i64) -> Self {
        let failed = transactions.iter().filter(|tx| tx.is_failed()).count();
        // null and empty recipients are ordinary values here
        let unique = transactions
            .iter()
            .map(|tx| tx.to.as_deref())
            .collect::<HashSet<_>>()
            .len();

        Self {
            transactions,
            now_secs,
            total: 0,
            flags: Vec::new(),
            failed,
            unique,
        }
    }

    fn add(&mut self, weight: u32, flag: String) {
        self.total += weight;
        self.flags.push(flag);
    }

    /// Empty history
    pub fn with_history_check(mut self) -> Self {
        if self.transactions.is_empty() {
            self.add(WEIGHT_NO_HISTORY, "No transaction history".to_string());
        }
        self
    }

    /// Failed transaction count
    pub fn with_failed_check(mut self) -> Self {
        if self.failed > FAILED_TX_THRESHOLD {
            let flag = format!("High failed transaction count: {}", self.failed);
            self.add(WEIGHT_FAILED_TX, flag);
        }
        self
    }

    /// Wallet age, measured from the oldest record of the page (the last
    /// one, since the page is newest first)
    pub fn with_age_check(mut self) -> Self {
        let Some(oldest) = self.transactions.last() else {
            return self;
        };
        let Some(first_seen) = oldest.timestamp_secs() else {
            return self;
        };

        let age_days = (self.now_secs - first_seen) as f64 / SECONDS_PER_DAY;
        if age_days < NEW_WALLET_DAYS {
            let days = age_days.floor().max(0.0) as u64;
            self.add(
                WEIGHT_NEW_WALLET,
                format!("New wallet — only {} days old", days),
            );
        }
        self
    }

    /// Distinct recipients
    pub fn with_counterparty_check(mut self) -> Self {
        if self.unique > UNIQUE_CONTRACTS_THRESHOLD {
            let flag = format!("Interacts with many contracts: {}", self.unique);
            self.add(WEIGHT_MANY_CONTRACTS, flag);
        }
        self
    }

    pub fn build(self) -> RiskScore {
        RiskScore {
            total: self.total,
            level: RiskLevel::from_score(self.total),
            flags: self.flags,
            total_transactions: self.transactions.len(),
            failed_transactions: self.failed,
            unique_contracts: self.unique,
        }
    }
}

/// All checks, in order
pub fn score_transactions(transactions: &[TransactionRecord], now_secs: i64) -> RiskScore {
    RiskScoreBuilder::new(transactions, now_secs)
        .with_history_check()
        .with_failed_check()
        .with_age_check()
        .with_counterparty_check()
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_760_000_000;
    const DAY: i64 = 86_400;

    fn tx(to: Option<&str>, days_ago: i64, failed: bool) -> TransactionRecord {
        TransactionRecord {
            hash: format!("0x{:x}", days_ago),
            from: Some("0x1111111111111111111111111111111111111111".to_string()),
            to: to.map(str::to_string),
            time_stamp: (NOW - days_ago * DAY).to_string(),
            is_error: if failed { "1" } else { "0" }.to_string(),
        }
    }

    /// `n` records to one recipient, newest first, one day apart, the
    /// oldest `oldest_days_ago` days back
    fn history(n: usize, oldest_days_ago: i64) -> Vec<TransactionRecord> {
        let n = n as i64;
        (0..n)
            .map(|i| tx(Some("0xaaaa"), oldest_days_ago - (n - 1 - i), false))
            .collect()
    }

    #[test]
    fn test_empty_history() {
        let score = score_transactions(&[], NOW);
        assert_eq!(score.total, 20);
        assert_eq!(score.level, RiskLevel::Low);
        assert_eq!(score.flags, vec!["No transaction history".to_string()]);
        assert_eq!(score.total_transactions, 0);
        assert_eq!(score.unique_contracts, 0);
    }

    #[test]
    fn test_old_quiet_wallet_is_low() {
        let score = score_transactions(&history(10, 400), NOW);
        assert_eq!(score.total, 0);
        assert_eq!(score.level, RiskLevel::Low);
        assert!(score.flags.is_empty());
    }

    #[test]
    fn test_failed_threshold_is_strict() {
        let mut txs = history(10, 400);
        for t in txs.iter_mut().take(5) {
            t.is_error = "1".to_string();
        }
        assert_eq!(score_transactions(&txs, NOW).total, 0);

        txs[5].is_error = "1".to_string();
        let score = score_transactions(&txs, NOW);
        assert_eq!(score.total, 30);
        assert_eq!(score.failed_transactions, 6);
        assert_eq!(score.level, RiskLevel::Medium);
        assert_eq!(score.flags, vec!["High failed transaction count: 6".to_string()]);
    }

    #[test]
    fn test_new_wallet_uses_oldest_record() {
        let txs = vec![tx(Some("0xa"), 1, false), tx(Some("0xb"), 2, false), tx(Some("0xc"), 10, false)];
        let score = score_transactions(&txs, NOW);
        assert_eq!(score.total, 25);
        assert_eq!(score.level, RiskLevel::Medium);
        assert_eq!(score.flags, vec!["New wallet — only 10 days old".to_string()]);

        // only the last element matters, even if an earlier one is older
        let txs = vec![tx(Some("0xa"), 400, false), tx(Some("0xb"), 3, false)];
        let score = score_transactions(&txs, NOW);
        assert_eq!(score.flags, vec!["New wallet — only 3 days old".to_string()]);
    }

    #[test]
    fn test_age_boundary_and_floor() {
        let mut txs = vec![tx(Some("0xa"), 30, false)];
        assert_eq!(score_transactions(&txs, NOW).total, 0);

        txs[0].time_stamp = (NOW - 30 * DAY + 1).to_string();
        let score = score_transactions(&txs, NOW);
        assert_eq!(score.total, 25);
        assert_eq!(score.flags, vec!["New wallet — only 29 days old".to_string()]);
    }

    #[test]
    fn test_future_timestamp_reports_zero_days() {
        let mut txs = vec![tx(Some("0xa"), 0, false)];
        txs[0].time_stamp = (NOW + 3600).to_string();
        let score = score_transactions(&txs, NOW);
        assert_eq!(score.flags, vec!["New wallet — only 0 days old".to_string()]);
    }

    #[test]
    fn test_unparsable_timestamp_skips_age() {
        let mut txs = vec![tx(Some("0xa"), 1, false)];
        txs[0].time_stamp = "soon".to_string();
        assert_eq!(score_transactions(&txs, NOW).total, 0);
    }

    #[test]
    fn test_many_counterparties() {
        let mut txs: Vec<_> = (0..50)
            .map(|i| tx(Some(&format!("0x{:040x}", i)), 400, false))
            .collect();
        assert_eq!(score_transactions(&txs, NOW).unique_contracts, 50);
        assert_eq!(score_transactions(&txs, NOW).total, 0);

        // a contract creation (no recipient) is one more distinct value
        txs.push(tx(None, 400, false));
        let score = score_transactions(&txs, NOW);
        assert_eq!(score.unique_contracts, 51);
        assert_eq!(score.total, 15);
        assert_eq!(score.flags, vec!["Interacts with many contracts: 51".to_string()]);
    }

    #[test]
    fn test_null_and_empty_recipients_are_distinct() {
        let txs = vec![tx(None, 400, false), tx(Some(""), 400, false), tx(None, 400, false)];
        assert_eq!(score_transactions(&txs, NOW).unique_contracts, 2);
    }

    #[test]
    fn test_checks_are_additive_and_ordered() {
        let txs: Vec<_> = (0..60)
            .map(|i| tx(Some(&format!("0x{:040x}", i)), 5, i < 8))
            .collect();
        let score = score_transactions(&txs, NOW);
        assert_eq!(score.total, 30 + 25 + 15);
        assert_eq!(score.level, RiskLevel::High);
        assert_eq!(
            score.flags,
            vec![
                "High failed transaction count: 8".to_string(),
                "New wallet — only 5 days old".to_string(),
                "Interacts with many contracts: 60".to_string(),
            ]
        );
    }
}
