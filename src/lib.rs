//! Wallet Scanner Library
//!
//! Pay-per-scan wallet risk analysis:
//! - USDC-on-Base payment verification through a block indexer
//! - Heuristic risk scoring over recent ledger history
//! - Plain-English explanations from a hosted language model

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::{PaymentVerifier, RiskScore, RiskScoreBuilder, WalletScanner};
pub use models::{
    AppError, AppResult, ErrorCode, PaymentProofSource, PaymentVerification, RiskLevel,
    RiskReport, ScanOutcome, ScannerConfig,
};
pub use providers::{LedgerClient, LedgerPage, TextGenerator, TransferIndexer};
