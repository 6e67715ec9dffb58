//! API Request Handlers

use alloy_primitives::Address;
use axum::{
    body::Bytes,
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use super::middleware::{RateLimitConfig, RateLimiter};
use super::types::*;
use crate::core::payment::PaymentVerifier;
use crate::core::scanner::WalletScanner;
use crate::models::config::{PaymentProofSource, ScannerConfig};
use crate::models::errors::{AppResult, ErrorCode};
use crate::models::types::{PaymentReceipt, ScanOutcome};
use crate::providers::{
    BlockscoutClient, EtherscanClient, GroqClient, LedgerClient, TextGenerator, TransferIndexer,
};

type Rejection = (StatusCode, Json<ErrorResponse>);

/// Shared application state
pub struct AppState {
    pub config: ScannerConfig,
    pub verifier: PaymentVerifier,
    pub scanner: WalletScanner,
    pub rate_limiter: RateLimiter,
    pub start_time: Instant,
}

impl AppState {
    /// State over arbitrary collaborators
    pub fn new(
        config: ScannerConfig,
        indexer: Arc<dyn TransferIndexer>,
        ledger: Arc<dyn LedgerClient>,
        explainer: Arc<dyn TextGenerator>,
    ) -> Self {
        let verifier = PaymentVerifier::new(indexer, &config);
        let rate_limiter = RateLimiter::new(RateLimitConfig::per_minute(config.rate_limit_per_minute));

        Self {
            verifier,
            scanner: WalletScanner::new(ledger, explainer),
            rate_limiter,
            start_time: Instant::now(),
            config,
        }
    }

    /// State over the real HTTP collaborators
    pub fn from_config(config: ScannerConfig) -> AppResult<Self> {
        let indexer = Arc::new(BlockscoutClient::from_config(&config)?);
        let ledger = Arc::new(EtherscanClient::from_config(&config)?);
        let explainer = Arc::new(GroqClient::from_config(&config)?);
        Ok(Self::new(config, indexer, ledger, explainer))
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Payment reference from wherever the configured source carries it
    fn payment_reference(&self, headers: &HeaderMap, request: &ScanRequest) -> Option<String> {
        match &self.config.payment_source {
            PaymentProofSource::Body => request.tx_hash().map(str::to_string),
            PaymentProofSource::Header(name) => headers
                .get(name.as_str())
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
            PaymentProofSource::Disabled => None,
        }
    }
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthData> {
    Json(HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        payment_mode: state.config.payment_source.as_str().to_string(),
    })
}

// ============================================
// Wallet Scan
// ============================================

pub async fn scan(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, Rejection> {
    let request = ScanRequest::from_slice(&body);

    let address = request.address().ok_or_else(|| {
        reject(ErrorCode::ApiMissingField, ErrorResponse::new("Wallet address required"))
    })?;
    if Address::from_str(address).is_err() {
        return Err(reject(
            ErrorCode::ApiBadRequest,
            ErrorResponse::new("Invalid wallet address format"),
        ));
    }

    let receipt = if state.config.payment_source.is_gated() {
        Some(require_payment(&state, &headers, &request).await?)
    } else {
        None
    };

    info!("🔍 Scanning wallet {}", address);

    match state.scanner.scan(address).await {
        Ok(ScanOutcome::Report(report)) => Ok(Json(report.with_payment(receipt)).into_response()),
        Ok(ScanOutcome::NoData { error }) => Ok(Json(NoDataResponse {
            error,
            payment: receipt,
        })
        .into_response()),
        Err(e) => {
            error!(code = e.code_str(), "❌ Scan of {} failed: {}", address, e);
            // every scan failure is a 500, whatever the collaborator said
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::scan_failed(e.message)),
            ))
        }
    }
}

/// Resolve and verify the payment reference; 402 unless it checks out
async fn require_payment(
    state: &AppState,
    headers: &HeaderMap,
    request: &ScanRequest,
) -> Result<PaymentReceipt, Rejection> {
    let pay_to = state.config.receiver_address.as_str();

    let Some(tx_ref) = state.payment_reference(headers, request) else {
        info!("💳 No payment reference, answering 402");
        return Err(reject(
            ErrorCode::PaymentRequired,
            ErrorResponse::payment_required(pay_to, None),
        ));
    };

    let verification = state.verifier.verify(&tx_ref).await;
    if let Some(receipt) = verification.receipt() {
        return Ok(receipt);
    }

    let reason = verification.reason().unwrap_or_default().to_string();
    warn!("🚫 Payment verification failed: {}", reason);
    Err(reject(
        ErrorCode::PaymentInvalid,
        ErrorResponse::payment_required(pay_to, Some(reason)),
    ))
}

fn reject(code: ErrorCode, body: ErrorResponse) -> Rejection {
    let status = StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::BAD_REQUEST);
    (status, Json(body))
}
