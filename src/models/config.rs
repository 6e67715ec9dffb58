//! Configuration module for the wallet scanner
//!
//! Loaded once at startup from the environment, immutable afterwards and
//! injected into the handler state. Defaults come from utils/constants.rs.

use alloy_primitives::Address;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use crate::models::errors::{AppError, AppResult};
use crate::providers::retry::RetryPolicy;
use crate::utils::constants::{
    BLOCKSCOUT_BASE_URL, DEFAULT_HOST, DEFAULT_HTTP_MAX_ATTEMPTS, DEFAULT_HTTP_TIMEOUT_SECS,
    DEFAULT_PAYMENT_HEADER, DEFAULT_PORT, DEFAULT_RATE_LIMIT_PER_MINUTE, ETHERSCAN_BASE_URL,
    GROQ_BASE_URL, GROQ_DEFAULT_MODEL, MINIMUM_PAYMENT_UNITS, USDC_CONTRACT_BASE, USDC_DECIMALS,
};

/// Where the payment reference travels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentProofSource {
    /// `txHash` field of the JSON body; the caller resubmits after paying
    Body,
    /// Named request header, checked before any scoring work
    Header(String),
    /// No gating, reports carry no payment fields
    Disabled,
}

impl PaymentProofSource {
    /// Parse `PAYMENT_MODE`; `header_name` is used for the header mode
    pub fn parse(mode: &str, header_name: &str) -> AppResult<Self> {
        match mode.trim().to_ascii_lowercase().as_str() {
            "" | "body" => Ok(Self::Body),
            "header" => Ok(Self::Header(header_name.to_string())),
            "disabled" | "off" | "none" => Ok(Self::Disabled),
            other => Err(AppError::invalid_config(
                "PAYMENT_MODE",
                format!("'{}' (expected body, header or disabled)", other),
            )),
        }
    }

    pub fn is_gated(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Header(_) => "header",
            Self::Disabled => "disabled",
        }
    }
}

/// Token the scanner accepts as payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentToken {
    pub contract: String,
    pub decimals: u8,
    /// Smallest-unit minimum
    pub minimum_units: u64,
}

impl Default for PaymentToken {
    fn default() -> Self {
        Self {
            contract: USDC_CONTRACT_BASE.to_string(),
            decimals: USDC_DECIMALS,
            minimum_units: MINIMUM_PAYMENT_UNITS,
        }
    }
}

/// Timeout and retry policy shared by every collaborator client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpPolicy {
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for HttpPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            retry: RetryPolicy::with_attempts(DEFAULT_HTTP_MAX_ATTEMPTS),
        }
    }
}

/// Process-wide scanner configuration
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Payment receiver, exactly as configured (shown to clients as `payTo`)
    pub receiver_address: String,
    pub payment_source: PaymentProofSource,
    pub payment_token: PaymentToken,
    pub etherscan_api_key: String,
    pub groq_api_key: String,
    pub groq_model: String,
    pub blockscout_url: String,
    pub etherscan_url: String,
    pub groq_url: String,
    pub http: HttpPolicy,
    pub host: String,
    pub port: u16,
    pub rate_limit_per_minute: u32,
}

impl ScannerConfig {
    /// Config with defaults for everything but the receiver
    pub fn new(receiver_address: impl Into<String>) -> Self {
        Self {
            receiver_address: receiver_address.into(),
            payment_source: PaymentProofSource::Body,
            payment_token: PaymentToken::default(),
            etherscan_api_key: String::new(),
            groq_api_key: String::new(),
            groq_model: GROQ_DEFAULT_MODEL.to_string(),
            blockscout_url: BLOCKSCOUT_BASE_URL.to_string(),
            etherscan_url: ETHERSCAN_BASE_URL.to_string(),
            groq_url: GROQ_BASE_URL.to_string(),
            http: HttpPolicy::default(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
        }
    }

    pub fn with_payment_source(mut self, source: PaymentProofSource) -> Self {
        self.payment_source = source;
        self
    }

    /// Load from the process environment
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let header_name = get("PAYMENT_HEADER").unwrap_or_else(|| DEFAULT_PAYMENT_HEADER.to_string());
        let payment_source =
            PaymentProofSource::parse(&get("PAYMENT_MODE").unwrap_or_default(), &header_name)?;

        let receiver_address = get("WALLET_ADDRESS").unwrap_or_default();
        if payment_source.is_gated() {
            if receiver_address.is_empty() {
                return Err(AppError::missing_env("WALLET_ADDRESS"));
            }
            Address::from_str(&receiver_address)
                .map_err(|e| AppError::invalid_config("WALLET_ADDRESS", e))?;
        }

        let mut config = Self::new(receiver_address).with_payment_source(payment_source);

        match get("ETHERSCAN_API_KEY") {
            Some(key) => {
                info!("🔑 ETHERSCAN_API_KEY configured (key hidden)");
                config.etherscan_api_key = key;
            }
            None => warn!("⚠️ ETHERSCAN_API_KEY not set, history lookups will be rejected upstream"),
        }
        match get("GROQ_API_KEY") {
            Some(key) => {
                info!("🔑 GROQ_API_KEY configured (key hidden)");
                config.groq_api_key = key;
            }
            None => warn!("⚠️ GROQ_API_KEY not set, explanations will fail"),
        }

        if let Some(model) = get("GROQ_MODEL") {
            config.groq_model = model;
        }
        if let Some(url) = get("BLOCKSCOUT_URL") {
            config.blockscout_url = url;
        }
        if let Some(url) = get("ETHERSCAN_URL") {
            config.etherscan_url = url;
        }
        if let Some(url) = get("GROQ_URL") {
            config.groq_url = url;
        }
        if let Some(host) = get("HOST") {
            config.host = host;
        }
        if let Some(port) = get("PORT") {
            config.port = parse_number("PORT", &port)?;
        }
        if let Some(secs) = get("HTTP_TIMEOUT_SECS") {
            let secs: u64 = parse_number("HTTP_TIMEOUT_SECS", &secs)?;
            config.http.timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(attempts) = get("HTTP_MAX_ATTEMPTS") {
            config.http.retry = RetryPolicy::with_attempts(parse_number("HTTP_MAX_ATTEMPTS", &attempts)?);
        }
        if let Some(limit) = get("RATE_LIMIT_PER_MINUTE") {
            config.rate_limit_per_minute = parse_number("RATE_LIMIT_PER_MINUTE", &limit)?;
        }

        Ok(config)
    }

    /// Receiver lowercased for comparisons
    pub fn receiver_normalized(&self) -> String {
        self.receiver_address.to_lowercase()
    }
}

fn parse_number<T>(key: &str, raw: &str) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| AppError::invalid_config(key, e))
}
