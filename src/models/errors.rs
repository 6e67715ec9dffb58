//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code so it can be traced in logs.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - API_xxx: request validation errors
//! - PAYMENT_xxx: payment proof errors
//! - UPSTREAM_xxx: collaborator (Blockscout, Etherscan, Groq) errors
//! - DATA_xxx: collaborator returned an unexpected shape
//! - CFG_xxx: configuration errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)?;
        if let Some(source) = &self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Validation Errors
    // ============================================
    /// Required field missing
    ApiMissingField,
    /// Field present but malformed
    ApiBadRequest,

    // ============================================
    // Payment Errors
    // ============================================
    /// No payment reference supplied
    PaymentRequired,
    /// Payment reference did not verify
    PaymentInvalid,

    // ============================================
    // Upstream Errors
    // ============================================
    /// Collaborator could not be reached
    UpstreamConnectionFailed,
    /// Collaborator call timed out
    UpstreamTimeout,
    /// Collaborator rate limited us (HTTP 429)
    UpstreamRateLimited,
    /// Collaborator answered with a non-success status
    UpstreamStatus,
    /// Collaborator failed in some other way
    UpstreamError,

    // ============================================
    // Data Errors
    // ============================================
    /// Collaborator payload could not be decoded
    DataInvalidResponse,
    /// Collaborator payload decoded but had an unexpected shape
    DataUnexpectedShape,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Missing environment variable
    ConfigMissingEnv,
    /// Invalid configuration value
    ConfigInvalidValue,

    // ============================================
    // Generic Errors
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApiMissingField => "API_MISSING_FIELD",
            Self::ApiBadRequest => "API_BAD_REQUEST",

            Self::PaymentRequired => "PAYMENT_REQUIRED",
            Self::PaymentInvalid => "PAYMENT_INVALID",

            Self::UpstreamConnectionFailed => "UPSTREAM_CONNECTION_FAILED",
            Self::UpstreamTimeout => "UPSTREAM_TIMEOUT",
            Self::UpstreamRateLimited => "UPSTREAM_RATE_LIMITED",
            Self::UpstreamStatus => "UPSTREAM_STATUS",
            Self::UpstreamError => "UPSTREAM_ERROR",

            Self::DataInvalidResponse => "DATA_INVALID_RESPONSE",
            Self::DataUnexpectedShape => "DATA_UNEXPECTED_SHAPE",

            Self::ConfigMissingEnv => "CFG_MISSING_ENV",
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ApiMissingField | Self::ApiBadRequest => 400,
            Self::PaymentRequired | Self::PaymentInvalid => 402,
            _ => 500,
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::UpstreamConnectionFailed | Self::UpstreamTimeout | Self::UpstreamRateLimited
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Collaborator answered with a non-success HTTP status
    pub fn upstream_status(service: &str, status: u16) -> Self {
        if status == 429 {
            return Self::new(
                ErrorCode::UpstreamRateLimited,
                format!("{} rate limited (HTTP 429)", service),
            );
        }
        Self::new(
            ErrorCode::UpstreamStatus,
            format!("{} returned HTTP {}", service, status),
        )
    }

    /// Collaborator payload had an unexpected shape
    pub fn unexpected_shape(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::DataUnexpectedShape, msg)
    }

    /// Missing environment variable
    pub fn missing_env(key_name: &str) -> Self {
        Self::new(
            ErrorCode::ConfigMissingEnv,
            format!("Missing environment variable: {}", key_name),
        )
    }

    /// Invalid configuration value
    pub fn invalid_config(key_name: &str, msg: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidValue,
            format!("Invalid value for {}: {}", key_name, msg),
        )
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(ErrorCode::UpstreamTimeout, "Request timeout")
        } else if err.is_connect() {
            Self::new(ErrorCode::UpstreamConnectionFailed, "Connection failed")
        } else if err.is_decode() {
            Self::new(ErrorCode::DataInvalidResponse, err.to_string())
        } else if let Some(status) = err.status() {
            Self::upstream_status("Upstream", status.as_u16())
        } else {
            Self::new(ErrorCode::UpstreamError, err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::DataInvalidResponse, "JSON parse error", err)
    }
}
