//! Core Module - Business Logic
//!
//! Payment verification, risk scoring and the scan orchestration.
//! Collaborators come in through the provider traits.

pub mod payment;
pub mod risk_score;
pub mod scanner;

pub use payment::*;
pub use risk_score::*;
pub use scanner::*;
