//! Utils Module - Shared Constants
//!
//! Single source of truth for values shared across the application.

pub mod constants;

pub use constants::*;
