//! # Chainview Error
//!
//! Unified error types for the Chainview wallet session SDK. Every crate in
//! the workspace reports failures through [`ChainviewError`], so callers get
//! one taxonomy to match on:
//!
//! - transient network/RPC failures, which the session degrades around
//! - validation failures, surfaced before any collaborator call is made
//! - credential failures, surfaced only inside a signing flow
//!
//! ## Example
//!
//! ```
//! use chainview_error::{ChainviewError, Result};
//!
//! fn require_positive(amount: f64) -> Result<()> {
//!     if amount <= 0.0 {
//!         return Err(ChainviewError::NonPositiveAmount(amount));
//!     }
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use thiserror::Error;

/// The main error type for Chainview operations.
#[derive(Error, Debug)]
pub enum ChainviewError {
    // ============ Validation Errors ============
    /// Invalid address format or checksum
    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress {
        /// The invalid address
        address: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Amount must be strictly positive
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(f64),

    /// Insufficient balance for operation
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance {
        /// Available balance in the native unit
        have: f64,
        /// Required balance in the native unit
        need: f64,
    },

    // ============ Credential Errors ============
    /// Password did not unlock the stored account
    #[error("Wrong password for account {0}")]
    WrongPassword(String),

    /// No stored account under the given identifier
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    // ============ Network Errors ============
    /// RPC connection failed
    #[error("RPC connection failed: {url} - {reason}")]
    RpcConnection {
        /// RPC URL
        url: String,
        /// Error reason
        reason: String,
    },

    /// RPC request failed
    #[error("RPC request failed: {method} - {reason}")]
    RpcRequest {
        /// RPC method name
        method: String,
        /// Error reason
        reason: String,
    },

    /// Network timeout
    #[error("Network timeout after {seconds}s")]
    NetworkTimeout {
        /// Timeout duration
        seconds: u64,
    },

    /// All retry attempts exhausted
    #[error("All {attempts} attempts failed: {last_error}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Message of the last failure
        last_error: String,
    },

    /// Price feed request failed
    #[error("Price feed error: {0}")]
    PriceFeed(String),

    // ============ Chain/Session Errors ============
    /// Chain identifier not present in the registry
    #[error("Unknown chain id: {0}")]
    UnknownChain(u64),

    /// Network switch was rejected by the collaborator
    #[error("Network switch to chain {0} failed")]
    SwitchFailed(u64),

    /// No wallet is connected
    #[error("No wallet connected")]
    NotConnected,

    // ============ Parsing/IO ============
    /// JSON parse error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    // ============ Generic ============
    /// Unknown/other error
    #[error("{0}")]
    Other(String),
}

/// Convenient Result type using ChainviewError
pub type Result<T> = std::result::Result<T, ChainviewError>;

impl ChainviewError {
    /// Returns true if this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ChainviewError::RpcConnection { .. }
                | ChainviewError::RpcRequest { .. }
                | ChainviewError::NetworkTimeout { .. }
                | ChainviewError::PriceFeed(_)
        )
    }

    /// Returns true if this error should be surfaced to the user
    /// synchronously instead of being degraded around.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ChainviewError::InvalidAddress { .. }
                | ChainviewError::NonPositiveAmount(_)
                | ChainviewError::InsufficientBalance { .. }
        )
    }
}
