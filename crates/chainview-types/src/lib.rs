//! # Chainview Types
//!
//! Core data model and collaborator traits for the Chainview wallet session
//! SDK. The session aggregator owns values of these types as its single
//! source of truth; the collaborator traits ([`ChainApi`], [`PriceApi`],
//! [`Signer`]) are the only seams through which it talks to the outside
//! world, which keeps every state transition testable with in-memory mocks.
//!
//! ## Core Types
//!
//! - [`WalletInfo`] - the connected account on a specific chain
//! - [`TokenBalance`] - one ERC-20 balance snapshot
//! - [`PricePoint`] / [`PriceData`] - symbol-keyed price snapshots
//! - [`NetworkHealth`] - liveness of the active chain's RPC endpoint
//! - [`ChainMetadata`] - static description of an EVM network

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use async_trait::async_trait;
use chainview_error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Static description of an EVM-compatible network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainMetadata {
    /// EIP-155 chain identifier
    pub chain_id: u64,
    /// Human-readable network name (e.g., "Polygon Mainnet")
    pub name: String,
    /// Native currency symbol (e.g., "ETH", "POL")
    pub currency_symbol: String,
    /// Decimal places of the native currency
    pub decimals: u8,
    /// Public RPC endpoints, in preference order
    pub rpc_endpoints: Vec<String>,
    /// Block explorer base URL
    pub explorer: String,
}

impl ChainMetadata {
    /// Returns the preferred RPC endpoint, if any is configured.
    pub fn primary_endpoint(&self) -> Option<&str> {
        self.rpc_endpoints.first().map(|s| s.as_str())
    }
}

/// The connected account on a specific chain.
///
/// Replaced wholesale on connect, disconnect, or network switch; never
/// patched field by field from two sources at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletInfo {
    /// Checksummed account address
    pub address: String,
    /// Native balance as a decimal string in the human unit
    pub balance: String,
    /// Chain the balance was observed on
    pub chain_id: u64,
    /// Metadata of that chain
    pub chain: ChainMetadata,
}

impl fmt::Display for WalletInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {} ({})", self.address, self.chain.name, self.chain_id)
    }
}

/// Descriptor of a fungible token tracked for a chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Contract address
    pub address: String,
    /// Token symbol (e.g., "USDC")
    pub symbol: String,
    /// Token name
    pub name: String,
    /// Decimal places
    pub decimals: u8,
    /// Chain the contract lives on
    pub chain_id: u64,
}

/// One token balance snapshot.
///
/// Recomputed on every refresh cycle; the whole collection is replaced,
/// never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenBalance {
    /// The token this balance belongs to
    pub token: TokenInfo,
    /// Raw balance in the smallest unit, as a decimal string
    pub raw: String,
    /// Balance formatted to the token's decimals
    pub formatted: String,
}

impl TokenBalance {
    /// Parses the formatted balance as `f64` for valuation.
    ///
    /// An unparseable snapshot contributes zero rather than failing the
    /// portfolio computation.
    pub fn formatted_f64(&self) -> f64 {
        self.formatted.parse().unwrap_or(0.0)
    }
}

/// Price snapshot for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Price in USD
    pub price_usd: f64,
    /// 24h change in percent, when the feed supplies it
    pub change_24h: Option<f64>,
}

/// Mapping from token symbol to price snapshot, replaced wholesale on each
/// price refresh. A missing symbol is a valid state, not an error.
pub type PriceData = HashMap<String, PricePoint>;

/// Liveness/readiness of the active chain's RPC endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkHealth {
    /// Chain that was probed
    pub chain_id: u64,
    /// Latest observed block number
    pub block_number: u64,
    /// Whether the endpoint answered within tolerance
    pub healthy: bool,
}

/// A validated transfer of native currency, ready for signing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Recipient address
    pub to: String,
    /// Amount in the native human unit
    pub amount: f64,
    /// Chain to execute on
    pub chain_id: u64,
}

/// Chain collaborator: everything the session reads from or asks of the
/// active network.
///
/// Implementations own their timeout/retry policy; the session only sees
/// the final outcome.
#[async_trait]
pub trait ChainApi: Send + Sync {
    /// Fetches the native balance of `address`, retrying transient failures.
    /// Returns the balance as a decimal string in the human unit.
    async fn balance_with_retry(&self, address: &str) -> Result<String>;

    /// Fetches all `tokens` balances for `address` in one batched call.
    /// All-or-nothing: a partial result is reported as an error.
    async fn multiple_token_balances(
        &self,
        tokens: &[TokenInfo],
        address: &str,
    ) -> Result<Vec<TokenBalance>>;

    /// Probes the active chain's endpoint for liveness.
    async fn check_network_health(&self) -> Result<NetworkHealth>;

    /// Repoints the client at `chain_id`. Returns `true` when the switch
    /// took effect, `false` when the collaborator declined it.
    async fn switch_network(&self, chain_id: u64) -> Result<bool>;

    /// Metadata of the currently active chain.
    fn current_chain(&self) -> Result<ChainMetadata>;
}

/// Price collaborator. Expected to substitute cached data rather than fail
/// outright, hence the infallible signature.
#[async_trait]
pub trait PriceApi: Send + Sync {
    /// Fetches USD prices for the (deduplicated) `symbols` on `chain_id`.
    /// Symbols the feed does not know are simply absent from the result.
    async fn prices_with_fallback(&self, symbols: &[String], chain_id: u64) -> PriceData;
}

/// Signing collaborator. Key custody stays behind this trait; the session
/// only brokers the password for the duration of one operation.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Signs and submits `request` for the stored account `account_id`,
    /// unlocked with `password`. Returns the transaction hash.
    async fn sign_transfer(
        &self,
        account_id: &str,
        password: &str,
        request: &TransferRequest,
    ) -> Result<String>;
}
