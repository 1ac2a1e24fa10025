//! # Chainview Session
//!
//! The session and state aggregator of the Chainview SDK: the single source
//! of truth for "what wallet is connected, on what chain, with what
//! balances and prices", and the only component that calls the chain and
//! price collaborators to mutate that truth.
//!
//! ## Model
//!
//! A [`WalletSession`] holds at most one [`WalletInfo`]. Token balances and
//! prices are derived collections, always consistent with the current
//! wallet's chain: connect, disconnect, and network switches clear them and
//! trigger a refetch rather than ever reusing cross-chain data.
//!
//! ## Failure isolation
//!
//! Every refresh degrades independently to a safe default: the balance
//! keeps its last known value, the token list goes obviously-empty, and a
//! missing price is a silent zero contribution to portfolio value. No
//! collaborator failure is fatal; scheduled refreshes heal the state.
//!
//! ## Staleness
//!
//! Each mutation of the wallet identity bumps an epoch counter. Refreshes
//! capture the epoch when they start and commit only if it still matches,
//! so an in-flight completion for a previous wallet or chain is discarded
//! instead of overwriting newer state.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod credentials;
pub mod poll;
pub mod prefs;
pub mod validate;

use chainview_error::{ChainviewError, Result};
use chainview_types::{
    ChainApi, NetworkHealth, PriceApi, PriceData, Signer, TokenBalance, WalletInfo,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub use credentials::UserSession;
pub use poll::{PollHandle, HEALTH_POLL_INTERVAL, PRICE_POLL_INTERVAL};
pub use prefs::Preferences;
pub use validate::validate_transfer;

/// Result of a [`WalletSession::connect`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// The wallet was committed, on its own or the preferred network.
    Connected,
    /// The preferred-network switch was declined or errored; the wallet was
    /// committed on its original network.
    SwitchFailed {
        /// The network that was requested
        requested: u64,
    },
    /// The switch reported success but the chain metadata lookup failed;
    /// the wallet was committed on its original network.
    SwitchIncomplete {
        /// The network that was requested
        requested: u64,
    },
}

#[derive(Debug)]
struct SessionState {
    wallet: Option<WalletInfo>,
    token_balances: Vec<TokenBalance>,
    prices: PriceData,
    health: Option<NetworkHealth>,
    /// Bumped on every wallet identity or chain change; see module docs.
    epoch: u64,
}

/// The wallet session. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct WalletSession {
    chain: Arc<dyn ChainApi>,
    price_api: Arc<dyn PriceApi>,
    state: Arc<RwLock<SessionState>>,
}

impl WalletSession {
    /// Creates a disconnected session over the given collaborators.
    pub fn new(chain: Arc<dyn ChainApi>, price_api: Arc<dyn PriceApi>) -> Self {
        Self {
            chain,
            price_api,
            state: Arc::new(RwLock::new(SessionState {
                wallet: None,
                token_balances: Vec::new(),
                prices: HashMap::new(),
                health: None,
                epoch: 0,
            })),
        }
    }

    /// Connects `wallet`, replacing any active one.
    ///
    /// When `preferred_network` is set and differs from the wallet's chain,
    /// a switch is attempted first; on any switch failure the original
    /// wallet is committed unchanged. The preference is a one-shot input:
    /// callers obtain it via [`Preferences::take_preferred_network`], which
    /// clears it at read time.
    ///
    /// Token balances and prices are refetched for the committed identity
    /// before this returns.
    pub async fn connect(
        &self,
        wallet: WalletInfo,
        preferred_network: Option<u64>,
    ) -> ConnectOutcome {
        let (wallet, outcome) = match preferred_network {
            Some(target) if target != wallet.chain_id => {
                self.apply_preferred(wallet, target).await
            }
            _ => (wallet, ConnectOutcome::Connected),
        };

        {
            let mut state = self.state.write().await;
            state.epoch += 1;
            tracing::info!(
                address = %wallet.address,
                chain_id = wallet.chain_id,
                "wallet connected"
            );
            state.wallet = Some(wallet);
            state.token_balances.clear();
            state.prices.clear();
        }

        // Each refresh is failure-isolated; a price outage must not block
        // the balance and vice versa.
        self.refresh_balance().await;
        self.refresh_token_balances().await;
        self.refresh_prices().await;

        outcome
    }

    async fn apply_preferred(
        &self,
        wallet: WalletInfo,
        target: u64,
    ) -> (WalletInfo, ConnectOutcome) {
        match self.chain.switch_network(target).await {
            Ok(true) => match self.chain.current_chain() {
                Ok(meta) => {
                    let mut switched = wallet;
                    switched.chain_id = meta.chain_id;
                    switched.chain = meta;
                    (switched, ConnectOutcome::Connected)
                }
                Err(err) => {
                    tracing::warn!(
                        requested = target,
                        %err,
                        "switch reported success but chain lookup failed, keeping original network"
                    );
                    (wallet, ConnectOutcome::SwitchIncomplete { requested: target })
                }
            },
            Ok(false) => {
                tracing::warn!(requested = target, "preferred-network switch declined");
                (wallet, ConnectOutcome::SwitchFailed { requested: target })
            }
            Err(err) => {
                tracing::warn!(requested = target, %err, "preferred-network switch failed");
                (wallet, ConnectOutcome::SwitchFailed { requested: target })
            }
        }
    }

    /// Disconnects the active wallet and resets every derived collection.
    pub async fn disconnect(&self) {
        let mut state = self.state.write().await;
        state.epoch += 1;
        state.wallet = None;
        state.token_balances.clear();
        state.prices.clear();
        tracing::info!("wallet disconnected");
    }

    /// Refetches the native balance. No-op while disconnected; on failure
    /// the last known balance is kept rather than cleared.
    pub async fn refresh_balance(&self) {
        let Some((address, epoch)) = self.identity(|w| w.address.clone()).await else {
            return;
        };
        match self.chain.balance_with_retry(&address).await {
            Ok(balance) => {
                self.commit_if_current(epoch, |state| {
                    if let Some(wallet) = state.wallet.as_mut() {
                        wallet.balance = balance;
                    }
                })
                .await;
            }
            Err(err) => {
                tracing::warn!(%err, "balance refresh failed, keeping last known balance");
            }
        }
    }

    /// Refetches all tracked token balances for the current chain in one
    /// batched call. Any failure empties the collection: an obviously-empty
    /// state is preferred over partially-stale data.
    pub async fn refresh_token_balances(&self) {
        let Some(((address, chain_id), epoch)) =
            self.identity(|w| (w.address.clone(), w.chain_id)).await
        else {
            return;
        };
        let tokens = chainview_registry::common_tokens_for_network(chain_id);
        let next = match self.chain.multiple_token_balances(&tokens, &address).await {
            Ok(balances) => balances,
            Err(err) => {
                tracing::warn!(chain_id, %err, "token refresh failed, clearing token balances");
                Vec::new()
            }
        };
        self.commit_if_current(epoch, |state| state.token_balances = next).await;
    }

    /// Refetches prices for the current chain's symbol set. The price
    /// collaborator never fails outright, so this only no-ops while
    /// disconnected.
    pub async fn refresh_prices(&self) {
        let Some((chain_id, epoch)) = self.identity(|w| w.chain_id).await else {
            return;
        };
        let symbols = chainview_registry::price_symbols_for_network(chain_id);
        let prices = self.price_api.prices_with_fallback(&symbols, chain_id).await;
        self.commit_if_current(epoch, |state| state.prices = prices).await;
    }

    /// Probes the active chain's endpoint. Runs whether or not a wallet is
    /// connected; an unhealthy result is recorded, not raised.
    pub async fn refresh_network_health(&self) {
        match self.chain.check_network_health().await {
            Ok(health) => {
                if !health.healthy {
                    tracing::warn!(chain_id = health.chain_id, "network endpoint unhealthy");
                }
                self.state.write().await.health = Some(health);
            }
            Err(err) => {
                tracing::warn!(%err, "health probe could not run");
            }
        }
    }

    /// Validates and signs a native transfer for the active wallet.
    ///
    /// `user` is consumed: the password is zeroized when this returns,
    /// success or failure, and credential errors never leave partial
    /// session state behind.
    pub async fn sign_and_send(
        &self,
        signer: &dyn Signer,
        user: UserSession,
        to: &str,
        amount: f64,
    ) -> Result<String> {
        let Some(wallet) = self.wallet().await else {
            return Err(ChainviewError::NotConnected);
        };
        let request = validate_transfer(to, amount, &wallet.balance, wallet.chain_id)?;
        let result = signer
            .sign_transfer(user.account_id(), user.password(), &request)
            .await;
        drop(user);
        result
    }

    /// The active wallet, if any.
    pub async fn wallet(&self) -> Option<WalletInfo> {
        self.state.read().await.wallet.clone()
    }

    /// True while a wallet is connected.
    pub async fn is_connected(&self) -> bool {
        self.state.read().await.wallet.is_some()
    }

    /// Current token balance snapshot.
    pub async fn token_balances(&self) -> Vec<TokenBalance> {
        self.state.read().await.token_balances.clone()
    }

    /// Current price snapshot.
    pub async fn prices(&self) -> PriceData {
        self.state.read().await.prices.clone()
    }

    /// Last observed network health, if a probe has completed.
    pub async fn network_health(&self) -> Option<NetworkHealth> {
        self.state.read().await.health.clone()
    }

    /// Total USD value of the session's holdings; see [`portfolio_value_of`].
    pub async fn portfolio_value(&self) -> f64 {
        let state = self.state.read().await;
        portfolio_value_of(state.wallet.as_ref(), &state.token_balances, &state.prices)
    }

    async fn identity<T>(&self, f: impl FnOnce(&WalletInfo) -> T) -> Option<(T, u64)> {
        let state = self.state.read().await;
        state.wallet.as_ref().map(|w| (f(w), state.epoch))
    }

    async fn commit_if_current(
        &self,
        epoch: u64,
        apply: impl FnOnce(&mut SessionState),
    ) -> bool {
        let mut state = self.state.write().await;
        if state.epoch != epoch {
            tracing::debug!(
                at_request = epoch,
                now = state.epoch,
                "discarding stale refresh result"
            );
            return false;
        }
        apply(&mut state);
        true
    }
}

/// Pure portfolio valuation: native balance times the native price, plus
/// each token balance times its price. Tokens with no matching price entry
/// contribute zero, silently. Deterministic and order-independent in the
/// token list.
pub fn portfolio_value_of(
    wallet: Option<&WalletInfo>,
    token_balances: &[TokenBalance],
    prices: &PriceData,
) -> f64 {
    let Some(wallet) = wallet else { return 0.0 };

    let native = wallet.balance.parse::<f64>().unwrap_or(0.0);
    let mut total = prices
        .get(&wallet.chain.currency_symbol)
        .map_or(0.0, |p| native * p.price_usd);

    for balance in token_balances {
        if let Some(point) = prices.get(&balance.token.symbol) {
            total += balance.formatted_f64() * point.price_usd;
        }
    }
    total
}
