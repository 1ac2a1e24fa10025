//! # Chainview Prices
//!
//! The price collaborator of the Chainview session SDK. [`PriceFeed`]
//! implements [`PriceApi`] against a CoinGecko-compatible HTTP endpoint and
//! never fails outright: when the feed is unreachable it serves the last
//! good snapshot, and for well-known stablecoins a static default. Symbols
//! with no price from any source are simply absent from the result, which
//! the session treats as a zero contribution to portfolio value.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use async_trait::async_trait;
use chainview_error::{ChainviewError, Result};
use chainview_types::{PriceApi, PriceData, PricePoint};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

/// Default public price API.
pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Maps a wallet symbol to the feed's coin id. Unmapped symbols are not
/// queried and can only be served from the static fallback.
fn feed_id(symbol: &str) -> Option<&'static str> {
    match symbol {
        "ETH" => Some("ethereum"),
        "BNB" | "WBNB" => Some("binancecoin"),
        "POL" => Some("polygon-ecosystem-token"),
        "USDC" => Some("usd-coin"),
        "USDT" => Some("tether"),
        "DAI" => Some("dai"),
        "UNI" => Some("uniswap"),
        "WETH" => Some("weth"),
        "ARB" => Some("arbitrum"),
        _ => None,
    }
}

/// Hard-coded last resort for symbols whose price barely moves.
fn static_fallback(symbol: &str) -> Option<PricePoint> {
    match symbol {
        "USDC" | "USDT" | "DAI" => Some(PricePoint { price_usd: 1.0, change_24h: None }),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct FeedEntry {
    usd: f64,
    usd_24h_change: Option<f64>,
}

/// HTTP price feed with a cached-snapshot fallback.
#[derive(Debug)]
pub struct PriceFeed {
    http: reqwest::Client,
    base_url: String,
    snapshot: RwLock<PriceData>,
}

impl Default for PriceFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceFeed {
    /// Creates a feed against the default public API.
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            snapshot: RwLock::new(HashMap::new()),
        }
    }

    /// Points the feed at a different base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Replaces the HTTP client, e.g. to set a timeout.
    pub fn with_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    async fn fetch_remote(&self, symbols: &[String]) -> Result<PriceData> {
        let ids: Vec<&str> = symbols.iter().filter_map(|s| feed_id(s)).collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let url = format!("{}/simple/price", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("ids", ids.join(",")),
                ("vs_currencies", "usd".to_string()),
                ("include_24hr_change", "true".to_string()),
            ])
            .timeout(Duration::from_secs(15))
            .send()
            .await
            .map_err(|e| ChainviewError::PriceFeed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ChainviewError::PriceFeed(format!(
                "price API returned {}",
                response.status()
            )));
        }

        let body: HashMap<String, FeedEntry> = response
            .json()
            .await
            .map_err(|e| ChainviewError::PriceFeed(e.to_string()))?;

        let mut prices = HashMap::new();
        for symbol in symbols {
            let Some(id) = feed_id(symbol) else { continue };
            if let Some(entry) = body.get(id) {
                prices.insert(
                    symbol.clone(),
                    PricePoint { price_usd: entry.usd, change_24h: entry.usd_24h_change },
                );
            }
        }
        Ok(prices)
    }

    async fn from_cache(&self, symbols: &[String]) -> PriceData {
        let snapshot = self.snapshot.read().await;
        let mut prices = HashMap::new();
        for symbol in symbols {
            if let Some(point) = snapshot.get(symbol) {
                prices.insert(symbol.clone(), *point);
            } else if let Some(point) = static_fallback(symbol) {
                prices.insert(symbol.clone(), point);
            }
        }
        prices
    }
}

#[async_trait]
impl PriceApi for PriceFeed {
    async fn prices_with_fallback(&self, symbols: &[String], chain_id: u64) -> PriceData {
        let mut deduped: Vec<String> = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            if !deduped.contains(symbol) {
                deduped.push(symbol.clone());
            }
        }

        match self.fetch_remote(&deduped).await {
            Ok(fresh) => {
                let mut snapshot = self.snapshot.write().await;
                for (symbol, point) in &fresh {
                    snapshot.insert(symbol.clone(), *point);
                }
                drop(snapshot);

                // The feed may not know every requested symbol; fill the
                // gaps from the static defaults.
                let mut prices = fresh;
                for symbol in &deduped {
                    if !prices.contains_key(symbol) {
                        if let Some(point) = static_fallback(symbol) {
                            prices.insert(symbol.clone(), point);
                        }
                    }
                }
                prices
            }
            Err(err) => {
                tracing::warn!(chain_id, %err, "price fetch failed, serving cached snapshot");
                self.from_cache(&deduped).await
            }
        }
    }
}
