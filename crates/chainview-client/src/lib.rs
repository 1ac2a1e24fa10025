//! # Chainview Client
//!
//! The chain collaborator of the Chainview session SDK: a JSON-RPC client
//! for EVM networks built on Alloy. It implements [`ChainApi`] with
//!
//! - native balance fetches wrapped in exponential backoff ([`retry`]),
//! - batched ERC-20 balance reads behind one all-or-nothing entry point,
//! - a liveness probe for the active endpoint,
//! - client-side network switching against the static registry,
//! - endpoint failover: after a failed call the client rotates to the next
//!   public endpoint of the active chain.
//!
//! The client is deliberately stateless beyond "which chain, which
//! endpoint": providers are constructed per call, so a failover or switch
//! never invalidates in-flight work.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod retry;

use alloy::primitives::utils::format_units;
use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::sol;
use async_trait::async_trait;
use chainview_error::{ChainviewError, Result};
use chainview_types::{ChainApi, ChainMetadata, NetworkHealth, TokenBalance, TokenInfo};
use std::str::FromStr;
use std::sync::RwLock;
use std::time::Duration;

pub use retry::{with_backoff, BackoffConfig, RetrySchedule};

sol! {
    #[sol(rpc)]
    contract ERC20 {
        function balanceOf(address account) public view returns (uint256);
        function decimals() public view returns (uint8);
        function symbol() public view returns (string memory);
    }
}

/// How long a health probe may take before the endpoint counts as down.
const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
struct ChainState {
    meta: ChainMetadata,
    endpoint_idx: usize,
}

/// Alloy-backed [`ChainApi`] implementation for EVM networks.
#[derive(Debug)]
pub struct EvmClient {
    state: RwLock<ChainState>,
    backoff: BackoffConfig,
}

impl EvmClient {
    /// Creates a client pointed at `chain` with the default retry policy.
    pub fn new(chain: ChainMetadata) -> Self {
        Self::with_backoff_config(chain, BackoffConfig::default())
    }

    /// Creates a client with an explicit retry policy.
    pub fn with_backoff_config(chain: ChainMetadata, backoff: BackoffConfig) -> Self {
        Self {
            state: RwLock::new(ChainState { meta: chain, endpoint_idx: 0 }),
            backoff,
        }
    }

    fn snapshot(&self) -> ChainState {
        match self.state.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn active_endpoint(&self) -> Result<String> {
        let state = self.snapshot();
        if state.meta.rpc_endpoints.is_empty() {
            return Err(ChainviewError::Config(format!(
                "chain {} has no RPC endpoints",
                state.meta.chain_id
            )));
        }
        let idx = state.endpoint_idx % state.meta.rpc_endpoints.len();
        Ok(state.meta.rpc_endpoints[idx].clone())
    }

    /// Rotates to the next endpoint of the active chain after a failure.
    fn record_failure(&self) {
        let mut guard = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.meta.rpc_endpoints.len() > 1 {
            let next = (guard.endpoint_idx + 1) % guard.meta.rpc_endpoints.len();
            tracing::info!(
                chain_id = guard.meta.chain_id,
                from = %guard.meta.rpc_endpoints[guard.endpoint_idx % guard.meta.rpc_endpoints.len()],
                to = %guard.meta.rpc_endpoints[next],
                "failing over to next endpoint"
            );
            guard.endpoint_idx = next;
        }
    }

    fn parse_address(address: &str) -> Result<Address> {
        Address::from_str(address).map_err(|e| ChainviewError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
    }

    fn rpc_err(method: &str, err: impl std::fmt::Display) -> ChainviewError {
        ChainviewError::RpcRequest { method: method.to_string(), reason: err.to_string() }
    }

    async fn fetch_native_balance(&self, address: Address, decimals: u8) -> Result<String> {
        let url = self.active_endpoint()?;
        let provider = ProviderBuilder::new().connect_http(
            url.parse().map_err(|e| Self::rpc_err("eth_getBalance", e))?,
        );
        let wei: U256 = provider.get_balance(address).await.map_err(|e| {
            self.record_failure();
            Self::rpc_err("eth_getBalance", e)
        })?;
        format_units(wei, decimals).map_err(|e| Self::rpc_err("eth_getBalance", e))
    }

    async fn fetch_token_balance(
        url: String,
        token: TokenInfo,
        owner: Address,
    ) -> Result<TokenBalance> {
        let provider = ProviderBuilder::new()
            .connect_http(url.parse().map_err(|e| Self::rpc_err("eth_call", e))?);
        let contract_addr = Self::parse_address(&token.address)?;
        let contract = ERC20::new(contract_addr, provider);
        let raw: U256 = contract
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| Self::rpc_err("eth_call", e))?;
        let formatted =
            format_units(raw, token.decimals).map_err(|e| Self::rpc_err("eth_call", e))?;
        Ok(TokenBalance { token, raw: raw.to_string(), formatted })
    }
}

#[async_trait]
impl ChainApi for EvmClient {
    async fn balance_with_retry(&self, address: &str) -> Result<String> {
        let owner = Self::parse_address(address)?;
        let decimals = self.snapshot().meta.decimals;

        with_backoff(self.backoff.clone(), || self.fetch_native_balance(owner, decimals))
            .await
            .map_err(|(attempts, err)| ChainviewError::RetriesExhausted {
                attempts,
                last_error: err.to_string(),
            })
    }

    async fn multiple_token_balances(
        &self,
        tokens: &[TokenInfo],
        address: &str,
    ) -> Result<Vec<TokenBalance>> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }
        let owner = Self::parse_address(address)?;
        let url = self.active_endpoint()?;

        let fetches = tokens
            .iter()
            .cloned()
            .map(|token| Self::fetch_token_balance(url.clone(), token, owner));
        let results = futures::future::join_all(fetches).await;

        // All-or-nothing: a single failed read invalidates the batch so the
        // session can fall back to an obviously-empty state.
        let mut balances = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(balance) => balances.push(balance),
                Err(err) => {
                    self.record_failure();
                    return Err(err);
                }
            }
        }
        Ok(balances)
    }

    async fn check_network_health(&self) -> Result<NetworkHealth> {
        let chain_id = self.snapshot().meta.chain_id;
        let url = self.active_endpoint()?;

        let probe = async {
            let provider = ProviderBuilder::new().connect_http(
                url.parse().map_err(|e| Self::rpc_err("eth_blockNumber", e))?,
            );
            provider
                .get_block_number()
                .await
                .map_err(|e| Self::rpc_err("eth_blockNumber", e))
        };

        match tokio::time::timeout(HEALTH_PROBE_TIMEOUT, probe).await {
            Ok(Ok(block_number)) => {
                Ok(NetworkHealth { chain_id, block_number, healthy: true })
            }
            Ok(Err(err)) => {
                tracing::warn!(chain_id, %err, "health probe failed");
                self.record_failure();
                Ok(NetworkHealth { chain_id, block_number: 0, healthy: false })
            }
            Err(_) => {
                tracing::warn!(chain_id, "health probe timed out");
                self.record_failure();
                Ok(NetworkHealth { chain_id, block_number: 0, healthy: false })
            }
        }
    }

    async fn switch_network(&self, chain_id: u64) -> Result<bool> {
        let Some(meta) = chainview_registry::chain_by_id(chain_id) else {
            tracing::warn!(chain_id, "switch declined: chain not in registry");
            return Ok(false);
        };
        let mut guard = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        tracing::info!(from = guard.meta.chain_id, to = chain_id, "switching network");
        *guard = ChainState { meta, endpoint_idx: 0 };
        Ok(true)
    }

    fn current_chain(&self) -> Result<ChainMetadata> {
        Ok(self.snapshot().meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const OWNER: &str = "0x3cDB3d9e1B74692Bb1E3bb5fc81938151cA64b02";

    fn test_chain(endpoint: String) -> ChainMetadata {
        ChainMetadata {
            chain_id: 1,
            name: "Ethereum".into(),
            currency_symbol: "ETH".into(),
            decimals: 18,
            rpc_endpoints: vec![endpoint],
            explorer: "https://etherscan.io".into(),
        }
    }

    fn rpc_result(result: &str) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .set_body_json(json!({ "jsonrpc": "2.0", "id": 1, "result": result }))
    }

    #[tokio::test]
    async fn test_balance_formats_to_human_units() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "eth_getBalance" })))
            // 1 ETH in wei
            .respond_with(rpc_result("0xde0b6b3a7640000"))
            .mount(&server)
            .await;

        let client = EvmClient::new(test_chain(server.uri()));
        let balance = client.balance_with_retry(OWNER).await.unwrap();
        assert!(balance.starts_with("1.0"), "got {balance}");
    }

    #[tokio::test]
    async fn test_balance_rejects_bad_address() {
        let client = EvmClient::new(test_chain("http://localhost:1".into()));
        let err = client.balance_with_retry("not-an-address").await.unwrap_err();
        assert!(matches!(err, ChainviewError::InvalidAddress { .. }));
    }

    #[tokio::test]
    async fn test_balance_retries_then_gives_up() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let chain = test_chain(server.uri());
        let backoff = BackoffConfig::new()
            .with_initial_delay(Duration::from_millis(1))
            .with_max_attempts(3)
            .with_jitter(0.0);
        let client = EvmClient::with_backoff_config(chain, backoff);

        let err = client.balance_with_retry(OWNER).await.unwrap_err();
        assert!(matches!(err, ChainviewError::RetriesExhausted { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn test_token_batch_all_or_nothing() {
        let server = MockServer::start().await;
        // Every eth_call errors; the batch must fail as a whole.
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": -32000, "message": "execution reverted" }
            })))
            .mount(&server)
            .await;

        let client = EvmClient::new(test_chain(server.uri()));
        let tokens = chainview_registry::common_tokens_for_network(1);
        let result = client.multiple_token_balances(&tokens, OWNER).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_token_batch_empty_list() {
        let client = EvmClient::new(test_chain("http://localhost:1".into()));
        let balances = client.multiple_token_balances(&[], OWNER).await.unwrap();
        assert!(balances.is_empty());
    }

    #[tokio::test]
    async fn test_health_probe_up() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "eth_blockNumber" })))
            .respond_with(rpc_result("0x10"))
            .mount(&server)
            .await;

        let client = EvmClient::new(test_chain(server.uri()));
        let health = client.check_network_health().await.unwrap();
        assert!(health.healthy);
        assert_eq!(health.block_number, 16);
        assert_eq!(health.chain_id, 1);
    }

    #[tokio::test]
    async fn test_health_probe_down_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = EvmClient::new(test_chain(server.uri()));
        let health = client.check_network_health().await.unwrap();
        assert!(!health.healthy);
        assert_eq!(health.block_number, 0);
    }

    #[tokio::test]
    async fn test_switch_network_known_chain() {
        let client = EvmClient::new(test_chain("http://localhost:1".into()));
        assert!(client.switch_network(137).await.unwrap());
        let chain = client.current_chain().unwrap();
        assert_eq!(chain.chain_id, 137);
        assert_eq!(chain.currency_symbol, "POL");
    }

    #[tokio::test]
    async fn test_switch_network_unknown_chain_declined() {
        let client = EvmClient::new(test_chain("http://localhost:1".into()));
        assert!(!client.switch_network(424242).await.unwrap());
        assert_eq!(client.current_chain().unwrap().chain_id, 1);
    }

    #[test]
    fn test_failover_rotates_endpoints() {
        let mut chain = test_chain("https://a.example".into());
        chain.rpc_endpoints.push("https://b.example".into());
        let client = EvmClient::new(chain);

        assert_eq!(client.active_endpoint().unwrap(), "https://a.example");
        client.record_failure();
        assert_eq!(client.active_endpoint().unwrap(), "https://b.example");
        client.record_failure();
        assert_eq!(client.active_endpoint().unwrap(), "https://a.example");
    }
}
