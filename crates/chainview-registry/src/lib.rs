//! # Chainview Registry
//!
//! Static per-chain registry: network metadata, public RPC endpoints, and the
//! common ERC-20 tokens tracked by default on each supported network. The
//! session derives its token list and price symbol set from here, and the
//! RPC proxy derives its endpoint allow-list from [`allowed_rpc_endpoints`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use chainview_types::ChainMetadata;

mod tokens;

pub use tokens::common_tokens_for_network;

/// Ethereum mainnet chain id
pub const ETHEREUM_CHAIN_ID: u64 = 1;
/// BNB Smart Chain mainnet chain id
pub const BSC_CHAIN_ID: u64 = 56;
/// Polygon mainnet chain id
pub const POLYGON_CHAIN_ID: u64 = 137;
/// Base mainnet chain id
pub const BASE_CHAIN_ID: u64 = 8453;
/// Arbitrum One chain id
pub const ARBITRUM_CHAIN_ID: u64 = 42161;

/// Ethereum mainnet configuration
pub fn ethereum() -> ChainMetadata {
    ChainMetadata {
        chain_id: ETHEREUM_CHAIN_ID,
        name: "Ethereum".to_string(),
        currency_symbol: "ETH".to_string(),
        decimals: 18,
        rpc_endpoints: vec![
            "https://eth.llamarpc.com".to_string(),
            "https://rpc.ankr.com/eth".to_string(),
            "https://ethereum.publicnode.com".to_string(),
        ],
        explorer: "https://etherscan.io".to_string(),
    }
}

/// BNB Smart Chain mainnet configuration
pub fn bsc() -> ChainMetadata {
    ChainMetadata {
        chain_id: BSC_CHAIN_ID,
        name: "BNB Smart Chain".to_string(),
        currency_symbol: "BNB".to_string(),
        decimals: 18,
        rpc_endpoints: vec![
            "https://bsc-dataseed.binance.org".to_string(),
            "https://rpc.ankr.com/bsc".to_string(),
            "https://bsc.publicnode.com".to_string(),
        ],
        explorer: "https://bscscan.com".to_string(),
    }
}

/// Polygon mainnet configuration
pub fn polygon() -> ChainMetadata {
    ChainMetadata {
        chain_id: POLYGON_CHAIN_ID,
        name: "Polygon Mainnet".to_string(),
        currency_symbol: "POL".to_string(),
        decimals: 18,
        rpc_endpoints: vec![
            "https://polygon-rpc.com".to_string(),
            "https://rpc.ankr.com/polygon".to_string(),
            "https://polygon.publicnode.com".to_string(),
        ],
        explorer: "https://polygonscan.com".to_string(),
    }
}

/// Base mainnet configuration
pub fn base() -> ChainMetadata {
    ChainMetadata {
        chain_id: BASE_CHAIN_ID,
        name: "Base".to_string(),
        currency_symbol: "ETH".to_string(),
        decimals: 18,
        rpc_endpoints: vec![
            "https://mainnet.base.org".to_string(),
            "https://base.llamarpc.com".to_string(),
        ],
        explorer: "https://basescan.org".to_string(),
    }
}

/// Arbitrum One configuration
pub fn arbitrum() -> ChainMetadata {
    ChainMetadata {
        chain_id: ARBITRUM_CHAIN_ID,
        name: "Arbitrum One".to_string(),
        currency_symbol: "ETH".to_string(),
        decimals: 18,
        rpc_endpoints: vec![
            "https://arb1.arbitrum.io/rpc".to_string(),
            "https://rpc.ankr.com/arbitrum".to_string(),
        ],
        explorer: "https://arbiscan.io".to_string(),
    }
}

/// All networks this build knows about.
pub fn supported_chains() -> Vec<ChainMetadata> {
    vec![ethereum(), bsc(), polygon(), base(), arbitrum()]
}

/// The network a fresh session probes before any wallet is connected.
pub fn default_chain() -> ChainMetadata {
    ethereum()
}

/// Looks up a chain by its EIP-155 id.
pub fn chain_by_id(chain_id: u64) -> Option<ChainMetadata> {
    supported_chains().into_iter().find(|c| c.chain_id == chain_id)
}

/// Every public RPC endpoint of every supported chain. This is the fixed
/// allow-list the forward proxy enforces.
pub fn allowed_rpc_endpoints() -> Vec<String> {
    supported_chains()
        .into_iter()
        .flat_map(|c| c.rpc_endpoints)
        .collect()
}

/// Returns the deduplicated price symbol set for a chain: the native
/// currency plus every tracked token.
pub fn price_symbols_for_network(chain_id: u64) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    if let Some(chain) = chain_by_id(chain_id) {
        symbols.push(chain.currency_symbol);
    }
    for token in common_tokens_for_network(chain_id) {
        if !symbols.contains(&token.symbol) {
            symbols.push(token.symbol);
        }
    }
    symbols
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_chains() {
        let chains = supported_chains();
        assert_eq!(chains.len(), 5);
        assert!(chains.iter().all(|c| !c.rpc_endpoints.is_empty()));
        assert!(chains.iter().all(|c| c.decimals == 18));
    }

    #[test]
    fn test_chain_by_id() {
        let polygon = chain_by_id(POLYGON_CHAIN_ID).unwrap();
        assert_eq!(polygon.currency_symbol, "POL");
        assert_eq!(polygon.chain_id, 137);

        assert!(chain_by_id(999_999).is_none());
    }

    #[test]
    fn test_default_chain_is_ethereum() {
        assert_eq!(default_chain().chain_id, ETHEREUM_CHAIN_ID);
    }

    #[test]
    fn test_allow_list_covers_all_chains() {
        let allowed = allowed_rpc_endpoints();
        for chain in supported_chains() {
            for endpoint in &chain.rpc_endpoints {
                assert!(allowed.contains(endpoint), "{endpoint} missing from allow-list");
            }
        }
        assert!(!allowed.contains(&"https://evil.example.com".to_string()));
    }

    #[test]
    fn test_price_symbols_deduplicated() {
        let symbols = price_symbols_for_network(ETHEREUM_CHAIN_ID);
        assert_eq!(symbols[0], "ETH");
        let unique: std::collections::HashSet<_> = symbols.iter().collect();
        assert_eq!(unique.len(), symbols.len());
    }

    #[test]
    fn test_price_symbols_unknown_chain_empty() {
        assert!(price_symbols_for_network(999_999).is_empty());
    }
}
