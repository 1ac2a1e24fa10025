//! Common ERC-20 token lists per supported network.
//!
//! These are the tokens a fresh wallet tracks by default. Contract addresses
//! are the canonical mainnet deployments.

use crate::{
    ARBITRUM_CHAIN_ID, BASE_CHAIN_ID, BSC_CHAIN_ID, ETHEREUM_CHAIN_ID, POLYGON_CHAIN_ID,
};
use chainview_types::TokenInfo;

fn token(chain_id: u64, address: &str, symbol: &str, name: &str, decimals: u8) -> TokenInfo {
    TokenInfo {
        address: address.to_string(),
        symbol: symbol.to_string(),
        name: name.to_string(),
        decimals,
        chain_id,
    }
}

/// Default tracked tokens for `chain_id`. Unknown chains yield an empty
/// list, which the session treats as "nothing to track", not an error.
pub fn common_tokens_for_network(chain_id: u64) -> Vec<TokenInfo> {
    match chain_id {
        ETHEREUM_CHAIN_ID => vec![
            token(chain_id, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", "USDC", "USD Coin", 6),
            token(chain_id, "0xdAC17F958D2ee523a2206206994597C13D831ec7", "USDT", "Tether USD", 6),
            token(chain_id, "0x6B175474E89094C44Da98b954EedeAC495271d0F", "DAI", "Dai Stablecoin", 18),
            token(chain_id, "0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984", "UNI", "Uniswap", 18),
            token(chain_id, "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", "WETH", "Wrapped Ether", 18),
        ],
        BSC_CHAIN_ID => vec![
            token(chain_id, "0x55d398326f99059fF775485246999027B3197955", "USDT", "Tether USD", 18),
            token(chain_id, "0x8AC76a51cc950d9822D68b83fE1Ad97B32Cd580d", "USDC", "USD Coin", 18),
            token(chain_id, "0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c", "WBNB", "Wrapped BNB", 18),
        ],
        POLYGON_CHAIN_ID => vec![
            token(chain_id, "0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359", "USDC", "USD Coin", 6),
            token(chain_id, "0xc2132D05D31c914a87C6611C10748AEb04B58e8F", "USDT", "Tether USD", 6),
            token(chain_id, "0x8f3Cf7ad23Cd3CaDbD9735AFf958023239c6A063", "DAI", "Dai Stablecoin", 18),
            token(chain_id, "0x7ceB23fD6bC0adD59E62ac25578270cFf1b9f619", "WETH", "Wrapped Ether", 18),
        ],
        BASE_CHAIN_ID => vec![
            token(chain_id, "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913", "USDC", "USD Coin", 6),
            token(chain_id, "0x50c5725949A6F0c72E6C4a641F24049A917DB0Cb", "DAI", "Dai Stablecoin", 18),
            token(chain_id, "0x4200000000000000000000000000000000000006", "WETH", "Wrapped Ether", 18),
        ],
        ARBITRUM_CHAIN_ID => vec![
            token(chain_id, "0xaf88d065e77c8cC2239327C5EDb3A432268e5831", "USDC", "USD Coin", 6),
            token(chain_id, "0xFd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9", "USDT", "Tether USD", 6),
            token(chain_id, "0x912CE59144191C1204E64559FE8253a0e49E6548", "ARB", "Arbitrum", 18),
        ],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_supported_chain_has_tokens() {
        for chain in crate::supported_chains() {
            let tokens = common_tokens_for_network(chain.chain_id);
            assert!(!tokens.is_empty(), "chain {} has no tokens", chain.chain_id);
            assert!(tokens.iter().all(|t| t.chain_id == chain.chain_id));
        }
    }

    #[test]
    fn test_unknown_chain_is_empty() {
        assert!(common_tokens_for_network(31337).is_empty());
    }

    #[test]
    fn test_addresses_look_like_contracts() {
        for tokens in [
            common_tokens_for_network(ETHEREUM_CHAIN_ID),
            common_tokens_for_network(POLYGON_CHAIN_ID),
        ] {
            for t in tokens {
                assert!(t.address.starts_with("0x"));
                assert_eq!(t.address.len(), 42);
            }
        }
    }

    #[test]
    fn test_stablecoin_decimals() {
        let usdc = common_tokens_for_network(ETHEREUM_CHAIN_ID)
            .into_iter()
            .find(|t| t.symbol == "USDC")
            .unwrap();
        assert_eq!(usdc.decimals, 6);
    }
}
