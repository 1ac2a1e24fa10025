//! Send-flow validation, surfaced before any collaborator call.

use alloy::primitives::Address;
use chainview_error::{ChainviewError, Result};
use chainview_types::TransferRequest;
use std::str::FromStr;

/// Validates a native-currency transfer and returns it ready for signing.
///
/// Checks, in order: the recipient parses as an EVM address, the amount is
/// a positive finite number, and the amount does not exceed `available`
/// (the wallet's current native balance as a decimal string).
pub fn validate_transfer(
    to: &str,
    amount: f64,
    available: &str,
    chain_id: u64,
) -> Result<TransferRequest> {
    Address::from_str(to).map_err(|e| ChainviewError::InvalidAddress {
        address: to.to_string(),
        reason: e.to_string(),
    })?;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(ChainviewError::NonPositiveAmount(amount));
    }

    let have = available.parse::<f64>().unwrap_or(0.0);
    if amount > have {
        return Err(ChainviewError::InsufficientBalance { have, need: amount });
    }

    Ok(TransferRequest { to: to.to_string(), amount, chain_id })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECIPIENT: &str = "0x3cDB3d9e1B74692Bb1E3bb5fc81938151cA64b02";

    #[test]
    fn test_valid_transfer() {
        let request = validate_transfer(RECIPIENT, 0.5, "1.25", 1).unwrap();
        assert_eq!(request.to, RECIPIENT);
        assert_eq!(request.amount, 0.5);
        assert_eq!(request.chain_id, 1);
    }

    #[test]
    fn test_bad_address() {
        let err = validate_transfer("0xnope", 0.5, "1.0", 1).unwrap_err();
        assert!(matches!(err, ChainviewError::InvalidAddress { .. }));
    }

    #[test]
    fn test_non_positive_amounts() {
        for amount in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = validate_transfer(RECIPIENT, amount, "10.0", 1).unwrap_err();
            assert!(matches!(err, ChainviewError::NonPositiveAmount(_)), "amount {amount}");
        }
    }

    #[test]
    fn test_insufficient_balance() {
        let err = validate_transfer(RECIPIENT, 2.0, "1.0", 1).unwrap_err();
        assert!(matches!(
            err,
            ChainviewError::InsufficientBalance { have, need } if have == 1.0 && need == 2.0
        ));
    }

    #[test]
    fn test_unparseable_balance_counts_as_zero() {
        let err = validate_transfer(RECIPIENT, 0.1, "not-a-number", 1).unwrap_err();
        assert!(matches!(err, ChainviewError::InsufficientBalance { .. }));
    }
}
