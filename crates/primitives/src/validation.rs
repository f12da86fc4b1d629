//! Parameter checks shared by the builders.

use bitcoin::{Address, Network, address::NetworkUnchecked};

use crate::{
    ValidationError,
    constants::{LOCKTIME_THRESHOLD, MAX_RELATIVE_TIMELOCK},
};

/// Accepts only height-based absolute locktimes.
pub fn validate_lock_height(height: u32) -> Result<u32, ValidationError> {
    if height >= LOCKTIME_THRESHOLD {
        return Err(ValidationError::InvalidLockHeight(height));
    }
    Ok(height)
}

/// Accepts relative timelocks in `1..=65535` blocks.
pub fn validate_relative_timelock(blocks: u32) -> Result<u16, ValidationError> {
    if blocks == 0 || blocks > MAX_RELATIVE_TIMELOCK {
        return Err(ValidationError::InvalidRelativeTimelock(blocks));
    }
    Ok(blocks as u16)
}

pub fn validate_fee_rate(fee_rate: u64) -> Result<u64, ValidationError> {
    if fee_rate == 0 {
        return Err(ValidationError::NonPositiveFeeRate);
    }
    Ok(fee_rate)
}

/// Checks `address` against `network` and returns the checked form.
pub fn validate_address(
    address: &Address<NetworkUnchecked>,
    network: Network,
) -> Result<Address, ValidationError> {
    address
        .clone()
        .require_network(network)
        .map_err(|_| ValidationError::InvalidAddress {
            address: address.assume_checked_ref().to_string(),
            network,
        })
}

#[cfg(test)]
mod tests {
    use bitcoin::secp256k1::{SECP256K1, SecretKey};

    use super::*;

    #[test]
    fn test_lock_height_threshold() {
        assert_eq!(validate_lock_height(0), Ok(0));
        assert_eq!(validate_lock_height(499_999_999), Ok(499_999_999));
        assert_eq!(
            validate_lock_height(500_000_000),
            Err(ValidationError::InvalidLockHeight(500_000_000))
        );
    }

    #[test]
    fn test_relative_timelock_range() {
        assert_eq!(validate_relative_timelock(1), Ok(1));
        assert_eq!(validate_relative_timelock(65_535), Ok(65_535));
        assert!(validate_relative_timelock(0).is_err());
        assert!(validate_relative_timelock(65_536).is_err());
    }

    #[test]
    fn test_address_network_mismatch() {
        let sk = SecretKey::from_slice(&[1u8; 32]).unwrap();
        let (xonly, _) = sk.x_only_public_key(SECP256K1);
        let addr = Address::p2tr(SECP256K1, xonly, None, Network::Regtest)
            .as_unchecked()
            .clone();
        assert!(validate_address(&addr, Network::Regtest).is_ok());
        assert!(matches!(
            validate_address(&addr, Network::Bitcoin),
            Err(ValidationError::InvalidAddress { .. })
        ));
    }
}
