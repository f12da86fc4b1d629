//! Errors during parsing/validation of primitive values.

use bitcoin::Network;
use thiserror::Error;

/// Errors raised while parsing raw public key material.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The key has the wrong length for the expected encoding.
    #[error("expected a {expected}-byte public key, found {found} bytes")]
    InvalidLength { expected: usize, found: usize },

    /// The bytes have the right length but are not a point on the curve.
    #[error("supplied pubkey is invalid")]
    InvalidPubkey(#[from] secp256k1::Error),

    /// The key is not valid hex.
    #[error("supplied pubkey is not valid hex: {0}")]
    InvalidHex(String),
}

/// Errors raised by the parameter checks every builder runs before doing any work.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Amounts must be strictly positive.
    #[error("amount must be greater than zero")]
    NonPositiveAmount,

    /// Fee rates must be strictly positive.
    #[error("fee rate must be greater than zero")]
    NonPositiveFeeRate,

    /// Fixed fees must be strictly positive.
    #[error("fee must be greater than zero")]
    NonPositiveFee,

    /// The absolute lock height would be interpreted as a Unix timestamp.
    #[error("lock height {0} is not a block height (must be below 500000000)")]
    InvalidLockHeight(u32),

    /// The relative timelock does not fit a BIP68 block-based sequence.
    #[error("relative timelock {0} must be within 1..=65535")]
    InvalidRelativeTimelock(u32),

    /// The address does not belong to the configured network.
    #[error("address {address} is not valid for network {network}")]
    InvalidAddress { address: String, network: Network },

    /// Magic bytes must be exactly four bytes.
    #[error("magic bytes must be 4 bytes, found {0}")]
    InvalidMagicBytes(usize),
}
