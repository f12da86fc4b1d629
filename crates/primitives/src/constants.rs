//! Protocol-wide constants.

use bitcoin::{Sequence, secp256k1::XOnlyPublicKey};
use hex_literal::hex;

/// Outputs at or below this value are never created, except for the slashing destination.
pub const DUST_LIMIT: u64 = 546;

/// Absolute locktimes at or above this value are interpreted as Unix timestamps.
pub const LOCKTIME_THRESHOLD: u32 = 500_000_000;

/// Largest relative timelock (in blocks) expressible in a BIP68 sequence.
pub const MAX_RELATIVE_TIMELOCK: u32 = 0xffff;

/// The size (in bytes) of an x-only Schnorr public key.
pub const XONLY_PK_LEN: usize = 32;

/// The size (in bytes) of a compressed ECDSA public key.
pub const COMPRESSED_PK_LEN: usize = 33;

/// The size (in bytes) of an external-chain address bound in a data-embed output.
pub const EXTERNAL_ADDRESS_LEN: usize = 20;

/// The size (in bytes) of the magic prefix of a data-embed payload.
pub const MAGIC_BYTES_LEN: usize = 4;

/// Sequence used by funding inputs: replace-by-fee on, relative locktime off.
pub const FUNDING_SEQUENCE: Sequence = Sequence::ENABLE_RBF_NO_LOCKTIME;

/// Sequence used by covenant-authorised spends that do not rely on `OP_CHECKSEQUENCEVERIFY`.
pub const COVENANT_SPEND_SEQUENCE: Sequence = Sequence::MAX;

/// BIP341 "nothing up my sleeve" point, `lift_x(SHA256(G))`.
///
/// Used as the taproot internal key of every lock output so the key path is unspendable.
pub const UNSPENDABLE_INTERNAL_KEY: [u8; 32] =
    hex!("50929b74c1a04954b78b4b6035e97a5e078a5a0f28ec96d547bfee9ace803ac0");

/// Returns [`UNSPENDABLE_INTERNAL_KEY`] as an [`XOnlyPublicKey`].
pub fn unspendable_internal_key() -> XOnlyPublicKey {
    XOnlyPublicKey::from_slice(&UNSPENDABLE_INTERNAL_KEY).expect("NUMS point is a valid key")
}
