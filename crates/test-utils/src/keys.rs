//! Deterministic key material.

use bitcoin::{Address, CompressedPublicKey, Network, address::NetworkUnchecked};
use secp256k1::{Keypair, PublicKey, SECP256K1, SecretKey, XOnlyPublicKey};

/// Secret key number `i`; distinct for every `i` below 255.
pub fn secret_key(i: u8) -> SecretKey {
    SecretKey::from_slice(&[i.wrapping_add(1); 32]).expect("non-zero scalar below the order")
}

pub fn keypair(i: u8) -> Keypair {
    Keypair::from_secret_key(SECP256K1, &secret_key(i))
}

pub fn public_key(i: u8) -> PublicKey {
    PublicKey::from_secret_key(SECP256K1, &secret_key(i))
}

pub fn xonly_key(i: u8) -> XOnlyPublicKey {
    keypair(i).x_only_public_key().0
}

/// The first `n` x-only keys.
pub fn xonly_keys(n: usize) -> Vec<XOnlyPublicKey> {
    (0..n as u8).map(xonly_key).collect()
}

/// Keypairs numbered `start..start + n`.
pub fn keypairs(start: u8, n: usize) -> Vec<Keypair> {
    (start..start + n as u8).map(keypair).collect()
}

/// A key-path P2TR address on `network`.
pub fn p2tr_address(i: u8, network: Network) -> Address<NetworkUnchecked> {
    Address::p2tr(SECP256K1, xonly_key(i), None, network)
        .as_unchecked()
        .clone()
}

/// A P2WPKH address on `network`.
pub fn p2wpkh_address(i: u8, network: Network) -> Address<NetworkUnchecked> {
    let pk = CompressedPublicKey(public_key(i));
    Address::p2wpkh(&pk, network).as_unchecked().clone()
}
