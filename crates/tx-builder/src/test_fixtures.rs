//! Script sets and locked outputs shared by the unit tests.

use bitcoin::{Address, Amount, Network, address::NetworkUnchecked};
use tapstake_coin_select::FeeModel;
use tapstake_primitives::MagicBytes;
use tapstake_script::{Generation, KeyMaterial, LockTerms, ScriptParams, ScriptSet};
use tapstake_test_utils::{
    keys::{p2tr_address, p2wpkh_address, public_key, xonly_key},
    utxo::p2wpkh_utxos,
};

use crate::{BuildConfig, FundingSource, LOCK_OUTPUT_INDEX, LockedOutput, build_lock_tx};

pub(crate) const NETWORK: Network = Network::Regtest;

fn keys(owner_key: Vec<u8>, operators: &[u8]) -> KeyMaterial {
    KeyMaterial {
        owner_key,
        operator_keys: operators
            .iter()
            .map(|i| xonly_key(*i).serialize().to_vec())
            .collect(),
        covenant_keys: (10..13).map(|i| xonly_key(i).serialize().to_vec()).collect(),
        covenant_threshold: 2,
    }
}

pub(crate) fn slashable_with(lock_timelock: u32, operator: u8) -> ScriptSet {
    let terms = LockTerms::new(MagicBytes::new(*b"tpsk"), 0)
        .with_lock_timelock(lock_timelock)
        .with_unbonding_timelock(10);
    let keys = keys(xonly_key(0).serialize().to_vec(), &[operator]);
    ScriptParams::new(Generation::Slashable, &keys, &terms)
        .unwrap()
        .build_scripts()
        .unwrap()
}

pub(crate) fn slashable() -> ScriptSet {
    slashable_with(150, 1)
}

pub(crate) fn bridge() -> ScriptSet {
    let terms = LockTerms::new(MagicBytes::new(*b"brdg"), 1)
        .with_lock_timelock(144)
        .with_external_address(vec![0x11; 20]);
    let keys = keys(public_key(0).serialize().to_vec(), &[]);
    ScriptParams::new(Generation::Bridge, &keys, &terms)
        .unwrap()
        .build_scripts()
        .unwrap()
}

pub(crate) fn covenant() -> ScriptSet {
    let terms = LockTerms::new(MagicBytes::new(*b"covn"), 0);
    let keys = keys(xonly_key(0).serialize().to_vec(), &[]);
    ScriptParams::new(Generation::Covenant, &keys, &terms)
        .unwrap()
        .build_scripts()
        .unwrap()
}

pub(crate) fn config() -> BuildConfig {
    BuildConfig::new(NETWORK, 10).with_fee_model(FeeModel::Heuristic)
}

pub(crate) fn change_address() -> Address<NetworkUnchecked> {
    p2wpkh_address(90, NETWORK)
}

pub(crate) fn destination() -> Address<NetworkUnchecked> {
    p2tr_address(91, NETWORK)
}

/// Locks `amount` under `set`, funded from a single wallet UTXO.
pub(crate) fn locked(set: &ScriptSet, amount: u64) -> LockedOutput {
    let utxos = p2wpkh_utxos(&[amount * 2]);
    let change = change_address();
    let funding = FundingSource::new(&utxos, &change);
    build_lock_tx(&config(), set, Amount::from_sat(amount), &funding, None)
        .unwrap()
        .locked_output(LOCK_OUTPUT_INDEX)
        .unwrap()
}
