//! Deployment fixtures shared by the integration tests.

#![expect(unreachable_pub, reason = "test utilities")]

use bitcoin::{Address, Amount, Network, address::NetworkUnchecked, secp256k1::XOnlyPublicKey};
use tapstake_params::ProtocolParams;
use tapstake_script::ScriptSet;
use tapstake_primitives::{Utxo, constants::DUST_LIMIT};
use tapstake_test_utils::{
    keys::{p2tr_address, p2wpkh_address, public_key, xonly_key},
    utxo::p2wpkh_utxos,
};
use tapstake_tx_builder::{
    BuildConfig, FundingSource, PsbtTransactionResult, TxBuildError, build_lock_tx,
};

pub const NETWORK: Network = Network::Regtest;

/// Secret-key indices of the covenant committee.
pub const COVENANT_SIGNERS: [u8; 3] = [10, 11, 12];

pub const OWNER: u8 = 0;

pub const OPERATOR: u8 = 1;

pub fn covenant_keys() -> Vec<XOnlyPublicKey> {
    COVENANT_SIGNERS.iter().copied().map(xonly_key).collect()
}

/// A slashable deployment on regtest with a 2-of-3 covenant.
pub fn slashable_deployment(fee_model: &str, slashing_rate: f64) -> ProtocolParams {
    let covenants = covenant_keys()
        .iter()
        .map(|pk| format!("\"{pk}\""))
        .collect::<Vec<_>>()
        .join(",");
    let destination = slashing_destination().assume_checked().to_string();
    let json = format!(
        r#"{{
            "generation": "slashable",
            "network": "regtest",
            "magic_bytes": "tpsk",
            "covenant_keys": [{covenants}],
            "covenant_threshold": 2,
            "lock_timelock": 150,
            "unbonding_timelock": 10,
            "slashing": {{
                "rate": {slashing_rate},
                "min_fee": 1000,
                "destination": "{destination}"
            }},
            "fee_model": "{fee_model}"
        }}"#
    );
    ProtocolParams::from_json(&json).expect("valid deployment")
}

/// A bridge deployment on regtest with a 2-of-3 covenant and a 144-block timelock.
pub fn bridge_deployment(fee_model: &str) -> ProtocolParams {
    let covenants = covenant_keys()
        .iter()
        .map(|pk| format!("\"{pk}\""))
        .collect::<Vec<_>>()
        .join(",");
    let json = format!(
        r#"{{
            "generation": "bridge",
            "network": "regtest",
            "magic_bytes": "brdg",
            "version": 1,
            "covenant_keys": [{covenants}],
            "covenant_threshold": 2,
            "lock_timelock": 144,
            "fee_model": "{fee_model}"
        }}"#
    );
    ProtocolParams::from_json(&json).expect("valid deployment")
}

/// Bridge delegation of the owner's compressed key to a 20-byte external address.
pub fn bridge_delegation(params: &ProtocolParams) -> ScriptSet {
    params
        .script_params(&public_key(OWNER).serialize(), &[], Some(&[0x11; 20][..]))
        .and_then(|p| Ok(p.build_scripts()?))
        .expect("valid delegation")
}

/// Script set of the default delegation under `params`.
pub fn delegation(params: &ProtocolParams) -> ScriptSet {
    params
        .script_params(
            &xonly_key(OWNER).serialize(),
            &[xonly_key(OPERATOR).serialize().to_vec()],
            None,
        )
        .and_then(|p| Ok(p.build_scripts()?))
        .expect("valid delegation")
}

pub fn slashing_destination() -> Address<NetworkUnchecked> {
    p2tr_address(50, NETWORK)
}

pub fn withdrawal_address() -> Address<NetworkUnchecked> {
    p2tr_address(60, NETWORK)
}

pub fn change_address() -> Address<NetworkUnchecked> {
    p2wpkh_address(70, NETWORK)
}

/// Locks `amount` funded from wallet UTXOs of `utxo_values`.
pub fn lock(
    config: &BuildConfig,
    set: &ScriptSet,
    utxo_values: &[u64],
    amount: u64,
) -> Result<PsbtTransactionResult, TxBuildError> {
    lock_utxos(config, set, &p2wpkh_utxos(utxo_values), amount)
}

/// Locks `amount` funded from `utxos`, in the order given.
pub fn lock_utxos(
    config: &BuildConfig,
    set: &ScriptSet,
    utxos: &[Utxo],
    amount: u64,
) -> Result<PsbtTransactionResult, TxBuildError> {
    let change = change_address();
    let funding = FundingSource::new(utxos, &change);
    build_lock_tx(config, set, Amount::from_sat(amount), &funding, None)
}

/// `sum(inputs) == sum(outputs) + fee`, with every input value taken from the PSBT.
pub fn assert_reconciles(result: &PsbtTransactionResult) {
    let inputs: Amount = result
        .psbt
        .inputs
        .iter()
        .map(|input| input.witness_utxo.as_ref().expect("segwit input").value)
        .sum();
    let outputs: Amount = result.transaction().output.iter().map(|o| o.value).sum();
    assert_eq!(inputs, outputs + result.fee);
}

/// Every output except `OP_RETURN` ones and those at `exempt` indices is above dust.
pub fn assert_no_dust(result: &PsbtTransactionResult, exempt: &[usize]) {
    for (i, out) in result.transaction().output.iter().enumerate() {
        if out.script_pubkey.is_op_return() || exempt.contains(&i) {
            continue;
        }
        assert!(out.value.to_sat() >= DUST_LIMIT, "output {i} is dust: {}", out.value);
    }
}
