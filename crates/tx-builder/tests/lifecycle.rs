//! Delegation life cycles driven from deployment parameters.

#![expect(unused_crate_dependencies, reason = "test dependencies")]

mod common;

use bitcoin::{Amount, Sequence};
use common::{
    COVENANT_SIGNERS, NETWORK, OWNER, assert_no_dust, assert_reconciles, bridge_delegation,
    bridge_deployment, covenant_keys, delegation, lock, lock_utxos, slashable_deployment,
    slashing_destination, withdrawal_address,
};
use tapstake_coin_select::SelectionError;
use tapstake_primitives::ValidationError;
use tapstake_script::taproot::TapTree;
use tapstake_test_utils::{
    init_test_logging,
    keys::{keypair, keypairs},
    signing::{input_leaf, sign_leaf, verify_leaf_signature},
    utxo::p2wpkh_utxos,
};
use tapstake_tx_builder::{
    BuildConfig, FundingSource, LOCK_OUTPUT_INDEX, TxBuildError, UNBONDING_OUTPUT_INDEX,
    UnbondingFee, UnbondingOutput, build_lock_tx, build_slash_timelock_tx, build_slash_unbonded_tx,
    build_transfer_tx, build_unbonding_tx, build_withdraw_timelock_tx, build_withdraw_unbonded_tx,
};
use tapstake_witness::{CovenantSignature, finalize_input};

#[test]
fn test_lock_then_withdraw_after_timelock() {
    init_test_logging();
    let params = slashable_deployment("heuristic", 0.1);
    let config = BuildConfig::from_params(&params, 10);
    let set = delegation(&params);

    let lock_result = lock(&config, &set, &[100_000_000], 50_000_000).unwrap();
    assert_reconciles(&lock_result);
    let locked = lock_result.locked_output(LOCK_OUTPUT_INDEX).unwrap();
    assert_eq!(locked.value(), Amount::from_sat(50_000_000));

    let withdrawal =
        build_withdraw_timelock_tx(&config, &set, &locked, &withdrawal_address()).unwrap();
    assert_reconciles(&withdrawal);
    assert_eq!(withdrawal.fee, Amount::from_sat(2_250));
    assert_eq!(
        withdrawal.transaction().output[0].value,
        Amount::from_sat(49_997_750)
    );
    assert_eq!(
        withdrawal.transaction().input[0].sequence,
        Sequence::from_height(150)
    );
}

#[test]
fn test_bridge_lock_then_transfer() {
    let params = bridge_deployment("heuristic");
    let config = BuildConfig::from_params(&params, 10);
    let set = bridge_delegation(&params);

    let lock_result = lock_utxos(&config, &set, &p2wpkh_utxos(&[3_000_000]), 1_000_000).unwrap();
    assert_reconciles(&lock_result);
    assert_no_dust(&lock_result, &[]);
    assert_eq!(lock_result.fee, Amount::from_sat(3_330));
    assert_eq!(
        &lock_result.transaction().output[1].script_pubkey,
        set.data_embed().unwrap()
    );

    let locked = lock_result.locked_output(LOCK_OUTPUT_INDEX).unwrap();
    let transfer = build_transfer_tx(&config, &set, &locked, &withdrawal_address()).unwrap();
    assert_reconciles(&transfer);
    assert_no_dust(&transfer, &[]);
    assert_eq!(transfer.fee, Amount::from_sat(2_250));
    assert_eq!(
        transfer.transaction().output[0].value,
        Amount::from_sat(997_750)
    );
}

#[test]
fn test_lock_with_insufficient_funds() {
    let params = slashable_deployment("heuristic", 0.1);
    let config = BuildConfig::from_params(&params, 10);
    let set = delegation(&params);

    let err = lock(&config, &set, &[1_000_000], 5_000_000).unwrap_err();
    assert!(matches!(
        err,
        TxBuildError::Selection(SelectionError::InsufficientFunds { .. })
    ));
}

#[test]
fn test_lock_rejects_timestamp_lock_height() {
    let params = slashable_deployment("heuristic", 0.1);
    let config = BuildConfig::from_params(&params, 10);
    let set = delegation(&params);
    let utxos = p2wpkh_utxos(&[2_000_000]);
    let change = common::change_address();
    let funding = FundingSource::new(&utxos, &change);

    assert_eq!(
        build_lock_tx(
            &config,
            &set,
            Amount::from_sat(1_000_000),
            &funding,
            Some(500_000_000)
        ),
        Err(TxBuildError::Validation(ValidationError::InvalidLockHeight(
            500_000_000
        )))
    );
}

#[test]
fn test_script_aware_lock_fee() {
    let params = slashable_deployment("script_aware", 0.1);
    let config = BuildConfig::from_params(&params, 10);
    let set = delegation(&params);

    let result = lock(&config, &set, &[2_000_000], 1_000_000).unwrap();
    assert_reconciles(&result);
    // p2wpkh input 68, lock 43, data embed 73 + 9, change 43, overhead 11
    assert_eq!(result.fee, Amount::from_sat(2_470));
    assert_eq!(
        result.transaction().output[2].value,
        Amount::from_sat(2_000_000 - 1_000_000 - 2_470)
    );
}

#[test]
fn test_slash_locked_output() {
    let params = slashable_deployment("heuristic", 0.5);
    let config = BuildConfig::from_params(&params, 10);
    let set = delegation(&params);
    let scripts = set.as_slashable().unwrap();
    let slashing = params.slashing.clone().unwrap();

    let locked = lock(&config, &set, &[200_000_000], 100_000_000)
        .unwrap()
        .locked_output(LOCK_OUTPUT_INDEX)
        .unwrap();
    let result = build_slash_timelock_tx(&config, scripts, &locked, &slashing).unwrap();
    assert_reconciles(&result);

    let outputs = &result.transaction().output;
    assert_eq!(outputs[0].value, Amount::from_sat(50_000_000));
    assert_eq!(
        outputs[0].script_pubkey,
        slashing_destination()
            .require_network(NETWORK)
            .unwrap()
            .script_pubkey()
    );
    assert_eq!(outputs[1].value, Amount::from_sat(49_999_000));
    assert_eq!(result.fee, Amount::from_sat(1_000));
}

#[test]
fn test_unbond_then_withdraw_or_slash() {
    let params = slashable_deployment("script_aware", 0.2);
    let config = BuildConfig::from_params(&params, 5);
    let set = delegation(&params);
    let scripts = set.as_slashable().unwrap();

    let locked = lock(&config, &set, &[3_000_000], 2_000_000)
        .unwrap()
        .locked_output(LOCK_OUTPUT_INDEX)
        .unwrap();
    let unbonding_result =
        build_unbonding_tx(&config, scripts, &locked, UnbondingFee::Rate(5)).unwrap();
    assert_reconciles(&unbonding_result);
    // (58 + 17 + 43 + 11) * 5
    assert_eq!(unbonding_result.fee, Amount::from_sat(645));
    let unbonding = unbonding_result
        .unbonding_output(UNBONDING_OUTPUT_INDEX)
        .unwrap();
    assert_eq!(
        unbonding.script_pubkey(),
        TapTree::unbonding(scripts).unwrap().script_pubkey().as_script()
    );

    let withdrawal =
        build_withdraw_unbonded_tx(&config, scripts, &unbonding, &withdrawal_address()).unwrap();
    assert_reconciles(&withdrawal);
    assert_eq!(
        withdrawal.transaction().input[0].sequence,
        Sequence::from_height(10)
    );

    let slashing = params.slashing.clone().unwrap();
    let slash = build_slash_unbonded_tx(&config, scripts, &unbonding, &slashing).unwrap();
    assert_reconciles(&slash);
    assert_eq!(slash.fee, slashing.min_fee);

    // a lock output is not an unbonding output
    let misused = UnbondingOutput::new(locked.outpoint(), locked.tx_out().clone());
    assert_eq!(
        build_withdraw_unbonded_tx(&config, scripts, &misused, &withdrawal_address()),
        Err(TxBuildError::ScriptMismatch(locked.outpoint()))
    );
}

#[test]
fn test_signed_unbonding_witness() {
    init_test_logging();
    let params = slashable_deployment("heuristic", 0.1);
    let config = BuildConfig::from_params(&params, 10);
    let set = delegation(&params);
    let scripts = set.as_slashable().unwrap();

    let locked = lock(&config, &set, &[2_000_000], 1_000_000)
        .unwrap()
        .locked_output(LOCK_OUTPUT_INDEX)
        .unwrap();
    let mut result = build_unbonding_tx(
        &config,
        scripts,
        &locked,
        UnbondingFee::Manual(Amount::from_sat(1_000)),
    )
    .unwrap();

    let leaf = scripts.unbonding();
    assert_eq!(&input_leaf(&result.psbt, 0).unwrap(), leaf);

    let owner_sig = sign_leaf(&result.psbt, 0, &keypair(OWNER)).unwrap().signature;
    // two of three covenant members sign
    let covenant_sigs: Vec<_> = keypairs(COVENANT_SIGNERS[0], 2)
        .iter()
        .map(|kp| {
            let pubkey = kp.x_only_public_key().0;
            let signature = sign_leaf(&result.psbt, 0, kp).unwrap();
            verify_leaf_signature(&result.psbt, 0, &signature, &pubkey).unwrap();
            CovenantSignature::new(&pubkey, &signature)
        })
        .collect();

    finalize_input(
        &mut result.psbt,
        0,
        &[owner_sig.serialize().to_vec()],
        &covenant_keys(),
        &covenant_sigs,
    )
    .unwrap();

    let signed = result.psbt.extract_tx_unchecked_fee_rate();
    let witness = &signed.input[0].witness;
    // three covenant slots, owner signature, leaf script, control block
    assert_eq!(witness.len(), 6);
    assert_eq!(
        witness.iter().filter(|item| item.len() == 64).count(),
        3,
        "owner plus two covenant signatures"
    );
    assert_eq!(witness.nth(3).unwrap(), owner_sig.serialize().as_slice());
    assert_eq!(witness.nth(4).unwrap(), leaf.as_bytes());
    assert_eq!(
        witness.nth(5).unwrap(),
        TapTree::slashable_lock(scripts)
            .unwrap()
            .leaf_spend(leaf)
            .unwrap()
            .control_block
            .serialize()
            .as_slice()
    );
}
