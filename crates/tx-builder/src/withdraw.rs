//! Owner withdrawals once a relative timelock has matured.

use bitcoin::{Address, OutPoint, ScriptBuf, Sequence, TxOut, address::NetworkUnchecked};
use tapstake_script::{ScriptSet, SlashableScripts, extract_relative_timelock, taproot::TapTree};

use crate::{
    BuildConfig, LockedOutput, PsbtTransactionResult, TxBuildError, UnbondingOutput,
    psbt::{assemble, deduct_fee, leaf_input, non_dust_output, template_output},
};

/// Withdraws a lock output through its timelock leaf.
///
/// The input sequence is the timelock read back from the leaf, so the transaction
/// only becomes valid once the lock output is that many blocks deep.
pub fn build_withdraw_timelock_tx(
    config: &BuildConfig,
    scripts: &ScriptSet,
    locked: &LockedOutput,
    destination: &Address<NetworkUnchecked>,
) -> Result<PsbtTransactionResult, TxBuildError> {
    let leaf = scripts
        .timelock()
        .ok_or(TxBuildError::UnsupportedGeneration {
            operation: "timelock withdrawal",
            generation: scripts.generation(),
        })?;
    let sequence = Sequence::from_height(extract_relative_timelock(leaf)?);
    sweep_leaf(
        "withdraw_timelock",
        config,
        TapTree::lock(scripts)?,
        leaf,
        sequence,
        locked.outpoint(),
        locked.tx_out(),
        destination,
    )
}

/// Withdraws an unbonding output through its unbonding-timelock leaf.
pub fn build_withdraw_unbonded_tx(
    config: &BuildConfig,
    scripts: &SlashableScripts,
    unbonding: &UnbondingOutput,
    destination: &Address<NetworkUnchecked>,
) -> Result<PsbtTransactionResult, TxBuildError> {
    let leaf = scripts.unbonding_timelock();
    let sequence = Sequence::from_height(extract_relative_timelock(leaf)?);
    sweep_leaf(
        "withdraw_unbonded",
        config,
        TapTree::unbonding(scripts)?,
        leaf,
        sequence,
        unbonding.outpoint(),
        unbonding.tx_out(),
        destination,
    )
}

/// Spends `prevout` through `leaf` into a single output at `destination`, paying
/// the estimated fee out of the spent value.
#[expect(clippy::too_many_arguments, reason = "one call site per leaf kind")]
pub(crate) fn sweep_leaf(
    kind: &'static str,
    config: &BuildConfig,
    tree: TapTree,
    leaf: &ScriptBuf,
    sequence: Sequence,
    outpoint: OutPoint,
    prevout: &TxOut,
    destination: &Address<NetworkUnchecked>,
) -> Result<PsbtTransactionResult, TxBuildError> {
    config.validate()?;
    let destination = config.check_address(destination)?.script_pubkey();
    let input = leaf_input(outpoint, prevout, tree, leaf, sequence)?;

    let fee = config.fee_model.script_path_spend_fee(
        config.fee_rate,
        1,
        &[template_output(destination.clone())],
    )?;
    let value = deduct_fee(prevout.value, fee)?;
    let output = non_dust_output(destination, value)?;
    assemble(kind, &[input], vec![output], None)
}
