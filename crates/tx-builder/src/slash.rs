//! Slashing of a lock or unbonding output.
//!
//! A slashing transaction has two outputs: the slashed share to the slashing
//! destination, and the remainder less the minimum fee back to the owner under a
//! single unbonding-timelock leaf. The owner, one operator and a covenant quorum
//! must all sign.

use bitcoin::{Amount, OutPoint, TxOut};
use tapstake_params::SlashingParams;
use tapstake_primitives::{ValidationError, constants::COVENANT_SPEND_SEQUENCE};
use tapstake_script::{SlashableScripts, taproot::TapTree};
use tracing::debug;

use crate::{
    BuildConfig, LockedOutput, PsbtTransactionResult, TxBuildError, UnbondingOutput,
    psbt::{assemble, leaf_input, non_dust_output},
};

/// Index of the slashed output.
pub const SLASHED_OUTPUT_INDEX: u32 = 0;

/// Index of the owner's change output.
pub const SLASHING_CHANGE_OUTPUT_INDEX: u32 = 1;

/// Slashes a lock output through its slashing leaf.
pub fn build_slash_timelock_tx(
    config: &BuildConfig,
    scripts: &SlashableScripts,
    locked: &LockedOutput,
    slashing: &SlashingParams,
) -> Result<PsbtTransactionResult, TxBuildError> {
    slash(
        "slash_timelock",
        config,
        scripts,
        TapTree::slashable_lock(scripts)?,
        locked.outpoint(),
        locked.tx_out(),
        slashing,
    )
}

/// Slashes an unbonding output through its slashing leaf.
pub fn build_slash_unbonded_tx(
    config: &BuildConfig,
    scripts: &SlashableScripts,
    unbonding: &UnbondingOutput,
    slashing: &SlashingParams,
) -> Result<PsbtTransactionResult, TxBuildError> {
    slash(
        "slash_unbonded",
        config,
        scripts,
        TapTree::unbonding(scripts)?,
        unbonding.outpoint(),
        unbonding.tx_out(),
        slashing,
    )
}

/// Slashed share and owner change of `value`.
///
/// The slashed share is `value * rate` rounded to the nearest satoshi.
pub fn slashing_split(
    value: Amount,
    slashing: &SlashingParams,
) -> Result<(Amount, Amount), TxBuildError> {
    let rate = slashing.rate;
    if !(rate > 0.0 && rate < 1.0) {
        return Err(TxBuildError::InvalidSlashingRate(rate));
    }
    if slashing.min_fee == Amount::ZERO {
        return Err(ValidationError::NonPositiveFee.into());
    }

    let slashed = Amount::from_sat((value.to_sat() as f64 * rate).round() as u64);
    let change = value
        .checked_sub(slashed)
        .and_then(|rest| rest.checked_sub(slashing.min_fee))
        .filter(|change| *change > Amount::ZERO && slashed > Amount::ZERO)
        .ok_or(TxBuildError::NotEnoughFundsToSlash {
            value,
            slashed,
            min_fee: slashing.min_fee,
        })?;
    Ok((slashed, change))
}

fn slash(
    kind: &'static str,
    config: &BuildConfig,
    scripts: &SlashableScripts,
    tree: TapTree,
    outpoint: OutPoint,
    prevout: &TxOut,
    slashing: &SlashingParams,
) -> Result<PsbtTransactionResult, TxBuildError> {
    let (slashed, change) = slashing_split(prevout.value, slashing)?;
    let destination = config.check_address(&slashing.destination)?;
    debug!(%slashed, %change, min_fee = %slashing.min_fee, "slashing split");

    let input = leaf_input(
        outpoint,
        prevout,
        tree,
        scripts.slashing(),
        COVENANT_SPEND_SEQUENCE,
    )?;
    let outputs = vec![
        TxOut {
            value: slashed,
            script_pubkey: destination.script_pubkey(),
        },
        non_dust_output(TapTree::slashing_change(scripts)?.script_pubkey(), change)?,
    ];
    assemble(kind, &[input], outputs, None)
}
