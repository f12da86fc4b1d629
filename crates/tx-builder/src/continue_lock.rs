//! Re-locking a lock output under fresh terms without leaving the protocol.

use bitcoin::{Amount, ScriptBuf, Sequence, TxOut};
use tapstake_coin_select::select_top_up;
use tapstake_primitives::{constants::COVENANT_SPEND_SEQUENCE, validate_lock_height};
use tapstake_script::{SlashableScripts, extract_relative_timelock, taproot::TapTree};
use tracing::debug;

use crate::{
    BuildConfig, FundingSource, LockedOutput, PsbtTransactionResult, TxBuildError,
    psbt::{InputSpec, assemble, deduct_fee, leaf_input, non_dust_output, template_output},
};

/// Extra wallet funds added to the re-locked value.
#[derive(Debug, Clone, Copy)]
pub struct TopUp<'a> {
    pub amount: Amount,
    pub funding: FundingSource<'a>,
}

impl<'a> TopUp<'a> {
    pub fn new(amount: Amount, funding: FundingSource<'a>) -> Self {
        Self { amount, funding }
    }
}

/// Re-locks through the timelock leaf once it has matured.
///
/// `next` may change the lock timelock, operators or owner-facing terms, but must
/// keep the unbonding and slashing leaves of `current`.
pub fn build_continue_timelock_tx(
    config: &BuildConfig,
    current: &SlashableScripts,
    next: &SlashableScripts,
    locked: &LockedOutput,
    top_up: Option<&TopUp<'_>>,
    lock_height: Option<u32>,
) -> Result<PsbtTransactionResult, TxBuildError> {
    if next.unbonding() != current.unbonding() {
        return Err(TxBuildError::ChangedLeaf("unbonding"));
    }
    if next.slashing() != current.slashing() {
        return Err(TxBuildError::ChangedLeaf("slashing"));
    }
    let sequence = Sequence::from_height(extract_relative_timelock(current.timelock())?);
    let input = leaf_input(
        locked.outpoint(),
        locked.tx_out(),
        TapTree::slashable_lock(current)?,
        current.timelock(),
        sequence,
    )?;
    relock("continue_timelock", config, input, locked.value(), next, top_up, lock_height)
}

/// Re-locks through the unbonding leaf, with owner and covenant signatures, without
/// waiting for any timelock.
pub fn build_continue_unbonding_tx(
    config: &BuildConfig,
    current: &SlashableScripts,
    next: &SlashableScripts,
    locked: &LockedOutput,
    top_up: Option<&TopUp<'_>>,
    lock_height: Option<u32>,
) -> Result<PsbtTransactionResult, TxBuildError> {
    let input = leaf_input(
        locked.outpoint(),
        locked.tx_out(),
        TapTree::slashable_lock(current)?,
        current.unbonding(),
        COVENANT_SPEND_SEQUENCE,
    )?;
    relock("continue_unbonding", config, input, locked.value(), next, top_up, lock_height)
}

/// Outputs are `[lock, data-embed, change?]`.
///
/// The estimated fee comes out of the prior value. Top-up inputs only cover the
/// top-up amount, and any sub-dust remainder of theirs is folded into the fee.
fn relock(
    kind: &'static str,
    config: &BuildConfig,
    prior: InputSpec,
    prior_value: Amount,
    next: &SlashableScripts,
    top_up: Option<&TopUp<'_>>,
    lock_height: Option<u32>,
) -> Result<PsbtTransactionResult, TxBuildError> {
    config.validate()?;
    if let Some(height) = lock_height {
        validate_lock_height(height)?;
    }

    let mut outputs = vec![
        template_output(TapTree::slashable_lock(next)?.script_pubkey()),
        template_output(next.data_embed().clone()),
    ];
    let mut inputs = vec![prior];
    let mut funding_scripts: Vec<ScriptBuf> = Vec::new();
    let mut added = Amount::ZERO;

    if let Some(top_up) = top_up {
        let change_address = config.check_address(top_up.funding.change_address)?;
        let selection = select_top_up(top_up.funding.utxos, top_up.amount)?;
        debug!(
            inputs = selection.inputs.len(),
            folded = %selection.fee,
            "selected top-up funding"
        );
        if let Some(change) = selection.change {
            outputs.push(TxOut {
                value: change,
                script_pubkey: change_address.script_pubkey(),
            });
        }
        funding_scripts.extend(selection.inputs.iter().map(|u| u.script_pubkey.clone()));
        inputs.extend(InputSpec::funding(&selection.inputs, &top_up.funding));
        added = top_up.amount;
    }

    let fee = config.fee_model.estimate_mixed_fee(
        config.fee_rate,
        1,
        funding_scripts.iter().map(ScriptBuf::as_script),
        &outputs,
    )?;
    let value = deduct_fee(prior_value, fee)? + added;
    let lock = non_dust_output(outputs[0].script_pubkey.clone(), value)?;
    outputs[0] = lock;

    assemble(kind, &inputs, outputs, lock_height)
}
