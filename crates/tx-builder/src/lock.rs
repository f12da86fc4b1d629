//! Funding transition: wallet UTXOs into a lock output.

use bitcoin::{Amount, TxOut};
use tapstake_coin_select::select_utxos;
use tapstake_primitives::{ValidationError, validate_lock_height};
use tapstake_script::{Generation, ScriptSet, taproot::TapTree};
use tracing::debug;

use crate::{
    BuildConfig, FundingSource, PsbtTransactionResult, TxBuildError,
    psbt::{InputSpec, assemble, non_dust_output},
};

/// Index of the lock output in every transaction that creates one.
pub const LOCK_OUTPUT_INDEX: u32 = 0;

/// Locks `amount` under the lock tree of `scripts`.
///
/// Outputs are `[lock, data-embed?, change?]`. Funding inputs signal RBF and carry
/// no relative locktime. `lock_height`, when given, must be a block height.
pub fn build_lock_tx(
    config: &BuildConfig,
    scripts: &ScriptSet,
    amount: Amount,
    funding: &FundingSource<'_>,
    lock_height: Option<u32>,
) -> Result<PsbtTransactionResult, TxBuildError> {
    config.validate()?;
    if amount == Amount::ZERO {
        return Err(ValidationError::NonPositiveAmount.into());
    }
    if let Some(height) = lock_height {
        validate_lock_height(height)?;
    }
    let change_address = config.check_address(funding.change_address)?;

    let tree = TapTree::lock(scripts)?;
    let mut outputs = vec![non_dust_output(tree.script_pubkey(), amount)?];
    if let Some(embed) = scripts.data_embed() {
        outputs.push(TxOut {
            value: Amount::ZERO,
            script_pubkey: embed.clone(),
        });
    }

    let selection = select_utxos(
        funding.utxos,
        amount,
        config.fee_rate,
        &outputs,
        config.fee_model,
    )?;
    debug!(
        inputs = selection.inputs.len(),
        fee = %selection.fee,
        change = ?selection.change,
        "selected lock funding"
    );
    if let Some(change) = selection.change {
        outputs.push(TxOut {
            value: change,
            script_pubkey: change_address.script_pubkey(),
        });
    }

    let inputs = InputSpec::funding(&selection.inputs, funding);
    assemble("lock", &inputs, outputs, lock_height)
}

/// Lock transaction of the bridge generation.
///
/// Identical to [`build_lock_tx`], restricted to bridge script sets so the
/// data-embed output (when present) binds the external-chain address.
pub fn build_pre_deposit_tx(
    config: &BuildConfig,
    scripts: &ScriptSet,
    amount: Amount,
    funding: &FundingSource<'_>,
    lock_height: Option<u32>,
) -> Result<PsbtTransactionResult, TxBuildError> {
    if scripts.generation() != Generation::Bridge {
        return Err(TxBuildError::UnsupportedGeneration {
            operation: "pre-deposit",
            generation: scripts.generation(),
        });
    }
    build_lock_tx(config, scripts, amount, funding, lock_height)
}
