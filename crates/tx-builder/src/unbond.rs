//! Cooperative exit of a lock output into the unbonding output.

use bitcoin::Amount;
use tapstake_primitives::{ValidationError, constants::COVENANT_SPEND_SEQUENCE, validate_fee_rate};
use tapstake_script::{SlashableScripts, taproot::TapTree};

use crate::{
    BuildConfig, LockedOutput, PsbtTransactionResult, TxBuildError,
    psbt::{assemble, deduct_fee, leaf_input, non_dust_output, template_output},
};

/// Index of the unbonding output in the unbonding transaction.
pub const UNBONDING_OUTPUT_INDEX: u32 = 0;

/// Fee policy of an unbonding transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnbondingFee {
    /// A fee fixed by the caller, e.g. one agreed with the covenant committee.
    Manual(Amount),
    /// Estimated by the configured fee model at this rate (sat/vB).
    Rate(u64),
}

/// Spends the unbonding leaf of a lock output into the unbonding tree.
///
/// Requires the owner and a covenant quorum to sign.
pub fn build_unbonding_tx(
    config: &BuildConfig,
    scripts: &SlashableScripts,
    locked: &LockedOutput,
    fee: UnbondingFee,
) -> Result<PsbtTransactionResult, TxBuildError> {
    let input = leaf_input(
        locked.outpoint(),
        locked.tx_out(),
        TapTree::slashable_lock(scripts)?,
        scripts.unbonding(),
        COVENANT_SPEND_SEQUENCE,
    )?;
    let unbonding_spk = TapTree::unbonding(scripts)?.script_pubkey();

    let fee = match fee {
        UnbondingFee::Manual(fee) if fee == Amount::ZERO => {
            return Err(ValidationError::NonPositiveFee.into());
        }
        UnbondingFee::Manual(fee) => fee,
        UnbondingFee::Rate(fee_rate) => {
            validate_fee_rate(fee_rate)?;
            config.fee_model.script_path_spend_fee(
                fee_rate,
                1,
                &[template_output(unbonding_spk.clone())],
            )?
        }
    };

    let value = deduct_fee(locked.value(), fee)?;
    let output = non_dust_output(unbonding_spk, value)?;
    assemble("unbonding", &[input], vec![output], None)
}
