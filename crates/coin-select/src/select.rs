//! Greedy largest-first selection.

use bitcoin::{Amount, TxOut};
use tapstake_primitives::{Utxo, ValidationError, constants::DUST_LIMIT, validate_fee_rate};
use tracing::{debug, warn};

use crate::{FeeModel, SelectionError};

/// Outcome of a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Chosen UTXOs, largest first.
    pub inputs: Vec<Utxo>,
    /// Fee charged, including any sub-dust change folded into it.
    pub fee: Amount,
    /// Change to return to the funder, always above dust when present.
    pub change: Option<Amount>,
}

impl Selection {
    pub fn total_input(&self) -> Amount {
        self.inputs.iter().map(|u| u.value).sum()
    }
}

/// Selects UTXOs covering `target` plus the fee of a transaction with `outputs`
/// and a change slot.
///
/// `outputs` are the non-change outputs of the transaction being funded; their
/// values are not added to `target`. The fee estimate is recomputed after every
/// added input, since each input grows the transaction.
pub fn select_utxos(
    utxos: &[Utxo],
    target: Amount,
    fee_rate: u64,
    outputs: &[TxOut],
    model: FeeModel,
) -> Result<Selection, SelectionError> {
    if target == Amount::ZERO {
        return Err(ValidationError::NonPositiveAmount.into());
    }
    validate_fee_rate(fee_rate)?;
    if utxos.is_empty() {
        return Err(SelectionError::UnableToCalculateFee);
    }

    let sorted = sorted_desc(utxos);
    let mut input_sizes = Vec::with_capacity(sorted.len());
    let mut selected = Vec::new();
    let mut total = Amount::ZERO;
    let mut fee = Amount::ZERO;

    for utxo in sorted {
        input_sizes.push(model.input_size(&utxo.script_pubkey));
        total += utxo.value;
        selected.push(utxo);

        fee = estimate_with_change(model, fee_rate, &input_sizes, outputs, total, target)?;
        debug!(inputs = selected.len(), %total, %fee, "selection step");

        if total >= target + fee {
            break;
        }
    }

    let required = target + fee;
    if total < required {
        return Err(SelectionError::InsufficientFunds {
            required,
            available: total,
        });
    }

    let (fee, change) = apply_change_policy(total, target, fee);
    Ok(Selection {
        inputs: selected,
        fee,
        change,
    })
}

/// Selects UTXOs covering exactly `amount`, with no fee of their own.
///
/// Used when the fee is paid from another input of the same transaction. Change
/// still follows the dust policy, so the returned fee is the folded remainder.
pub fn select_top_up(utxos: &[Utxo], amount: Amount) -> Result<Selection, SelectionError> {
    if amount == Amount::ZERO {
        return Err(ValidationError::NonPositiveAmount.into());
    }
    if utxos.is_empty() {
        return Err(SelectionError::UnableToCalculateFee);
    }

    let mut selected = Vec::new();
    let mut total = Amount::ZERO;
    for utxo in sorted_desc(utxos) {
        total += utxo.value;
        selected.push(utxo);
        if total >= amount {
            break;
        }
    }

    if total < amount {
        return Err(SelectionError::InsufficientFunds {
            required: amount,
            available: total,
        });
    }

    let (fee, change) = apply_change_policy(total, amount, Amount::ZERO);
    Ok(Selection {
        inputs: selected,
        fee,
        change,
    })
}

/// Splits the surplus of `total` over `target + fee` into change or extra fee.
///
/// Returns the final fee and the change output value, if any.
pub fn apply_change_policy(total: Amount, target: Amount, fee: Amount) -> (Amount, Option<Amount>) {
    let change = total.checked_sub(target + fee).unwrap_or(Amount::ZERO);
    if change.to_sat() > DUST_LIMIT {
        (fee, Some(change))
    } else {
        if change > Amount::ZERO {
            warn!(%change, "folding sub-dust change into the fee");
        }
        (fee + change, None)
    }
}

/// Fee estimate for the current selection, including the change slot as each model
/// accounts for it.
fn estimate_with_change(
    model: FeeModel,
    fee_rate: u64,
    input_sizes: &[u64],
    outputs: &[TxOut],
    total: Amount,
    target: Amount,
) -> Result<Amount, SelectionError> {
    match model {
        // Always priced with a change output.
        FeeModel::Heuristic => model.fee_from_sizes(fee_rate, input_sizes, outputs, 1),
        // Priced with a change output only when the surplus would be above dust.
        FeeModel::ScriptAware => {
            let fee = model.fee_from_sizes(fee_rate, input_sizes, outputs, 0)?;
            let surplus = total.checked_sub(target + fee).unwrap_or(Amount::ZERO);
            if surplus.to_sat() > DUST_LIMIT {
                model.fee_from_sizes(fee_rate, input_sizes, outputs, 1)
            } else {
                Ok(fee)
            }
        }
    }
}

/// Private copy sorted by value descending, ties broken by outpoint.
fn sorted_desc(utxos: &[Utxo]) -> Vec<Utxo> {
    let mut sorted = utxos.to_vec();
    sorted.sort_by(|a, b| {
        b.value
            .cmp(&a.value)
            .then_with(|| a.outpoint.cmp(&b.outpoint))
    });
    sorted
}
