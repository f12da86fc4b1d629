//! PSBT assembly shared by the builders.

use bitcoin::{
    Amount, OutPoint, Psbt, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid, Witness,
    absolute::LockTime, psbt::Input, secp256k1::XOnlyPublicKey, taproot::LeafVersion,
    transaction::Version,
};
use tapstake_primitives::{
    Utxo,
    constants::{DUST_LIMIT, FUNDING_SEQUENCE},
    validate_lock_height,
};
use tapstake_script::taproot::{LeafSpend, TapTree};
use tracing::info;

use crate::{FundingSource, LockedOutput, TxBuildError, UnbondingOutput};

/// An unsigned transaction and the fee it pays.
#[derive(Debug, Clone, PartialEq)]
pub struct PsbtTransactionResult {
    pub psbt: Psbt,
    /// Exactly `sum(inputs) - sum(outputs)`.
    pub fee: Amount,
}

impl PsbtTransactionResult {
    pub fn txid(&self) -> Txid {
        self.psbt.unsigned_tx.compute_txid()
    }

    pub fn transaction(&self) -> &Transaction {
        &self.psbt.unsigned_tx
    }

    pub fn locked_output(&self, vout: u32) -> Result<LockedOutput, TxBuildError> {
        LockedOutput::from_result(self, vout)
    }

    pub fn unbonding_output(&self, vout: u32) -> Result<UnbondingOutput, TxBuildError> {
        UnbondingOutput::from_result(self, vout)
    }
}

/// How an input of the transaction under construction is filled in.
#[derive(Debug, Clone)]
pub(crate) enum InputSpec {
    /// Key-path or legacy wallet input.
    Funding {
        utxo: Utxo,
        tap_internal_key: Option<XOnlyPublicKey>,
    },
    /// Script-path spend of a protocol output.
    Leaf {
        outpoint: OutPoint,
        prevout: TxOut,
        sequence: Sequence,
        tree: Box<TapTree>,
        leaf: LeafSpend,
    },
}

impl InputSpec {
    pub(crate) fn funding(utxos: &[Utxo], source: &FundingSource<'_>) -> Vec<Self> {
        utxos
            .iter()
            .cloned()
            .map(|utxo| Self::Funding {
                utxo,
                tap_internal_key: source.tap_internal_key,
            })
            .collect()
    }

    fn value(&self) -> Amount {
        match self {
            Self::Funding { utxo, .. } => utxo.value,
            Self::Leaf { prevout, .. } => prevout.value,
        }
    }

    fn tx_in(&self) -> TxIn {
        let (previous_output, sequence) = match self {
            Self::Funding { utxo, .. } => (utxo.outpoint, FUNDING_SEQUENCE),
            Self::Leaf {
                outpoint, sequence, ..
            } => (*outpoint, *sequence),
        };
        TxIn {
            previous_output,
            script_sig: ScriptBuf::new(),
            sequence,
            witness: Witness::new(),
        }
    }

    fn fill(&self, input: &mut Input) -> Result<(), TxBuildError> {
        match self {
            Self::Funding {
                utxo,
                tap_internal_key,
            } => {
                if utxo.script_pubkey.is_witness_program() {
                    input.witness_utxo = Some(utxo.tx_out());
                } else {
                    let parent = utxo
                        .raw_parent_tx
                        .clone()
                        .ok_or(TxBuildError::MissingParentTx(utxo.outpoint))?;
                    input.non_witness_utxo = Some(parent);
                }
                if utxo.script_pubkey.is_p2tr() {
                    input.tap_internal_key = *tap_internal_key;
                }
                input.redeem_script = utxo.redeem_script.clone();
                input.witness_script = utxo.witness_script.clone();
            }
            Self::Leaf {
                prevout, tree, leaf, ..
            } => {
                input.witness_utxo = Some(prevout.clone());
                input.tap_internal_key = Some(tree.internal_key());
                input.tap_merkle_root = tree.spend_info().merkle_root();
                input.tap_scripts.insert(
                    leaf.control_block.clone(),
                    (leaf.script.clone(), LeafVersion::TapScript),
                );
            }
        }
        Ok(())
    }
}

/// Assembles a version-2 PSBT from `inputs` and `outputs`.
///
/// The fee is derived from the values, so it always reconciles.
pub(crate) fn assemble(
    kind: &'static str,
    inputs: &[InputSpec],
    outputs: Vec<TxOut>,
    lock_height: Option<u32>,
) -> Result<PsbtTransactionResult, TxBuildError> {
    let lock_time = match lock_height {
        Some(height) => LockTime::from_height(validate_lock_height(height)?)
            .map_err(|e| TxBuildError::Psbt(e.to_string()))?,
        None => LockTime::ZERO,
    };

    let total_in: Amount = inputs.iter().map(InputSpec::value).sum();
    let total_out: Amount = outputs.iter().map(|o| o.value).sum();
    let fee = total_in
        .checked_sub(total_out)
        .ok_or(TxBuildError::NotEnoughFunds {
            value: total_in,
            fee: Amount::ZERO,
        })?;

    let tx = Transaction {
        version: Version::TWO,
        lock_time,
        input: inputs.iter().map(InputSpec::tx_in).collect(),
        output: outputs,
    };

    let mut psbt = Psbt::from_unsigned_tx(tx).map_err(|e| TxBuildError::Psbt(e.to_string()))?;
    for (source, input) in inputs.iter().zip(psbt.inputs.iter_mut()) {
        source.fill(input)?;
    }

    let result = PsbtTransactionResult { psbt, fee };
    info!(kind, txid = %result.txid(), %fee, "built transaction");
    Ok(result)
}

/// Output paying `value` to `script_pubkey`, refusing dust.
pub(crate) fn non_dust_output(
    script_pubkey: ScriptBuf,
    value: Amount,
) -> Result<TxOut, TxBuildError> {
    if value.to_sat() < DUST_LIMIT {
        return Err(TxBuildError::DustOutput(value));
    }
    Ok(TxOut {
        value,
        script_pubkey,
    })
}

/// `value - fee`, failing when the fee does not fit.
pub(crate) fn deduct_fee(value: Amount, fee: Amount) -> Result<Amount, TxBuildError> {
    value
        .checked_sub(fee)
        .ok_or(TxBuildError::NotEnoughFunds { value, fee })
}

/// Leaf-spend input for `prev`, checking that `prev` is locked under `tree`.
pub(crate) fn leaf_input(
    outpoint: OutPoint,
    prevout: &TxOut,
    tree: TapTree,
    leaf: &ScriptBuf,
    sequence: Sequence,
) -> Result<InputSpec, TxBuildError> {
    if prevout.script_pubkey != tree.script_pubkey() {
        return Err(TxBuildError::ScriptMismatch(outpoint));
    }
    let leaf = tree.leaf_spend(leaf)?;
    Ok(InputSpec::Leaf {
        outpoint,
        prevout: prevout.clone(),
        sequence,
        tree: Box::new(tree),
        leaf,
    })
}

/// A zero-value template output, used to size fees before values are known.
pub(crate) fn template_output(script_pubkey: ScriptBuf) -> TxOut {
    TxOut {
        value: Amount::ZERO,
        script_pubkey,
    }
}
