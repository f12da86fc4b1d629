//! Transaction size models used to turn a fee rate into an absolute fee.
//!
//! Neither model serializes a transaction. Both are linear in the number of inputs
//! and outputs, which keeps selection deterministic and cheap.

use std::iter;

use bitcoin::{Amount, Script, TxOut};
use serde::{Deserialize, Serialize};

use crate::SelectionError;

/// Sizes used by [`FeeModel::Heuristic`].
pub mod heuristic {
    /// Assumed size of any input.
    pub const INPUT_SIZE: u64 = 180;
    /// Assumed size of any output.
    pub const OUTPUT_SIZE: u64 = 34;
    /// Version, locktime and counts.
    pub const TX_OVERHEAD: u64 = 10;
    /// Extra bytes charged once when an `OP_RETURN` output is present.
    pub const OP_RETURN_SIZE: u64 = 40;
}

/// Virtual sizes used by [`FeeModel::ScriptAware`].
pub mod script_aware {
    pub const P2WPKH_INPUT_SIZE: u64 = 68;
    pub const P2TR_INPUT_SIZE: u64 = 58;
    /// Anything that is not a recognised segwit template is priced as legacy.
    pub const DEFAULT_INPUT_SIZE: u64 = 180;
    /// Largest non-legacy output (P2TR / P2WSH).
    pub const MAX_NON_LEGACY_OUTPUT_SIZE: u64 = 43;
    /// Size of the 8-byte value field of an output.
    pub const OUTPUT_VALUE_SIZE: u64 = 8;
    /// Varint in front of an `OP_RETURN` script.
    pub const OUTPUT_SCRIPT_LEN_SIZE: u64 = 1;
    pub const TX_OVERHEAD: u64 = 11;
    /// Witness of a script-path spend over a key-path spend: control block and leaf.
    pub const SCRIPT_PATH_EXTRA_SIZE: u64 = 17;
    /// Fee rates at or below this get [`LOW_RATE_BUFFER`] added.
    pub const LOW_RATE_THRESHOLD: u64 = 2;
    /// Compensates for relay minimums the linear model under-predicts at low rates.
    pub const LOW_RATE_BUFFER: u64 = 30;
}

/// Fee-size model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeModel {
    /// Fixed sizes for every input and output regardless of script type.
    Heuristic,
    /// Sizes derived from the input and output script templates.
    #[default]
    ScriptAware,
}

impl FeeModel {
    /// Size charged for spending an output locked by `script_pubkey` through its key path.
    pub fn input_size(&self, script_pubkey: &Script) -> u64 {
        match self {
            Self::Heuristic => heuristic::INPUT_SIZE,
            Self::ScriptAware => {
                if script_pubkey.is_p2wpkh() {
                    script_aware::P2WPKH_INPUT_SIZE
                } else if script_pubkey.is_p2tr() {
                    script_aware::P2TR_INPUT_SIZE
                } else {
                    script_aware::DEFAULT_INPUT_SIZE
                }
            }
        }
    }

    /// Size charged for an output locked by `script_pubkey`.
    pub fn output_size(&self, script_pubkey: &Script) -> u64 {
        match self {
            Self::Heuristic => heuristic::OUTPUT_SIZE,
            Self::ScriptAware => {
                if script_pubkey.is_op_return() {
                    script_pubkey.len() as u64
                        + script_aware::OUTPUT_VALUE_SIZE
                        + script_aware::OUTPUT_SCRIPT_LEN_SIZE
                } else {
                    script_aware::MAX_NON_LEGACY_OUTPUT_SIZE
                }
            }
        }
    }

    /// Size charged for a change output not yet materialised.
    pub fn change_output_size(&self) -> u64 {
        match self {
            Self::Heuristic => heuristic::OUTPUT_SIZE,
            Self::ScriptAware => script_aware::MAX_NON_LEGACY_OUTPUT_SIZE,
        }
    }

    /// Fee of a transaction spending `input_scripts` into `outputs`.
    pub fn estimate_fee<'a>(
        &self,
        fee_rate: u64,
        input_scripts: impl IntoIterator<Item = &'a Script>,
        outputs: &[TxOut],
    ) -> Result<Amount, SelectionError> {
        self.estimate_mixed_fee(fee_rate, 0, input_scripts, outputs)
    }

    /// Fee of spending `inputs` taproot outputs through a script path into `outputs`.
    pub fn script_path_spend_fee(
        &self,
        fee_rate: u64,
        inputs: usize,
        outputs: &[TxOut],
    ) -> Result<Amount, SelectionError> {
        self.estimate_mixed_fee(fee_rate, inputs, [], outputs)
    }

    /// Fee of a transaction with `script_path_inputs` taproot script-path spends
    /// followed by key-path spends of `input_scripts`.
    pub fn estimate_mixed_fee<'a>(
        &self,
        fee_rate: u64,
        script_path_inputs: usize,
        input_scripts: impl IntoIterator<Item = &'a Script>,
        outputs: &[TxOut],
    ) -> Result<Amount, SelectionError> {
        let script_path_size = match self {
            Self::Heuristic => heuristic::INPUT_SIZE,
            Self::ScriptAware => {
                script_aware::P2TR_INPUT_SIZE + script_aware::SCRIPT_PATH_EXTRA_SIZE
            }
        };
        let input_sizes = iter::repeat_n(script_path_size, script_path_inputs)
            .chain(input_scripts.into_iter().map(|s| self.input_size(s)))
            .collect::<Vec<_>>();
        self.fee_from_sizes(fee_rate, &input_sizes, outputs, 0)
    }

    /// Core size formula over per-input sizes, declared outputs and `extra_outputs`
    /// unmaterialised change slots.
    ///
    /// Fails when the fee would exceed [`Amount::MAX_MONEY`].
    pub(crate) fn fee_from_sizes(
        &self,
        fee_rate: u64,
        input_sizes: &[u64],
        outputs: &[TxOut],
        extra_outputs: u64,
    ) -> Result<Amount, SelectionError> {
        let inputs_size: u64 = input_sizes.iter().sum();
        let outputs_size: u64 = outputs
            .iter()
            .map(|o| self.output_size(&o.script_pubkey))
            .sum::<u64>()
            + extra_outputs * self.change_output_size();

        let sats = match self {
            Self::Heuristic => {
                let op_return = if outputs.iter().any(|o| o.script_pubkey.is_op_return()) {
                    heuristic::OP_RETURN_SIZE
                } else {
                    0
                };
                let size = inputs_size
                    + outputs_size
                    + heuristic::TX_OVERHEAD
                    + input_sizes.len() as u64
                    + op_return;
                size.checked_mul(fee_rate)
            }
            Self::ScriptAware => {
                let size = inputs_size + outputs_size + script_aware::TX_OVERHEAD;
                let buffer = if fee_rate <= script_aware::LOW_RATE_THRESHOLD {
                    script_aware::LOW_RATE_BUFFER
                } else {
                    0
                };
                size
                    .checked_mul(fee_rate)
                    .and_then(|sats| sats.checked_add(buffer))
            }
        };
        sats.map(Amount::from_sat)
            .filter(|fee| *fee <= Amount::MAX_MONEY)
            .ok_or(SelectionError::FeeOverflow(fee_rate))
    }
}

#[cfg(test)]
mod tests {
    use bitcoin::{
        ScriptBuf,
        opcodes::all::OP_RETURN,
        script::{Builder, PushBytesBuf},
    };
    use tapstake_test_utils::utxo::{p2tr_utxo, p2wpkh_utxo, unknown_script_utxo};

    use super::*;

    fn p2tr_out(value: u64) -> TxOut {
        TxOut {
            value: Amount::from_sat(value),
            script_pubkey: p2tr_utxo(9, 1).script_pubkey,
        }
    }

    fn op_return_out(payload_len: usize) -> TxOut {
        let data = PushBytesBuf::try_from(vec![0u8; payload_len]).unwrap();
        TxOut {
            value: Amount::ZERO,
            script_pubkey: Builder::new()
                .push_opcode(OP_RETURN)
                .push_slice(data)
                .into_script(),
        }
    }

    #[test]
    fn test_heuristic_single_input_single_output() {
        let utxo = p2wpkh_utxo(0, 100_000_000);
        let fee = FeeModel::Heuristic
            .estimate_fee(10, [utxo.script_pubkey.as_script()], &[p2tr_out(1)])
            .unwrap();
        // (180 + 34 + 10 + 1) * 10
        assert_eq!(fee, Amount::from_sat(2_250));
        assert_eq!(
            FeeModel::Heuristic.script_path_spend_fee(10, 1, &[p2tr_out(1)]),
            Ok(fee)
        );
    }

    #[test]
    fn test_heuristic_op_return_surcharge() {
        let utxo = p2wpkh_utxo(0, 1);
        let outputs = [p2tr_out(1), op_return_out(71)];
        let fee = FeeModel::Heuristic.estimate_fee(1, [utxo.script_pubkey.as_script()], &outputs);
        assert_eq!(fee, Ok(Amount::from_sat(180 + 2 * 34 + 10 + 1 + 40)));
    }

    #[test]
    fn test_script_aware_input_templates() {
        let model = FeeModel::ScriptAware;
        assert_eq!(model.input_size(&p2wpkh_utxo(0, 1).script_pubkey), 68);
        assert_eq!(model.input_size(&p2tr_utxo(0, 1).script_pubkey), 58);
        assert_eq!(model.input_size(&unknown_script_utxo(0, 1).script_pubkey), 180);
    }

    #[test]
    fn test_script_aware_op_return_size() {
        let out = op_return_out(71);
        // OP_RETURN + OP_PUSHBYTES_71 + 71 bytes, then value and length varint
        assert_eq!(FeeModel::ScriptAware.output_size(&out.script_pubkey), 73 + 8 + 1);
        assert_eq!(
            FeeModel::ScriptAware.output_size(&ScriptBuf::from_bytes(vec![OP_RETURN.to_u8()])),
            1 + 8 + 1
        );
    }

    #[test]
    fn test_script_aware_low_rate_buffer() {
        let model = FeeModel::ScriptAware;
        let outputs = [p2tr_out(1)];
        assert_eq!(
            model.script_path_spend_fee(2, 1, &outputs),
            Ok(Amount::from_sat((58 + 17 + 43 + 11) * 2 + 30))
        );
        assert_eq!(
            model.script_path_spend_fee(3, 1, &outputs),
            Ok(Amount::from_sat((58 + 17 + 43 + 11) * 3))
        );
    }

    #[test]
    fn test_fee_beyond_supply_is_rejected() {
        let outputs = [p2tr_out(1)];
        for model in [FeeModel::Heuristic, FeeModel::ScriptAware] {
            for fee_rate in [u64::MAX, u64::MAX / 100, Amount::MAX_MONEY.to_sat()] {
                assert_eq!(
                    model.script_path_spend_fee(fee_rate, 1, &outputs),
                    Err(SelectionError::FeeOverflow(fee_rate)),
                    "{model:?} at {fee_rate}"
                );
            }
        }
        // largest heuristic rate whose fee stays within the supply: 225 vbytes
        let max_rate = Amount::MAX_MONEY.to_sat() / 225;
        assert_eq!(
            FeeModel::Heuristic.script_path_spend_fee(max_rate, 1, &outputs),
            Ok(Amount::from_sat(max_rate * 225))
        );
    }

    #[test]
    fn test_fee_model_serde() {
        let json = serde_json::to_string(&FeeModel::ScriptAware).unwrap();
        assert_eq!(json, "\"script_aware\"");
        let model: FeeModel = serde_json::from_str("\"heuristic\"").unwrap();
        assert_eq!(model, FeeModel::Heuristic);
    }
}
