//! Recovers the relative timelock committed in a timelock leaf.
//!
//! The operand sits at instruction index 2 of
//! `<pk> OP_CHECKSIGVERIFY <n> OP_CHECKSEQUENCEVERIFY`. Small values are encoded as
//! `OP_1`..`OP_16`, larger ones as a minimal little-endian script number.

use bitcoin::{
    Script,
    opcodes::{
        Opcode,
        all::{OP_CSV, OP_PUSHNUM_1, OP_PUSHNUM_16},
    },
    script::Instruction,
};
use tapstake_primitives::validate_relative_timelock;

use crate::ScriptError;

const TIMELOCK_OPERAND_INDEX: usize = 2;

/// Largest script number encoding accepted for the operand.
const MAX_SCRIPTNUM_LEN: usize = 5;

/// Reads the relative timelock out of a timelock script.
pub fn extract_relative_timelock(script: &Script) -> Result<u16, ScriptError> {
    let instructions = script
        .instructions()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ScriptError::Decompile(e.to_string()))?;

    match instructions.get(TIMELOCK_OPERAND_INDEX + 1) {
        Some(Instruction::Op(op)) if *op == OP_CSV => {}
        _ => {
            return Err(ScriptError::NotTimelockScript(
                "expected OP_CHECKSEQUENCEVERIFY after the timelock operand",
            ))
        }
    }

    let value = match instructions.get(TIMELOCK_OPERAND_INDEX) {
        Some(Instruction::PushBytes(bytes)) => decode_script_num(bytes.as_bytes())?,
        Some(Instruction::Op(op)) => small_int_value(*op).ok_or_else(|| {
            ScriptError::InvalidTimelockOperand(format!("unexpected opcode {op}"))
        })?,
        None => return Err(ScriptError::NotTimelockScript("missing timelock operand")),
    };

    let blocks = u32::try_from(value)
        .map_err(|_| ScriptError::InvalidTimelockOperand(format!("negative value {value}")))?;
    Ok(validate_relative_timelock(blocks)?)
}

/// Value of `OP_1`..`OP_16`. The low nibble of `OP_16` is zero, so it wraps to 16.
fn small_int_value(op: Opcode) -> Option<i64> {
    let code = op.to_u8();
    if !(OP_PUSHNUM_1.to_u8()..=OP_PUSHNUM_16.to_u8()).contains(&code) {
        return None;
    }
    match code % 16 {
        0 => Some(16),
        n => Some(n as i64),
    }
}

/// Decodes a minimally encoded script number.
fn decode_script_num(bytes: &[u8]) -> Result<i64, ScriptError> {
    if bytes.is_empty() {
        return Ok(0);
    }
    if bytes.len() > MAX_SCRIPTNUM_LEN {
        return Err(ScriptError::InvalidTimelockOperand(format!(
            "{}-byte script number",
            bytes.len()
        )));
    }
    // A trailing 0x00/0x80 is only allowed when the next byte needs its sign bit.
    let last = bytes[bytes.len() - 1];
    if last & 0x7f == 0 && (bytes.len() == 1 || bytes[bytes.len() - 2] & 0x80 == 0) {
        return Err(ScriptError::InvalidTimelockOperand(
            "non-minimal script number".to_string(),
        ));
    }

    let mut value = 0i64;
    for (i, b) in bytes.iter().enumerate() {
        value |= (*b as i64) << (8 * i);
    }
    if last & 0x80 != 0 {
        value &= !(0x80i64 << (8 * (bytes.len() - 1)));
        value = -value;
    }
    Ok(value)
}
