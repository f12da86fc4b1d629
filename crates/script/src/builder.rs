//! Opcode-level builders for the individual clauses of the leaf scripts.
//!
//! Operand positions are significant: the relative timelock is later read back from
//! index 2 of the timelock script, see [`extract_relative_timelock`](crate::extract_relative_timelock).

use bitcoin::{
    ScriptBuf,
    blockdata::script,
    opcodes::all::{
        OP_CHECKSIG, OP_CHECKSIGADD, OP_CHECKSIGVERIFY, OP_CSV, OP_NUMEQUAL, OP_NUMEQUALVERIFY,
    },
    secp256k1::XOnlyPublicKey,
};

use crate::ScriptError;

/// `<pk> OP_CHECKSIG` or `<pk> OP_CHECKSIGVERIFY`.
pub fn build_single_key_script(pk: &XOnlyPublicKey, verify: bool) -> ScriptBuf {
    let op = if verify { OP_CHECKSIGVERIFY } else { OP_CHECKSIG };
    script::Builder::new()
        .push_x_only_key(pk)
        .push_opcode(op)
        .into_script()
}

/// `k`-of-`n` clause over `pks` using `OP_CHECKSIGADD` accumulation.
///
/// Keys are sorted ascending by their serialized bytes. A single key collapses to
/// [`build_single_key_script`].
pub fn build_multi_key_script(
    pks: &[XOnlyPublicKey],
    threshold: u32,
    verify: bool,
) -> Result<ScriptBuf, ScriptError> {
    if pks.is_empty() {
        return Err(ScriptError::EmptyKeySet);
    }
    if threshold == 0 || threshold as usize > pks.len() {
        return Err(ScriptError::InvalidThreshold {
            threshold,
            keys: pks.len(),
        });
    }
    if pks.len() == 1 {
        return Ok(build_single_key_script(&pks[0], verify));
    }

    let sorted = sort_keys(pks)?;

    let mut builder = script::Builder::new()
        .push_x_only_key(&sorted[0])
        .push_opcode(OP_CHECKSIG);
    for pk in &sorted[1..] {
        builder = builder.push_x_only_key(pk).push_opcode(OP_CHECKSIGADD);
    }

    let op = if verify { OP_NUMEQUALVERIFY } else { OP_NUMEQUAL };
    Ok(builder
        .push_int(threshold as i64)
        .push_opcode(op)
        .into_script())
}

/// `<pk> OP_CHECKSIGVERIFY <timelock> OP_CHECKSEQUENCEVERIFY`.
///
/// The timelock is pushed as a minimal script number, so 1..=16 become `OP_1`..`OP_16`.
pub fn build_timelock_script(pk: &XOnlyPublicKey, timelock: u16) -> ScriptBuf {
    script::Builder::new()
        .push_x_only_key(pk)
        .push_opcode(OP_CHECKSIGVERIFY)
        .push_int(timelock as i64)
        .push_opcode(OP_CSV)
        .into_script()
}

/// Concatenates already compiled clauses into one script.
pub fn concat_scripts(parts: &[&ScriptBuf]) -> ScriptBuf {
    let mut bytes = Vec::with_capacity(parts.iter().map(|s| s.len()).sum());
    for part in parts {
        bytes.extend_from_slice(part.as_bytes());
    }
    ScriptBuf::from_bytes(bytes)
}

/// Sorts keys ascending by serialized bytes, rejecting duplicates.
pub fn sort_keys(pks: &[XOnlyPublicKey]) -> Result<Vec<XOnlyPublicKey>, ScriptError> {
    let mut sorted = pks.to_vec();
    sorted.sort_by_key(|pk| pk.serialize());
    if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(ScriptError::DuplicateKey(pair[0]));
    }
    Ok(sorted)
}
