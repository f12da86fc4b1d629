//! Covenant witness composition.
//!
//! Leaf scripts check covenant signatures with `OP_CHECKSIGADD` over keys sorted
//! ascending. The first key checked pops the top of the stack, so the signatures
//! have to be laid out descending: the last covenant item sits right under the
//! caller's own witness items.

use std::{cmp::Reverse, collections::HashMap};

use bitcoin::{Psbt, Witness, secp256k1::XOnlyPublicKey, taproot::Signature};
use serde::{Deserialize, Serialize};
use tapstake_primitives::parse_xonly_key_hex;
use tracing::{debug, warn};

use crate::WitnessError;

/// A covenant signature as handed over by a committee member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CovenantSignature {
    /// Hex of the x-only signing key.
    pub pk_hex: String,
    /// Hex of the 64- or 65-byte BIP340 signature.
    pub sig_hex: String,
}

impl CovenantSignature {
    pub fn new(pk: &XOnlyPublicKey, sig: &Signature) -> Self {
        Self {
            pk_hex: hex::encode(pk.serialize()),
            sig_hex: hex::encode(sig.to_vec()),
        }
    }

    fn parse(&self) -> Result<(XOnlyPublicKey, Signature), WitnessError> {
        let pk = parse_xonly_key_hex(&self.pk_hex)?;
        let raw = hex::decode(&self.sig_hex)
            .map_err(|e| WitnessError::InvalidSignatureHex(e.to_string()))?;
        let sig =
            Signature::from_slice(&raw).map_err(|e| WitnessError::InvalidSignature(e.to_string()))?;
        Ok((pk, sig))
    }
}

/// Covenant keys in witness order: descending by serialized bytes.
pub fn witness_key_order(covenant_keys: &[XOnlyPublicKey]) -> Vec<XOnlyPublicKey> {
    let mut keys = covenant_keys.to_vec();
    keys.sort_by_key(|pk| Reverse(pk.serialize()));
    keys
}

/// Builds `covenant items || original items`.
///
/// Every configured covenant key gets one item: its signature if present in
/// `signatures`, otherwise an empty placeholder.
pub fn compose_covenant_witness(
    original: &Witness,
    covenant_keys: &[XOnlyPublicKey],
    signatures: &[CovenantSignature],
) -> Result<Witness, WitnessError> {
    let mut by_key = HashMap::with_capacity(signatures.len());
    for entry in signatures {
        let (pk, sig) = entry.parse()?;
        by_key.insert(pk, sig);
    }

    let mut witness = Witness::new();
    let mut signed = 0;
    for pk in witness_key_order(covenant_keys) {
        match by_key.remove(&pk) {
            Some(sig) => {
                witness.push(sig.to_vec());
                signed += 1;
            }
            None => witness.push(Vec::<u8>::new()),
        }
    }
    if !by_key.is_empty() {
        warn!(
            ignored = by_key.len(),
            "signatures from keys outside the covenant set"
        );
    }
    for item in original.iter() {
        witness.push(item);
    }

    debug!(
        covenants = covenant_keys.len(),
        signed,
        items = witness.len(),
        "composed covenant witness"
    );
    Ok(witness)
}

/// Finalizes a script-path input of `psbt`.
///
/// The final witness is `covenant items || owner_items || leaf script || control block`,
/// with the leaf taken from the input's single `tap_scripts` entry.
pub fn finalize_input(
    psbt: &mut Psbt,
    input_index: usize,
    owner_items: &[Vec<u8>],
    covenant_keys: &[XOnlyPublicKey],
    signatures: &[CovenantSignature],
) -> Result<(), WitnessError> {
    let len = psbt.inputs.len();
    let input = psbt
        .inputs
        .get_mut(input_index)
        .ok_or(WitnessError::InputOutOfBounds {
            index: input_index,
            len,
        })?;

    if input.tap_scripts.len() != 1 {
        return Err(WitnessError::LeafScriptCount(
            input_index,
            input.tap_scripts.len(),
        ));
    }
    let Some((control_block, (leaf_script, _))) = input.tap_scripts.pop_first() else {
        return Err(WitnessError::LeafScriptCount(input_index, 0));
    };

    let mut original = Witness::new();
    for item in owner_items {
        original.push(item);
    }
    original.push(leaf_script.as_bytes());
    original.push(control_block.serialize());

    input.final_script_witness = Some(compose_covenant_witness(
        &original,
        covenant_keys,
        signatures,
    )?);
    input.tap_internal_key = None;
    input.tap_merkle_root = None;
    input.tap_script_sigs.clear();
    input.tap_key_origins.clear();
    Ok(())
}
