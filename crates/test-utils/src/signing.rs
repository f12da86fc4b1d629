//! Signers for the script-path inputs of unsigned PSBTs.

use anyhow::{Context, bail};
use bitcoin::{
    Psbt, ScriptBuf, TapSighashType, TxOut,
    sighash::{Prevouts, SighashCache},
    taproot::{self, LeafVersion, TapLeafHash},
};
use secp256k1::{Keypair, Message, SECP256K1, XOnlyPublicKey};

/// The single leaf script a builder attached to `input_index`.
pub fn input_leaf(psbt: &Psbt, input_index: usize) -> anyhow::Result<ScriptBuf> {
    let input = psbt
        .inputs
        .get(input_index)
        .with_context(|| format!("psbt has no input {input_index}"))?;
    let mut leaves = input.tap_scripts.values();
    match (leaves.next(), leaves.next()) {
        (Some((script, LeafVersion::TapScript)), None) => Ok(script.clone()),
        (None, _) => bail!("input {input_index} carries no leaf script"),
        _ => bail!("input {input_index} carries more than one leaf script"),
    }
}

fn leaf_sighash(psbt: &Psbt, input_index: usize) -> anyhow::Result<Message> {
    let prevouts = psbt
        .inputs
        .iter()
        .enumerate()
        .map(|(i, input)| {
            input
                .witness_utxo
                .clone()
                .with_context(|| format!("input {i} has no witness utxo"))
        })
        .collect::<anyhow::Result<Vec<TxOut>>>()?;
    let leaf_hash = TapLeafHash::from_script(&input_leaf(psbt, input_index)?, LeafVersion::TapScript);

    let sighash = SighashCache::new(&psbt.unsigned_tx).taproot_script_spend_signature_hash(
        input_index,
        &Prevouts::All(&prevouts),
        leaf_hash,
        TapSighashType::Default,
    )?;
    Ok(Message::from(sighash))
}

/// Signs the leaf of `input_index` with an untweaked key, as the leaf commits to raw keys.
pub fn sign_leaf(
    psbt: &Psbt,
    input_index: usize,
    keypair: &Keypair,
) -> anyhow::Result<taproot::Signature> {
    let msg = leaf_sighash(psbt, input_index)?;
    Ok(taproot::Signature {
        signature: SECP256K1.sign_schnorr_no_aux_rand(&msg, keypair),
        sighash_type: TapSighashType::Default,
    })
}

pub fn verify_leaf_signature(
    psbt: &Psbt,
    input_index: usize,
    signature: &taproot::Signature,
    pubkey: &XOnlyPublicKey,
) -> anyhow::Result<()> {
    let msg = leaf_sighash(psbt, input_index)?;
    SECP256K1
        .verify_schnorr(&signature.signature, &msg, pubkey)
        .context("leaf signature does not verify")
}
