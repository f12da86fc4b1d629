//! Fixture UTXOs.

use bitcoin::{
    Amount, CompressedPublicKey, Network, OutPoint, ScriptBuf, Transaction, TxOut, Txid,
    absolute::LockTime, hashes::Hash, transaction::Version,
};
use tapstake_primitives::Utxo;

use crate::keys::{p2tr_address, p2wpkh_address, public_key};

/// A P2WPKH UTXO worth `value` sats, distinguished by `seed`.
pub fn p2wpkh_utxo(seed: u8, value: u64) -> Utxo {
    Utxo::new(
        outpoint(seed),
        Amount::from_sat(value),
        p2wpkh_address(seed, Network::Regtest)
            .assume_checked()
            .script_pubkey(),
    )
}

/// A key-path P2TR UTXO worth `value` sats, distinguished by `seed`.
pub fn p2tr_utxo(seed: u8, value: u64) -> Utxo {
    Utxo::new(
        outpoint(seed),
        Amount::from_sat(value),
        p2tr_address(seed, Network::Regtest)
            .assume_checked()
            .script_pubkey(),
    )
}

/// A legacy P2PKH UTXO. It carries no parent transaction, so it cannot be spent
/// through a PSBT until one is attached.
pub fn p2pkh_utxo(seed: u8, value: u64) -> Utxo {
    Utxo::new(outpoint(seed), Amount::from_sat(value), p2pkh_script(seed))
}

/// A P2PKH UTXO created as the only output of its attached parent transaction.
pub fn p2pkh_utxo_with_parent(seed: u8, value: u64) -> Utxo {
    let parent = Transaction {
        version: Version::TWO,
        lock_time: LockTime::from_consensus(seed as u32),
        input: vec![],
        output: vec![TxOut {
            value: Amount::from_sat(value),
            script_pubkey: p2pkh_script(seed),
        }],
    };
    let outpoint = OutPoint {
        txid: parent.compute_txid(),
        vout: 0,
    };
    Utxo::new(outpoint, Amount::from_sat(value), p2pkh_script(seed)).with_raw_parent_tx(parent)
}

fn p2pkh_script(seed: u8) -> ScriptBuf {
    ScriptBuf::new_p2pkh(&CompressedPublicKey(public_key(seed)).pubkey_hash())
}

/// A UTXO whose locking script matches no known template.
pub fn unknown_script_utxo(seed: u8, value: u64) -> Utxo {
    Utxo::new(
        outpoint(seed),
        Amount::from_sat(value),
        ScriptBuf::from_bytes(vec![0x51]),
    )
}

/// P2WPKH UTXOs, one per value, with distinct outpoints.
pub fn p2wpkh_utxos(values: &[u64]) -> Vec<Utxo> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| p2wpkh_utxo(i as u8, *v))
        .collect()
}

fn outpoint(seed: u8) -> OutPoint {
    OutPoint {
        txid: Txid::from_byte_array([seed; 32]),
        vout: seed as u32,
    }
}
