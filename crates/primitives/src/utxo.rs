use arbitrary::{Arbitrary, Unstructured};
use bitcoin::{Amount, OutPoint, ScriptBuf, Transaction, TxOut, Txid, hashes::Hash};
use serde::{Deserialize, Serialize};

/// An unspent output offered to the coin selector.
///
/// UTXOs are read-only inputs: selection copies the ones it picks and never
/// mutates the caller's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    /// Output being spent.
    pub outpoint: OutPoint,

    /// Value of the output.
    pub value: Amount,

    /// Locking script of the output.
    pub script_pubkey: ScriptBuf,

    /// Full parent transaction, required by signers of non-segwit inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_parent_tx: Option<Transaction>,

    /// P2SH redeem script, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redeem_script: Option<ScriptBuf>,

    /// P2WSH witness script, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub witness_script: Option<ScriptBuf>,
}

impl Utxo {
    pub fn new(outpoint: OutPoint, value: Amount, script_pubkey: ScriptBuf) -> Self {
        Self {
            outpoint,
            value,
            script_pubkey,
            raw_parent_tx: None,
            redeem_script: None,
            witness_script: None,
        }
    }

    pub fn with_raw_parent_tx(mut self, tx: Transaction) -> Self {
        self.raw_parent_tx = Some(tx);
        self
    }

    pub fn with_redeem_script(mut self, script: ScriptBuf) -> Self {
        self.redeem_script = Some(script);
        self
    }

    pub fn with_witness_script(mut self, script: ScriptBuf) -> Self {
        self.witness_script = Some(script);
        self
    }

    /// The output as it appears in the parent transaction.
    pub fn tx_out(&self) -> TxOut {
        TxOut {
            value: self.value,
            script_pubkey: self.script_pubkey.clone(),
        }
    }
}

impl<'a> Arbitrary<'a> for Utxo {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let txid = Txid::from_byte_array(u.arbitrary()?);
        let vout = u.int_in_range(0..=15)?;
        let value = Amount::from_sat(u.int_in_range(1_000..=1_000_000_000)?);

        // Only the template matters to fee estimation, so the program bytes are random.
        let script_pubkey = match u.int_in_range(0..=2)? {
            0 => {
                let program: [u8; 20] = u.arbitrary()?;
                let mut bytes = vec![0x00, 0x14];
                bytes.extend_from_slice(&program);
                ScriptBuf::from_bytes(bytes)
            }
            1 => {
                let program: [u8; 32] = u.arbitrary()?;
                let mut bytes = vec![0x51, 0x20];
                bytes.extend_from_slice(&program);
                ScriptBuf::from_bytes(bytes)
            }
            _ => {
                let hash: [u8; 20] = u.arbitrary()?;
                let mut bytes = vec![0x76, 0xa9, 0x14];
                bytes.extend_from_slice(&hash);
                bytes.extend_from_slice(&[0x88, 0xac]);
                ScriptBuf::from_bytes(bytes)
            }
        };

        Ok(Self::new(OutPoint { txid, vout }, value, script_pubkey))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utxo_serde_roundtrip() {
        let utxo = Utxo::new(
            OutPoint {
                txid: Txid::from_byte_array([3u8; 32]),
                vout: 1,
            },
            Amount::from_sat(50_000),
            ScriptBuf::from_bytes(vec![0x51, 0x20].into_iter().chain([9u8; 32]).collect()),
        )
        .with_witness_script(ScriptBuf::from_bytes(vec![0x51]));

        let json = serde_json::to_string(&utxo).unwrap();
        assert!(!json.contains("raw_parent_tx"));
        let decoded: Utxo = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, utxo);
        assert_eq!(decoded.tx_out().value, Amount::from_sat(50_000));
    }

    #[test]
    fn test_arbitrary_utxo_has_known_template() {
        let data = [0xa5u8; 256];
        let mut u = Unstructured::new(&data);
        let utxo = Utxo::arbitrary(&mut u).unwrap();
        let spk = &utxo.script_pubkey;
        assert!(spk.is_p2wpkh() || spk.is_p2tr() || spk.is_p2pkh());
        assert!(utxo.value.to_sat() >= 1_000);
    }
}
