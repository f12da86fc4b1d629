//! Typed handles on the outputs a transition can spend.

use bitcoin::{Amount, OutPoint, Script, Transaction, TxOut};

use crate::{PsbtTransactionResult, TxBuildError};

/// The bits of a prior output needed to spend it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PriorOutput {
    outpoint: OutPoint,
    txout: TxOut,
}

impl PriorOutput {
    fn from_tx(tx: &Transaction, vout: u32) -> Result<Self, TxBuildError> {
        let txout = tx
            .output
            .get(vout as usize)
            .ok_or(TxBuildError::OutputIndexOutOfBounds {
                index: vout,
                len: tx.output.len(),
            })?;
        Ok(Self {
            outpoint: OutPoint::new(tx.compute_txid(), vout),
            txout: txout.clone(),
        })
    }
}

macro_rules! spend_context {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name(PriorOutput);

        impl $name {
            pub fn new(outpoint: OutPoint, txout: TxOut) -> Self {
                Self(PriorOutput { outpoint, txout })
            }

            /// Output `vout` of `tx`.
            pub fn from_tx(tx: &Transaction, vout: u32) -> Result<Self, TxBuildError> {
                PriorOutput::from_tx(tx, vout).map(Self)
            }

            /// Output `vout` of a transaction built by this crate.
            pub fn from_result(result: &PsbtTransactionResult, vout: u32) -> Result<Self, TxBuildError> {
                Self::from_tx(&result.psbt.unsigned_tx, vout)
            }

            pub fn outpoint(&self) -> OutPoint {
                self.0.outpoint
            }

            pub fn value(&self) -> Amount {
                self.0.txout.value
            }

            pub fn script_pubkey(&self) -> &Script {
                &self.0.txout.script_pubkey
            }

            pub fn tx_out(&self) -> &TxOut {
                &self.0.txout
            }
        }
    };
}

spend_context!(
    /// An output locked under a lock tree.
    LockedOutput
);

spend_context!(
    /// An output locked under the unbonding tree.
    UnbondingOutput
);
