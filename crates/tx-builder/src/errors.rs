use bitcoin::{Amount, OutPoint};
use tapstake_coin_select::SelectionError;
use tapstake_primitives::ValidationError;
use tapstake_script::{Generation, ScriptError};
use thiserror::Error;

/// Errors raised while building a transaction. No partial PSBT is ever returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TxBuildError {
    #[error("validation: {0}")]
    Validation(#[from] ValidationError),

    #[error("script: {0}")]
    Script(#[from] ScriptError),

    #[error("selection: {0}")]
    Selection(#[from] SelectionError),

    #[error("psbt: {0}")]
    Psbt(String),

    /// The referenced output does not exist in the prior transaction.
    #[error("output index {index} out of bounds ({len} outputs)")]
    OutputIndexOutOfBounds { index: u32, len: usize },

    /// The transition does not exist for this generation.
    #[error("{operation} is not supported by the {generation:?} generation")]
    UnsupportedGeneration {
        operation: &'static str,
        generation: Generation,
    },

    /// The spent output is not locked by the supplied scripts.
    #[error("output {0} does not match the expected script tree")]
    ScriptMismatch(OutPoint),

    /// The new script set of a re-lock must keep these leaves.
    #[error("re-lock must keep the existing {0} script")]
    ChangedLeaf(&'static str),

    /// A legacy funding input needs its full parent transaction.
    #[error("non-segwit input {0} requires its raw parent transaction")]
    MissingParentTx(OutPoint),

    #[error("output value {value} cannot cover fee {fee}")]
    NotEnoughFunds { value: Amount, fee: Amount },

    #[error("output of {0} would be below the dust limit")]
    DustOutput(Amount),

    #[error("slashing rate {0} must be within (0, 1)")]
    InvalidSlashingRate(f64),

    #[error("not enough funds to slash {value}: slashed {slashed}, min fee {min_fee}")]
    NotEnoughFundsToSlash {
        value: Amount,
        slashed: Amount,
        min_fee: Amount,
    },
}
