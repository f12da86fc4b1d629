use bitcoin::Amount;
use tapstake_primitives::ValidationError;
use thiserror::Error;

/// Errors raised while selecting funding inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("validation: {0}")]
    Validation(#[from] ValidationError),

    /// Nothing to select from, so no fee estimate could be produced.
    #[error("unable to calculate fee: no UTXOs available")]
    UnableToCalculateFee,

    /// No prefix of the sorted UTXO set covers the target plus fee.
    #[error("insufficient funds: need {required}, have {available}")]
    InsufficientFunds { required: Amount, available: Amount },

    /// The fee at this rate exceeds the total bitcoin supply.
    #[error("fee rate {0} sat/vB overflows the fee estimate")]
    FeeOverflow(u64),
}
