use tapstake_primitives::KeyError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WitnessError {
    #[error("covenant key: {0}")]
    Key(#[from] KeyError),

    #[error("signature is not valid hex: {0}")]
    InvalidSignatureHex(String),

    #[error("invalid schnorr signature: {0}")]
    InvalidSignature(String),

    #[error("input index {index} out of bounds ({len} inputs)")]
    InputOutOfBounds { index: usize, len: usize },

    /// The PSBT input must carry exactly one tapleaf script to finalize.
    #[error("input {0} must carry exactly one tapleaf script, found {1}")]
    LeafScriptCount(usize, usize),
}
