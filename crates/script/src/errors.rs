use bitcoin::secp256k1::XOnlyPublicKey;
use tapstake_primitives::{KeyError, ValidationError};
use thiserror::Error;

/// Errors raised while compiling, parsing or introspecting scripts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("key: {0}")]
    Key(#[from] KeyError),

    #[error("validation: {0}")]
    Validation(#[from] ValidationError),

    /// A multi-key clause needs at least one key.
    #[error("no keys provided")]
    EmptyKeySet,

    /// Threshold is zero or exceeds the number of keys.
    #[error("threshold {threshold} must be within 1..={keys}")]
    InvalidThreshold { threshold: u32, keys: usize },

    /// The same key appears twice in one construction.
    #[error("duplicate key {0}")]
    DuplicateKey(XOnlyPublicKey),

    /// A field the generation requires was not supplied.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A field was supplied that the generation does not use.
    #[error("field not supported by this generation: {0}")]
    UnsupportedField(&'static str),

    /// A field has the wrong byte length.
    #[error("{field} must be {expected} bytes, found {found}")]
    InvalidFieldLength {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    /// The script could not be split into instructions.
    #[error("script failed to decompile: {0}")]
    Decompile(String),

    /// The script is not shaped like a timelock leaf.
    #[error("not a timelock script: {0}")]
    NotTimelockScript(&'static str),

    /// The timelock operand is not a valid BIP68 block count.
    #[error("invalid timelock operand: {0}")]
    InvalidTimelockOperand(String),

    /// The data-embed script does not have the expected layout.
    #[error("invalid data-embed script: {0}")]
    InvalidDataEmbed(String),

    /// Pushing data into a script failed.
    #[error("push bytes: {0}")]
    PushBytes(String),

    /// Building or querying a taproot tree failed.
    #[error("taproot: {0}")]
    Taproot(String),
}
