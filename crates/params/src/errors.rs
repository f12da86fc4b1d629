use std::io;

use tapstake_primitives::ValidationError;
use tapstake_script::{Generation, ScriptError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("failed to read params file: {0}")]
    Io(#[from] io::Error),

    #[error("malformed params: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation: {0}")]
    Validation(#[from] ValidationError),

    #[error("script params: {0}")]
    Script(#[from] ScriptError),

    /// Slashing rate must lie strictly between 0 and 1.
    #[error("slashing rate {0} must be within (0, 1)")]
    InvalidSlashingRate(f64),

    #[error("generation {0:?} requires {1}")]
    MissingField(Generation, &'static str),
}
