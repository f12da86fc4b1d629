//! Primitive types and protocol-wide constants shared by every tapstake crate.

pub mod constants;
mod errors;
mod keys;
mod magic;
mod utxo;
mod validation;

pub use errors::*;
pub use keys::*;
pub use magic::*;
pub use utxo::*;
pub use validation::*;
