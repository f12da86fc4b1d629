//! Greedy largest-first UTXO selection and the two fee-size models it runs against.

mod errors;
mod fee;
mod select;

pub use errors::*;
pub use fee::*;
pub use select::*;
