//! Splices covenant committee signatures into script-path witnesses.

mod compose;
mod errors;

pub use compose::*;
pub use errors::*;
