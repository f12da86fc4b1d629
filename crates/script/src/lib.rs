//! Compiles the leaf scripts of the staking covenant and lays them out in taproot trees.
//!
//! Every script here is a pure function of validated [`ScriptParams`], so the same
//! parameters always produce byte-identical scripts and therefore the same addresses.

mod builder;
mod data_embed;
mod errors;
mod params;
mod script_set;
pub mod taproot;
mod timelock;

pub use builder::*;
pub use data_embed::*;
pub use errors::*;
pub use params::*;
pub use script_set::*;
pub use timelock::*;
