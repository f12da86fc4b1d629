//! Builds the unsigned PSBTs of every delegation life-cycle transition.
//!
//! ```text
//! unlocked UTXOs --lock--> Locked --unbond--> Unbonding --withdraw/slash--> done
//!                            |--withdraw/slash (after timelock)--> done
//!                            |--transfer--> done
//!                            `--continue--> Locked
//! ```
//!
//! Each builder is a pure function of its arguments. The spend contexts
//! [`LockedOutput`] and [`UnbondingOutput`] pin which transitions are callable from
//! which output.

mod config;
mod context;
mod continue_lock;
mod errors;
mod lock;
mod psbt;
mod slash;
#[cfg(test)]
mod test_fixtures;
mod transfer;
mod unbond;
mod withdraw;

pub use config::*;
pub use context::*;
pub use continue_lock::*;
pub use errors::*;
pub use lock::*;
pub use psbt::PsbtTransactionResult;
pub use slash::*;
pub use transfer::*;
pub use unbond::*;
pub use withdraw::*;
