//! Deployment parameters of a tapstake protocol instance.

mod errors;
mod protocol;
pub mod serde_helpers;

pub use errors::*;
pub use protocol::*;
