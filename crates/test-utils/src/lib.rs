//! Fixtures shared by the tapstake test suites.

mod arbitrary_generator;
pub mod keys;
pub mod signing;
pub mod utxo;

pub use arbitrary_generator::ArbitraryGenerator;
use tracing_subscriber::EnvFilter;

/// Installs a test subscriber honouring `RUST_LOG`; repeated calls are no-ops.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
