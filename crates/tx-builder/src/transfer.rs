//! Covenant-authorised transfer of a lock output.

use bitcoin::{Address, address::NetworkUnchecked};
use tapstake_primitives::constants::COVENANT_SPEND_SEQUENCE;
use tapstake_script::{ScriptSet, taproot::TapTree};

use crate::{BuildConfig, LockedOutput, PsbtTransactionResult, TxBuildError, withdraw::sweep_leaf};

/// Moves a bridge or covenant lock output to `destination` through the leaf
/// that needs the owner and a covenant quorum.
pub fn build_transfer_tx(
    config: &BuildConfig,
    scripts: &ScriptSet,
    locked: &LockedOutput,
    destination: &Address<NetworkUnchecked>,
) -> Result<PsbtTransactionResult, TxBuildError> {
    let leaf = match scripts {
        ScriptSet::Bridge(s) => s.transfer(),
        ScriptSet::Covenant(s) => s.locking(),
        ScriptSet::Slashable(_) => {
            return Err(TxBuildError::UnsupportedGeneration {
                operation: "transfer",
                generation: scripts.generation(),
            });
        }
    };
    sweep_leaf(
        "transfer",
        config,
        TapTree::lock(scripts)?,
        leaf,
        COVENANT_SPEND_SEQUENCE,
        locked.outpoint(),
        locked.tx_out(),
        destination,
    )
}

#[cfg(test)]
mod tests {
    use bitcoin::Amount;

    use super::*;
    use crate::test_fixtures::{bridge, config, covenant, destination, locked, slashable};

    fn spent_leaf(result: &PsbtTransactionResult) -> bitcoin::ScriptBuf {
        let (leaf, _) = result.psbt.inputs[0].tap_scripts.values().next().unwrap();
        leaf.clone()
    }

    #[test]
    fn test_bridge_transfer() {
        let set = bridge();
        let locked = locked(&set, 1_000_000);
        let result = build_transfer_tx(&config(), &set, &locked, &destination()).unwrap();
        assert_eq!(result.transaction().input[0].sequence, COVENANT_SPEND_SEQUENCE);
        assert_eq!(result.fee, Amount::from_sat(2_250));
        let ScriptSet::Bridge(scripts) = &set else {
            unreachable!()
        };
        assert_eq!(&spent_leaf(&result), scripts.transfer());
    }

    #[test]
    fn test_covenant_transfer() {
        let set = covenant();
        let locked = locked(&set, 1_000_000);
        let result = build_transfer_tx(&config(), &set, &locked, &destination()).unwrap();
        let ScriptSet::Covenant(scripts) = &set else {
            unreachable!()
        };
        assert_eq!(&spent_leaf(&result), scripts.locking());
        assert!(result.psbt.inputs[0].tap_merkle_root.is_some());
    }

    #[test]
    fn test_slashable_has_no_transfer() {
        let set = slashable();
        let locked = locked(&set, 1_000_000);
        assert!(matches!(
            build_transfer_tx(&config(), &set, &locked, &destination()),
            Err(TxBuildError::UnsupportedGeneration {
                operation: "transfer",
                ..
            })
        ));
    }
}
