//! Fixed taproot tree layouts, one per output purpose.
//!
//! The leaf depths here are what the output key commits to, so a spend must rebuild
//! the exact same tree to obtain a valid control block.

use bitcoin::{
    Address, Network, ScriptBuf,
    secp256k1::{SECP256K1, XOnlyPublicKey},
    taproot::{ControlBlock, LeafVersion, TaprootBuilder, TaprootSpendInfo},
};
use tapstake_primitives::constants::unspendable_internal_key;

use crate::{ScriptError, ScriptSet, SlashableScripts};

/// A leaf revealed in a script-path spend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafSpend {
    pub script: ScriptBuf,
    pub control_block: ControlBlock,
}

/// A finalized script tree under the unspendable internal key.
#[derive(Debug, Clone)]
pub struct TapTree {
    spend_info: TaprootSpendInfo,
}

impl TapTree {
    /// Builds a tree from `(depth, script)` leaves given in depth-first order.
    fn from_leaves(leaves: &[(u8, &ScriptBuf)]) -> Result<Self, ScriptError> {
        let mut builder = TaprootBuilder::new();
        for (depth, script) in leaves {
            builder = builder
                .add_leaf(*depth, (*script).clone())
                .map_err(|e| ScriptError::Taproot(e.to_string()))?;
        }
        let spend_info = builder
            .finalize(SECP256K1, unspendable_internal_key())
            .map_err(|_| ScriptError::Taproot("incomplete script tree".to_string()))?;
        Ok(Self { spend_info })
    }

    /// Tree of the lock output.
    ///
    /// - slashable: `[slashing, [unbonding, timelock]]`
    /// - bridge: `[timelock, transfer]`
    /// - covenant: the locking leaf alone
    pub fn lock(set: &ScriptSet) -> Result<Self, ScriptError> {
        match set {
            ScriptSet::Slashable(s) => Self::slashable_lock(s),
            ScriptSet::Bridge(s) => Self::from_leaves(&[(1, s.timelock()), (1, s.transfer())]),
            ScriptSet::Covenant(s) => Self::from_leaves(&[(0, s.locking())]),
        }
    }

    /// Lock tree of the slashable generation.
    pub fn slashable_lock(scripts: &SlashableScripts) -> Result<Self, ScriptError> {
        Self::from_leaves(&[
            (1, scripts.slashing()),
            (2, scripts.unbonding()),
            (2, scripts.timelock()),
        ])
    }

    /// Tree of the unbonding output: `[slashing, unbonding_timelock]`.
    pub fn unbonding(scripts: &SlashableScripts) -> Result<Self, ScriptError> {
        Self::from_leaves(&[(1, scripts.slashing()), (1, scripts.unbonding_timelock())])
    }

    /// Tree of the change output of a slashing transaction.
    pub fn slashing_change(scripts: &SlashableScripts) -> Result<Self, ScriptError> {
        Self::from_leaves(&[(0, scripts.unbonding_timelock())])
    }

    pub fn internal_key(&self) -> XOnlyPublicKey {
        self.spend_info.internal_key()
    }

    pub fn spend_info(&self) -> &TaprootSpendInfo {
        &self.spend_info
    }

    pub fn script_pubkey(&self) -> ScriptBuf {
        ScriptBuf::new_p2tr_tweaked(self.spend_info.output_key())
    }

    pub fn address(&self, network: Network) -> Address {
        Address::p2tr_tweaked(self.spend_info.output_key(), network)
    }

    /// Script and control block for spending through `script`.
    pub fn leaf_spend(&self, script: &ScriptBuf) -> Result<LeafSpend, ScriptError> {
        let control_block = self
            .spend_info
            .control_block(&(script.clone(), LeafVersion::TapScript))
            .ok_or_else(|| ScriptError::Taproot("leaf not present in tree".to_string()))?;
        Ok(LeafSpend {
            script: script.clone(),
            control_block,
        })
    }
}
