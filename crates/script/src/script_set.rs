//! The compiled leaf scripts of one delegation.

use bitcoin::ScriptBuf;
use tracing::debug;

use crate::{
    DataEmbed, Generation, ScriptError, ScriptParams, build_multi_key_script,
    build_single_key_script, build_timelock_script, concat_scripts,
};

/// Leaves of the slashable protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlashableScripts {
    timelock: ScriptBuf,
    unbonding: ScriptBuf,
    slashing: ScriptBuf,
    unbonding_timelock: ScriptBuf,
    data_embed: ScriptBuf,
}

impl SlashableScripts {
    pub fn timelock(&self) -> &ScriptBuf {
        &self.timelock
    }

    pub fn unbonding(&self) -> &ScriptBuf {
        &self.unbonding
    }

    pub fn slashing(&self) -> &ScriptBuf {
        &self.slashing
    }

    pub fn unbonding_timelock(&self) -> &ScriptBuf {
        &self.unbonding_timelock
    }

    pub fn data_embed(&self) -> &ScriptBuf {
        &self.data_embed
    }
}

/// Leaves of the bridge protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeScripts {
    timelock: ScriptBuf,
    transfer: ScriptBuf,
    data_embed: Option<ScriptBuf>,
}

impl BridgeScripts {
    pub fn timelock(&self) -> &ScriptBuf {
        &self.timelock
    }

    pub fn transfer(&self) -> &ScriptBuf {
        &self.transfer
    }

    pub fn data_embed(&self) -> Option<&ScriptBuf> {
        self.data_embed.as_ref()
    }
}

/// The single leaf of the covenant protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CovenantScripts {
    locking: ScriptBuf,
}

impl CovenantScripts {
    pub fn locking(&self) -> &ScriptBuf {
        &self.locking
    }
}

/// Compiled scripts, shaped by the [`Generation`] they were built for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptSet {
    Slashable(SlashableScripts),
    Bridge(BridgeScripts),
    Covenant(CovenantScripts),
}

impl ScriptSet {
    pub fn generation(&self) -> Generation {
        match self {
            Self::Slashable(_) => Generation::Slashable,
            Self::Bridge(_) => Generation::Bridge,
            Self::Covenant(_) => Generation::Covenant,
        }
    }

    /// The data-embed output script, if this set has one.
    pub fn data_embed(&self) -> Option<&ScriptBuf> {
        match self {
            Self::Slashable(s) => Some(s.data_embed()),
            Self::Bridge(s) => s.data_embed(),
            Self::Covenant(_) => None,
        }
    }

    /// The owner-only timelock leaf of the lock output.
    pub fn timelock(&self) -> Option<&ScriptBuf> {
        match self {
            Self::Slashable(s) => Some(s.timelock()),
            Self::Bridge(s) => Some(s.timelock()),
            Self::Covenant(_) => None,
        }
    }

    pub fn as_slashable(&self) -> Option<&SlashableScripts> {
        match self {
            Self::Slashable(s) => Some(s),
            _ => None,
        }
    }
}

impl ScriptParams {
    /// Compiles the script set. Identical parameters give byte-identical scripts.
    pub fn build_scripts(&self) -> Result<ScriptSet, ScriptError> {
        let owner = self.owner_key().x_only();
        let owner_clause = build_single_key_script(&owner, true);
        let covenant_clause =
            build_multi_key_script(self.covenant_keys(), self.covenant_threshold(), false)?;
        let owner_and_covenants = concat_scripts(&[&owner_clause, &covenant_clause]);

        let set = match self.generation() {
            Generation::Slashable => {
                let lock_timelock = self
                    .lock_timelock()
                    .ok_or(ScriptError::MissingField("lock_timelock"))?;
                let unbonding_timelock = self
                    .unbonding_timelock()
                    .ok_or(ScriptError::MissingField("unbonding_timelock"))?;
                let operator_clause = build_multi_key_script(self.operator_keys(), 1, true)?;
                let data_embed = DataEmbed::from_params(self)
                    .ok_or(ScriptError::MissingField("data_embed"))?
                    .to_script()?;

                ScriptSet::Slashable(SlashableScripts {
                    timelock: build_timelock_script(&owner, lock_timelock),
                    slashing: concat_scripts(&[&owner_clause, &operator_clause, &covenant_clause]),
                    unbonding: owner_and_covenants,
                    unbonding_timelock: build_timelock_script(&owner, unbonding_timelock),
                    data_embed,
                })
            }
            Generation::Bridge => {
                let lock_timelock = self
                    .lock_timelock()
                    .ok_or(ScriptError::MissingField("lock_timelock"))?;
                let data_embed = DataEmbed::from_params(self)
                    .map(|embed| embed.to_script())
                    .transpose()?;

                ScriptSet::Bridge(BridgeScripts {
                    timelock: build_timelock_script(&owner, lock_timelock),
                    transfer: owner_and_covenants,
                    data_embed,
                })
            }
            Generation::Covenant => ScriptSet::Covenant(CovenantScripts {
                locking: owner_and_covenants,
            }),
        };

        debug!(generation = ?self.generation(), "compiled script set");
        Ok(set)
    }
}
