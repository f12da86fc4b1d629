use std::{fs, path::Path};

use bitcoin::{Address, Amount, Network, address::NetworkUnchecked, secp256k1::XOnlyPublicKey};
use serde::{Deserialize, Serialize};
use tapstake_coin_select::FeeModel;
use tapstake_primitives::{
    MagicBytes, ValidationError, validate_address, validate_relative_timelock,
};
use tapstake_script::{Generation, KeyMaterial, LockTerms, ScriptError, ScriptParams};

use crate::{
    ParamsError,
    serde_helpers::{serde_amount_sat, serde_magic_bytes},
};

/// Terms of the slashing path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlashingParams {
    /// Share of the locked value sent to the slashing destination.
    pub rate: f64,

    /// Fee reserved out of the non-slashed share.
    #[serde(with = "serde_amount_sat")]
    pub min_fee: Amount,

    /// Where slashed funds go.
    pub destination: Address<NetworkUnchecked>,
}

/// Parameters fixed for a whole deployment. Per-delegation keys and terms are
/// supplied separately through [`ProtocolParams::script_params`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProtocolParams {
    pub generation: Generation,

    pub network: Network,

    /// Tag of the data-embed output, as 4 ASCII characters or 8 hex digits.
    #[serde(with = "serde_magic_bytes")]
    pub magic_bytes: MagicBytes,

    /// Version byte written after the magic bytes.
    #[serde(default)]
    pub version: u8,

    pub covenant_keys: Vec<XOnlyPublicKey>,

    pub covenant_threshold: u32,

    /// Relative timelock of the lock output, in blocks.
    #[serde(default)]
    pub lock_timelock: Option<u32>,

    /// Relative timelock of the unbonding output, in blocks.
    #[serde(default)]
    pub unbonding_timelock: Option<u32>,

    #[serde(default)]
    pub slashing: Option<SlashingParams>,

    #[serde(default)]
    pub fee_model: FeeModel,
}

impl ProtocolParams {
    pub fn from_json(json: &str) -> Result<Self, ParamsError> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ParamsError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Checks every field the generation depends on.
    pub fn validate(&self) -> Result<(), ParamsError> {
        let keys = self.covenant_keys.len();
        if keys == 0 || self.covenant_threshold == 0 || self.covenant_threshold as usize > keys {
            return Err(ScriptError::InvalidThreshold {
                threshold: self.covenant_threshold,
                keys,
            }
            .into());
        }

        for timelock in [self.lock_timelock, self.unbonding_timelock]
            .into_iter()
            .flatten()
        {
            validate_relative_timelock(timelock)?;
        }

        match self.generation {
            Generation::Slashable => {
                self.require(self.lock_timelock, "lock_timelock")?;
                self.require(self.unbonding_timelock, "unbonding_timelock")?;
                let slashing = self.require(self.slashing.as_ref(), "slashing")?;
                slashing.validate(self.network)?;
            }
            Generation::Bridge => {
                self.require(self.lock_timelock, "lock_timelock")?;
            }
            Generation::Covenant => {}
        }
        Ok(())
    }

    /// Validated script parameters for one delegation.
    pub fn script_params(
        &self,
        owner_key: &[u8],
        operator_keys: &[Vec<u8>],
        external_address: Option<&[u8]>,
    ) -> Result<ScriptParams, ParamsError> {
        let keys = KeyMaterial {
            owner_key: owner_key.to_vec(),
            operator_keys: operator_keys.to_vec(),
            covenant_keys: self
                .covenant_keys
                .iter()
                .map(|pk| pk.serialize().to_vec())
                .collect(),
            covenant_threshold: self.covenant_threshold,
        };

        // Covenant deployments carry no timelocks in their script.
        let mut terms = LockTerms::new(self.magic_bytes, self.version);
        if self.generation != Generation::Covenant {
            terms.lock_timelock = self.lock_timelock;
        }
        if self.generation == Generation::Slashable {
            terms.unbonding_timelock = self.unbonding_timelock;
        }
        terms.external_address = external_address.map(<[u8]>::to_vec);

        Ok(ScriptParams::new(self.generation, &keys, &terms)?)
    }

    /// The checked slashing destination.
    pub fn slashing_destination(&self) -> Result<Option<Address>, ParamsError> {
        self.slashing
            .as_ref()
            .map(|s| validate_address(&s.destination, self.network))
            .transpose()
            .map_err(ParamsError::from)
    }

    fn require<T>(&self, value: Option<T>, field: &'static str) -> Result<T, ParamsError> {
        value.ok_or(ParamsError::MissingField(self.generation, field))
    }
}

impl SlashingParams {
    pub fn validate(&self, network: Network) -> Result<(), ParamsError> {
        if !(self.rate > 0.0 && self.rate < 1.0) {
            return Err(ParamsError::InvalidSlashingRate(self.rate));
        }
        if self.min_fee == Amount::ZERO {
            return Err(ValidationError::NonPositiveFee.into());
        }
        validate_address(&self.destination, network)?;
        Ok(())
    }
}
