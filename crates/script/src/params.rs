//! Validated parameters for one delegation's script set.

use std::{collections::HashSet, iter};

use bitcoin::secp256k1::XOnlyPublicKey;
use serde::{Deserialize, Serialize};
use tapstake_primitives::{
    KeyEncoding, MagicBytes, OwnerKey, constants::EXTERNAL_ADDRESS_LEN, parse_xonly_key,
    validate_relative_timelock,
};

use crate::ScriptError;

/// Protocol generation; decides the shape of the script set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Generation {
    /// Timelock, unbonding and slashing leaves with an operator clause.
    Slashable,
    /// Timelock and covenant transfer leaves, bound to an external-chain address.
    Bridge,
    /// A single covenant locking leaf.
    Covenant,
}

impl Generation {
    /// Wire encoding of the owner key in this generation.
    pub const fn owner_key_encoding(&self) -> KeyEncoding {
        match self {
            Self::Bridge => KeyEncoding::Compressed,
            Self::Slashable | Self::Covenant => KeyEncoding::XOnly,
        }
    }
}

/// Raw key material as it arrives from the wallet and the deployment parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyMaterial {
    pub owner_key: Vec<u8>,
    pub operator_keys: Vec<Vec<u8>>,
    pub covenant_keys: Vec<Vec<u8>>,
    pub covenant_threshold: u32,
}

/// Non-key terms of a lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockTerms {
    pub magic_bytes: MagicBytes,
    pub version: u8,
    pub lock_timelock: Option<u32>,
    pub unbonding_timelock: Option<u32>,
    pub external_address: Option<Vec<u8>>,
}

impl LockTerms {
    pub fn new(magic_bytes: MagicBytes, version: u8) -> Self {
        Self {
            magic_bytes,
            version,
            lock_timelock: None,
            unbonding_timelock: None,
            external_address: None,
        }
    }

    pub fn with_lock_timelock(mut self, blocks: u32) -> Self {
        self.lock_timelock = Some(blocks);
        self
    }

    pub fn with_unbonding_timelock(mut self, blocks: u32) -> Self {
        self.unbonding_timelock = Some(blocks);
        self
    }

    pub fn with_external_address(mut self, address: Vec<u8>) -> Self {
        self.external_address = Some(address);
        self
    }
}

/// Script parameters that passed validation.
///
/// Only constructible through [`ScriptParams::new`]; an instance is proof that every
/// length, range and distinctness check held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptParams {
    generation: Generation,
    owner_key: OwnerKey,
    operator_keys: Vec<XOnlyPublicKey>,
    covenant_keys: Vec<XOnlyPublicKey>,
    covenant_threshold: u32,
    lock_timelock: Option<u16>,
    unbonding_timelock: Option<u16>,
    magic_bytes: MagicBytes,
    version: u8,
    external_address: Option<[u8; EXTERNAL_ADDRESS_LEN]>,
}

impl ScriptParams {
    pub fn new(
        generation: Generation,
        keys: &KeyMaterial,
        terms: &LockTerms,
    ) -> Result<Self, ScriptError> {
        let owner_key = OwnerKey::parse(generation.owner_key_encoding(), &keys.owner_key)?;

        let operator_keys = parse_key_list(&keys.operator_keys)?;
        let covenant_keys = parse_key_list(&keys.covenant_keys)?;

        if covenant_keys.is_empty() {
            return Err(ScriptError::EmptyKeySet);
        }
        let threshold = keys.covenant_threshold;
        if threshold == 0 || threshold as usize > covenant_keys.len() {
            return Err(ScriptError::InvalidThreshold {
                threshold,
                keys: covenant_keys.len(),
            });
        }

        let lock_timelock = terms
            .lock_timelock
            .map(validate_relative_timelock)
            .transpose()?;
        let unbonding_timelock = terms
            .unbonding_timelock
            .map(validate_relative_timelock)
            .transpose()?;
        let external_address = terms
            .external_address
            .as_deref()
            .map(|addr| {
                <[u8; EXTERNAL_ADDRESS_LEN]>::try_from(addr).map_err(|_| {
                    ScriptError::InvalidFieldLength {
                        field: "external_address",
                        expected: EXTERNAL_ADDRESS_LEN,
                        found: addr.len(),
                    }
                })
            })
            .transpose()?;

        match generation {
            Generation::Slashable => {
                if operator_keys.is_empty() {
                    return Err(ScriptError::MissingField("operator_keys"));
                }
                require(lock_timelock, "lock_timelock")?;
                require(unbonding_timelock, "unbonding_timelock")?;
                reject(external_address, "external_address")?;
            }
            Generation::Bridge => {
                require(lock_timelock, "lock_timelock")?;
                reject_keys(&operator_keys)?;
                reject(unbonding_timelock, "unbonding_timelock")?;
            }
            Generation::Covenant => {
                reject_keys(&operator_keys)?;
                reject(lock_timelock, "lock_timelock")?;
                reject(unbonding_timelock, "unbonding_timelock")?;
                reject(external_address, "external_address")?;
            }
        }

        // Owner, operators and covenants must be pairwise distinct.
        let mut seen = HashSet::new();
        let all_keys = iter::once(owner_key.x_only())
            .chain(operator_keys.iter().copied())
            .chain(covenant_keys.iter().copied());
        for pk in all_keys {
            if !seen.insert(pk) {
                return Err(ScriptError::DuplicateKey(pk));
            }
        }

        Ok(Self {
            generation,
            owner_key,
            operator_keys,
            covenant_keys,
            covenant_threshold: threshold,
            lock_timelock,
            unbonding_timelock,
            magic_bytes: terms.magic_bytes,
            version: terms.version,
            external_address,
        })
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn owner_key(&self) -> &OwnerKey {
        &self.owner_key
    }

    pub fn operator_keys(&self) -> &[XOnlyPublicKey] {
        &self.operator_keys
    }

    pub fn covenant_keys(&self) -> &[XOnlyPublicKey] {
        &self.covenant_keys
    }

    pub fn covenant_threshold(&self) -> u32 {
        self.covenant_threshold
    }

    pub fn lock_timelock(&self) -> Option<u16> {
        self.lock_timelock
    }

    pub fn unbonding_timelock(&self) -> Option<u16> {
        self.unbonding_timelock
    }

    pub fn magic_bytes(&self) -> &MagicBytes {
        &self.magic_bytes
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn external_address(&self) -> Option<&[u8; EXTERNAL_ADDRESS_LEN]> {
        self.external_address.as_ref()
    }

    /// Same parameters with a different lock timelock, as used when re-locking.
    pub fn with_lock_timelock(&self, blocks: u32) -> Result<Self, ScriptError> {
        if self.generation == Generation::Covenant {
            return Err(ScriptError::UnsupportedField("lock_timelock"));
        }
        let mut params = self.clone();
        params.lock_timelock = Some(validate_relative_timelock(blocks)?);
        Ok(params)
    }
}

fn parse_key_list(raw: &[Vec<u8>]) -> Result<Vec<XOnlyPublicKey>, ScriptError> {
    raw.iter()
        .map(|bytes| parse_xonly_key(bytes).map_err(ScriptError::from))
        .collect()
}

fn require<T>(value: Option<T>, field: &'static str) -> Result<T, ScriptError> {
    value.ok_or(ScriptError::MissingField(field))
}

fn reject<T>(value: Option<T>, field: &'static str) -> Result<(), ScriptError> {
    match value {
        Some(_) => Err(ScriptError::UnsupportedField(field)),
        None => Ok(()),
    }
}

fn reject_keys(keys: &[XOnlyPublicKey]) -> Result<(), ScriptError> {
    if keys.is_empty() {
        Ok(())
    } else {
        Err(ScriptError::UnsupportedField("operator_keys"))
    }
}
