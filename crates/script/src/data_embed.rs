//! Provenance output: `OP_RETURN <magic || version || owner || payload>`.
//!
//! Fields are fixed width and concatenated without separators, so parsing is a
//! plain slice-by-offset of what [`DataEmbed::to_script`] wrote.

use bitcoin::{
    Script, ScriptBuf,
    opcodes::all::OP_RETURN,
    script::{Builder, Instruction, PushBytesBuf},
    secp256k1::XOnlyPublicKey,
};
use tapstake_primitives::{
    MagicBytes, OwnerKey,
    constants::{EXTERNAL_ADDRESS_LEN, MAGIC_BYTES_LEN, XONLY_PK_LEN},
    parse_xonly_key,
};

use crate::{Generation, ScriptError, ScriptParams};

/// Generation-specific tail of the data-embed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedPayload {
    /// First operator key and the lock timelock, big-endian.
    Slashable {
        operator_key: XOnlyPublicKey,
        lock_timelock: u16,
    },
    /// External-chain address the deposit is bound to.
    Bridge {
        external_address: [u8; EXTERNAL_ADDRESS_LEN],
    },
}

/// Decoded contents of a data-embed script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataEmbed {
    pub magic_bytes: MagicBytes,
    pub version: u8,
    pub owner_key: OwnerKey,
    pub payload: EmbedPayload,
}

impl DataEmbed {
    /// Collects the embedded fields from validated parameters.
    ///
    /// Returns `None` when the generation (or, for bridges, the missing external
    /// address) has no data-embed output.
    pub fn from_params(params: &ScriptParams) -> Option<Self> {
        let payload = match params.generation() {
            Generation::Slashable => EmbedPayload::Slashable {
                operator_key: *params.operator_keys().first()?,
                lock_timelock: params.lock_timelock()?,
            },
            Generation::Bridge => EmbedPayload::Bridge {
                external_address: *params.external_address()?,
            },
            Generation::Covenant => return None,
        };
        Some(Self {
            magic_bytes: *params.magic_bytes(),
            version: params.version(),
            owner_key: *params.owner_key(),
            payload,
        })
    }

    /// Raw pushed payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(80);
        bytes.extend_from_slice(self.magic_bytes.as_bytes());
        bytes.push(self.version);
        bytes.extend_from_slice(&self.owner_key.serialize());
        match &self.payload {
            EmbedPayload::Slashable {
                operator_key,
                lock_timelock,
            } => {
                bytes.extend_from_slice(&operator_key.serialize());
                bytes.extend_from_slice(&lock_timelock.to_be_bytes());
            }
            EmbedPayload::Bridge { external_address } => {
                bytes.extend_from_slice(external_address);
            }
        }
        bytes
    }

    pub fn to_script(&self) -> Result<ScriptBuf, ScriptError> {
        let data = PushBytesBuf::try_from(self.to_bytes())
            .map_err(|e| ScriptError::PushBytes(e.to_string()))?;
        Ok(Builder::new()
            .push_opcode(OP_RETURN)
            .push_slice(data)
            .into_script())
    }

    /// Decodes a data-embed script of the given generation.
    pub fn parse(script: &Script, generation: Generation) -> Result<Self, ScriptError> {
        let mut instructions = script.instructions();
        match instructions.next() {
            Some(Ok(Instruction::Op(op))) if op == OP_RETURN => {}
            _ => {
                return Err(ScriptError::InvalidDataEmbed(
                    "missing OP_RETURN".to_string(),
                ))
            }
        }
        let data = match instructions.next() {
            Some(Ok(Instruction::PushBytes(data))) => data.as_bytes(),
            Some(Err(e)) => return Err(ScriptError::Decompile(e.to_string())),
            _ => {
                return Err(ScriptError::InvalidDataEmbed(
                    "missing payload push".to_string(),
                ))
            }
        };
        if instructions.next().is_some() {
            return Err(ScriptError::InvalidDataEmbed(
                "trailing data after payload".to_string(),
            ));
        }

        let owner_len = generation.owner_key_encoding().serialized_len();
        let tail_len = match generation {
            Generation::Slashable => XONLY_PK_LEN + 2,
            Generation::Bridge => EXTERNAL_ADDRESS_LEN,
            Generation::Covenant => {
                return Err(ScriptError::InvalidDataEmbed(
                    "covenant generation has no data-embed".to_string(),
                ))
            }
        };
        let expected = MAGIC_BYTES_LEN + 1 + owner_len + tail_len;
        if data.len() != expected {
            return Err(ScriptError::InvalidFieldLength {
                field: "data_embed",
                expected,
                found: data.len(),
            });
        }

        let (magic, rest) = data.split_at(MAGIC_BYTES_LEN);
        let (version, rest) = rest.split_at(1);
        let (owner, tail) = rest.split_at(owner_len);

        let magic_bytes = MagicBytes::try_from(magic)?;
        let owner_key = OwnerKey::parse(generation.owner_key_encoding(), owner)?;
        let payload = match generation {
            Generation::Slashable => {
                let (operator, timelock) = tail.split_at(XONLY_PK_LEN);
                EmbedPayload::Slashable {
                    operator_key: parse_xonly_key(operator)?,
                    lock_timelock: u16::from_be_bytes([timelock[0], timelock[1]]),
                }
            }
            _ => {
                let mut external_address = [0u8; EXTERNAL_ADDRESS_LEN];
                external_address.copy_from_slice(tail);
                EmbedPayload::Bridge { external_address }
            }
        };

        Ok(Self {
            magic_bytes,
            version: version[0],
            owner_key,
            payload,
        })
    }
}
