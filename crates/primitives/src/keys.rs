//! Raw public key parsing for the two key conventions used across protocol generations.

use bitcoin::secp256k1::{PublicKey, XOnlyPublicKey};
use serde::{Deserialize, Serialize};

use crate::{
    KeyError,
    constants::{COMPRESSED_PK_LEN, XONLY_PK_LEN},
};

/// How an owner key is serialized on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyEncoding {
    /// 32-byte BIP340 x-only key.
    XOnly,
    /// 33-byte SEC1 compressed key.
    Compressed,
}

impl KeyEncoding {
    /// Serialized length of a key in this encoding.
    pub const fn serialized_len(&self) -> usize {
        match self {
            Self::XOnly => XONLY_PK_LEN,
            Self::Compressed => COMPRESSED_PK_LEN,
        }
    }
}

/// The key of the party that owns the locked funds.
///
/// Leaf scripts always commit to the x-only projection; the full encoding only
/// shows up in the data-embed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnerKey {
    XOnly(XOnlyPublicKey),
    Compressed(PublicKey),
}

impl OwnerKey {
    /// Parses `bytes` according to `encoding`, checking the length first.
    pub fn parse(encoding: KeyEncoding, bytes: &[u8]) -> Result<Self, KeyError> {
        match encoding {
            KeyEncoding::XOnly => parse_xonly_key(bytes).map(Self::XOnly),
            KeyEncoding::Compressed => parse_compressed_key(bytes).map(Self::Compressed),
        }
    }

    pub fn encoding(&self) -> KeyEncoding {
        match self {
            Self::XOnly(_) => KeyEncoding::XOnly,
            Self::Compressed(_) => KeyEncoding::Compressed,
        }
    }

    /// The key as committed to in tapscript leaves.
    pub fn x_only(&self) -> XOnlyPublicKey {
        match self {
            Self::XOnly(pk) => *pk,
            Self::Compressed(pk) => pk.x_only_public_key().0,
        }
    }

    /// The key in its native encoding.
    pub fn serialize(&self) -> Vec<u8> {
        match self {
            Self::XOnly(pk) => pk.serialize().to_vec(),
            Self::Compressed(pk) => pk.serialize().to_vec(),
        }
    }
}

/// Parses a 32-byte x-only key.
pub fn parse_xonly_key(bytes: &[u8]) -> Result<XOnlyPublicKey, KeyError> {
    if bytes.len() != XONLY_PK_LEN {
        return Err(KeyError::InvalidLength {
            expected: XONLY_PK_LEN,
            found: bytes.len(),
        });
    }
    Ok(XOnlyPublicKey::from_slice(bytes)?)
}

/// Parses a 33-byte compressed key. Uncompressed encodings are rejected.
pub fn parse_compressed_key(bytes: &[u8]) -> Result<PublicKey, KeyError> {
    if bytes.len() != COMPRESSED_PK_LEN {
        return Err(KeyError::InvalidLength {
            expected: COMPRESSED_PK_LEN,
            found: bytes.len(),
        });
    }
    Ok(PublicKey::from_slice(bytes)?)
}

/// Parses a hex-encoded x-only key.
pub fn parse_xonly_key_hex(s: &str) -> Result<XOnlyPublicKey, KeyError> {
    let bytes = hex::decode(s).map_err(|e| KeyError::InvalidHex(e.to_string()))?;
    parse_xonly_key(&bytes)
}
