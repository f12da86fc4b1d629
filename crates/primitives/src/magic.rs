use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{ValidationError, constants::MAGIC_BYTES_LEN};

/// The 4-byte tag that prefixes every data-embed payload of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MagicBytes([u8; MAGIC_BYTES_LEN]);

impl MagicBytes {
    pub const fn new(bytes: [u8; MAGIC_BYTES_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; MAGIC_BYTES_LEN] {
        &self.0
    }
}

impl TryFrom<&[u8]> for MagicBytes {
    type Error = ValidationError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; MAGIC_BYTES_LEN] = value
            .try_into()
            .map_err(|_| ValidationError::InvalidMagicBytes(value.len()))?;
        Ok(Self(bytes))
    }
}

/// Printable tags render as ASCII, anything else as hex.
impl fmt::Display for MagicBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.iter().all(u8::is_ascii_graphic) {
            // all bytes are ASCII, so this is valid UTF-8
            f.write_str(&String::from_utf8_lossy(&self.0))
        } else {
            f.write_str(&hex::encode(self.0))
        }
    }
}

/// Accepts either four ASCII characters or eight hex digits.
impl FromStr for MagicBytes {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == MAGIC_BYTES_LEN * 2 {
            if let Ok(bytes) = hex::decode(s) {
                return Self::try_from(bytes.as_slice());
            }
        }
        Self::try_from(s.as_bytes())
    }
}
