//! Field adapters for the JSON form of [`ProtocolParams`](crate::ProtocolParams).

use bitcoin::Amount;
use serde::{
    Deserialize, Deserializer, Serializer,
    de::{Error, Unexpected},
};
use tapstake_primitives::MagicBytes;

/// A strictly positive amount written as integer satoshis.
pub mod serde_amount_sat {
    use super::*;

    pub fn serialize<S: Serializer>(v: &Amount, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(v.to_sat())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Amount, D::Error> {
        match u64::deserialize(d)? {
            0 => Err(D::Error::invalid_value(
                Unexpected::Unsigned(0),
                &"a positive number of satoshis",
            )),
            sats => Ok(Amount::from_sat(sats)),
        }
    }
}

/// Magic bytes as four ASCII characters or eight hex digits. Printable tags are
/// written back as ASCII.
pub mod serde_magic_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(v: &MagicBytes, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(v)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<MagicBytes, D::Error> {
        let tag = String::deserialize(d)?;
        tag.parse().map_err(|_| {
            D::Error::invalid_value(
                Unexpected::Str(&tag),
                &"4 ASCII characters or 8 hex digits",
            )
        })
    }
}
