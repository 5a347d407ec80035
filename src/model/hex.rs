//! Serde helpers for Matter identifiers.
//!
//! Identifiers are written as `0x`-prefixed upper-case hex strings so that
//! JSON output reads like the Matter specification tables:
//!
//! `6`  =>  `"0x0006"`
//!
//! Reading accepts either a JSON number or a hex/decimal string (`"0x0000_0006"`
//! as printed by chip-tool works too).

use serde::de::{self, Deserializer, Visitor};
use serde::Serializer;
use std::fmt;

/// Format an identifier the way reports show it.
pub fn format_id(id: u32) -> String {
    if id > 0xFFFF {
        format!("0x{:08X}", id)
    } else {
        format!("0x{:04X}", id)
    }
}

/// Parse `"0x0000_001D"`, `"0x1D"` or `"29"` into a number.
pub fn parse_id(s: &str) -> Option<u32> {
    let s = s.trim();
    let cleaned: String = s.chars().filter(|c| *c != '_').collect();
    if let Some(hex) = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        return u32::from_str_radix(hex, 16).ok();
    }
    cleaned.parse::<u32>().ok()
}

pub fn serialize<S>(id: &u32, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_id(*id))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(IdVisitor)
}

struct IdVisitor;

impl Visitor<'_> for IdVisitor {
    type Value = u32;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an identifier as a number or a hex string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u32, E> {
        u32::try_from(v).map_err(|_| E::custom(format!("identifier {} out of range", v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u32, E> {
        u32::try_from(v).map_err(|_| E::custom(format!("identifier {} out of range", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u32, E> {
        parse_id(v).ok_or_else(|| E::custom(format!("bad identifier {:?}", v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_chip_tool_forms() {
        assert_eq!(parse_id("0x0000_001D"), Some(0x1D));
        assert_eq!(parse_id("0xFFFB"), Some(0xFFFB));
        assert_eq!(parse_id("29"), Some(29));
        assert_eq!(parse_id(" 0X1d "), Some(0x1D));
        assert_eq!(parse_id("Descriptor"), None);
        assert_eq!(parse_id(""), None);
    }

    #[test]
    fn formats_with_fixed_width() {
        assert_eq!(format_id(6), "0x0006");
        assert_eq!(format_id(0xFFFD), "0xFFFD");
        assert_eq!(format_id(0x0013_1BFC), "0x00131BFC");
    }
}
