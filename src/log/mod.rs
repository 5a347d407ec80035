//! Wildcard log parsing: chip-tool attribute dump -> [`DeviceModel`].
//!
//! [`DeviceModel`]: crate::model::DeviceModel

pub mod parse;
pub mod row;

pub use parse::parse_wildcard_log;
pub use row::{Row, tokenize};

use std::borrow::Cow;
use tracing::warn;

/// Decode an uploaded dump. UTF-8 first; anything else is read as Latin-1,
/// which maps every byte to a char and so never fails.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(err) => {
            warn!(valid_up_to = err.valid_up_to(), "input is not UTF-8; decoding as Latin-1");
            Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())
        }
    }
}
