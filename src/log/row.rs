//! Line tokenizer for chip-tool wildcard reads.
//!
//! Each physical line is stripped of its logger prefix and classified into a
//! [`Row`]. Shapes recognised (after the prefix):
//!
//! ```text
//! Endpoint: 1 Cluster: 0x0000_0006 Attribute 0x0000_FFFB DataVersion: 42   Header
//!   AttributeList: 3 entries                                                ListStart
//!     [1]: {                                                                StructOpen
//!       DeviceType: 256 (On/Off Light)                                      Field
//!      }                                                                    StructClose
//!     [2]: 29 (Descriptor)                                                  Entry
//!   ClusterRevision: 6                                                      Field
//! ```

use crate::model::hex::parse_id;
use regex::Regex;
use std::sync::LazyLock;

/// Only rows emitted by chip-tool itself carry the attribute dump.
const DUMP_MODULE: &str = "TOO";

// [1718012345.123] [4242:4243] [TOO] <content>
static BRACKET_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\[[^\]]*\]\s*\[[^\]]*\]\s*\[([A-Za-z]+)\]\s?(.*)$").expect("valid regex")
});

// CHIP:TOO: <content>
static CHIP_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*CHIP:([A-Za-z]+):\s?(.*)$").expect("valid regex"));

const NUM: &str = r"(0[xX][0-9A-Fa-f_]+|\d+)";

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"Endpoint:\s*{NUM}\s+Cluster:\s*{NUM}\s+Attribute:?\s*{NUM}"
    ))
    .expect("valid regex")
});

static LIST_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z][A-Za-z0-9_]*)\s*:\s*(\d+)\s+entr(?:y|ies)\s*$").expect("valid regex")
});

static STRUCT_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[(\d+)\]\s*:\s*\{\s*$").expect("valid regex"));

static ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[(\d+)\]\s*:\s*(.*?)\s*$").expect("valid regex"));

static STRUCT_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\}\s*,?\s*$").expect("valid regex"));

static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z][A-Za-z0-9_]*)\s*:\s*(.*?)\s*$").expect("valid regex")
});

// 29 (Descriptor) / 0x0000_001D / 65533
static ANNOTATED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0[xX][0-9A-Fa-f_]+|\d+)\s*(?:\((.*)\))?\s*$").expect("valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row<'a> {
    Header {
        endpoint: u32,
        cluster: u32,
        attribute: u32,
    },
    ListStart {
        name: &'a str,
        count: usize,
    },
    StructOpen {
        index: usize,
    },
    Entry {
        index: usize,
        value: &'a str,
    },
    StructClose,
    Field {
        name: &'a str,
        value: &'a str,
    },
    Blank,
    Other(&'a str),
}

/// Classify one raw line. Returns `None` for lines logged by other modules
/// (`[DMG]`, `[EM]`, ...), which never carry dump content.
pub fn tokenize(raw: &str) -> Option<Row<'_>> {
    let content = strip_prefix(raw)?;
    Some(classify(content))
}

fn strip_prefix(raw: &str) -> Option<&str> {
    for re in [&*BRACKET_PREFIX_RE, &*CHIP_PREFIX_RE] {
        if let Some(caps) = re.captures(raw) {
            let module = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            if !module.eq_ignore_ascii_case(DUMP_MODULE) {
                return None;
            }
            return Some(caps.get(2).map(|m| m.as_str()).unwrap_or_default());
        }
    }
    Some(raw)
}

fn classify(content: &str) -> Row<'_> {
    if content.trim().is_empty() {
        return Row::Blank;
    }

    if let Some(caps) = HEADER_RE.captures(content) {
        let num = |i: usize| caps.get(i).and_then(|m| parse_id(m.as_str()));
        if let (Some(endpoint), Some(cluster), Some(attribute)) = (num(1), num(2), num(3)) {
            return Row::Header {
                endpoint,
                cluster,
                attribute,
            };
        }
    }

    if let Some(caps) = LIST_START_RE.captures(content) {
        if let (Some(name), Some(count)) = (
            caps.get(1),
            caps.get(2).and_then(|m| m.as_str().parse::<usize>().ok()),
        ) {
            return Row::ListStart {
                name: name.as_str(),
                count,
            };
        }
    }

    if let Some(index) = STRUCT_OPEN_RE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<usize>().ok())
    {
        return Row::StructOpen { index };
    }

    if let Some(caps) = ENTRY_RE.captures(content) {
        if let (Some(index), Some(value)) = (
            caps.get(1).and_then(|m| m.as_str().parse::<usize>().ok()),
            caps.get(2),
        ) {
            return Row::Entry {
                index,
                value: value.as_str(),
            };
        }
    }

    if STRUCT_CLOSE_RE.is_match(content) {
        return Row::StructClose;
    }

    if let Some(caps) = FIELD_RE.captures(content) {
        if let (Some(name), Some(value)) = (caps.get(1), caps.get(2)) {
            return Row::Field {
                name: name.as_str(),
                value: value.as_str(),
            };
        }
    }

    Row::Other(content.trim())
}

/// Parse a list entry / field value such as `29 (Descriptor)` into its number
/// and optional annotation.
pub fn parse_annotated(value: &str) -> Option<(u32, Option<String>)> {
    let caps = ANNOTATED_RE.captures(value.trim())?;
    let id = parse_id(caps.get(1)?.as_str())?;
    let name = caps
        .get(2)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    Some((id, name))
}
