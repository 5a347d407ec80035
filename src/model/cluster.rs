use crate::model::{ParseIssue, hex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which side of a cluster an endpoint implements.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ClusterSide {
    #[default]
    Server,
    Client,
}

impl ClusterSide {
    pub fn as_str(self) -> &'static str {
        match self {
            ClusterSide::Server => "server",
            ClusterSide::Client => "client",
        }
    }
}

/// An attribute or command id as listed by the device, with the name chip-tool
/// annotated it with (if any).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    #[serde(with = "hex")]
    pub id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Element {
    pub fn new(id: u32) -> Self {
        Self { id, name: None }
    }

    pub fn named(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }
}

/// An id that the device listed more than once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repeated<'a> {
    pub id: u32,
    pub name: Option<&'a str>,
    pub count: usize,
}

/// A cluster as observed on one endpoint.
///
/// Lists keep every entry the device reported, in order. Nothing is deduped
/// here: duplicate detection needs the raw multiplicity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterInstance {
    #[serde(with = "hex")]
    pub cluster_id: u32,
    #[serde(default)]
    pub cluster_name: Option<String>,
    #[serde(rename = "type")]
    pub side: ClusterSide,
    #[serde(default)]
    pub revision: Option<u16>,
    #[serde(default)]
    pub attributes: Vec<Element>,
    #[serde(default)]
    pub commands: Vec<Element>,
    #[serde(default)]
    pub generated_commands: Vec<Element>,
    #[serde(default)]
    pub feature_map: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<ParseIssue>,
}

impl ClusterInstance {
    pub fn new(cluster_id: u32, side: ClusterSide) -> Self {
        Self {
            cluster_id,
            cluster_name: None,
            side,
            revision: None,
            attributes: Vec::new(),
            commands: Vec::new(),
            generated_commands: Vec::new(),
            feature_map: None,
            issues: Vec::new(),
        }
    }

    pub fn has_feature(&self, bit: u8) -> bool {
        bit < 32 && self.feature_map.is_some_and(|map| map & (1 << bit) != 0)
    }
}

/// Ids listed more than once, in order of first appearance.
pub fn repeated_ids(elements: &[Element]) -> Vec<Repeated<'_>> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for e in elements {
        *counts.entry(e.id).or_default() += 1;
    }

    let mut out: Vec<Repeated<'_>> = Vec::new();
    for e in elements {
        let count = counts.get(&e.id).copied().unwrap_or(0);
        if count < 2 || out.iter().any(|r| r.id == e.id) {
            continue;
        }
        // Prefer whichever occurrence carried a name.
        let name = elements
            .iter()
            .filter(|o| o.id == e.id)
            .find_map(|o| o.name.as_deref());
        out.push(Repeated {
            id: e.id,
            name,
            count,
        });
    }
    out
}
