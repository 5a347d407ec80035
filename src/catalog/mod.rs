//! Specification catalog: per-version mandatory-element rules.
//!
//! The checker only talks to the [`SpecCatalog`] trait. Every version is an
//! independent rule set looked up by its exact name; asking for `"1.4.1"` never
//! falls back to `"1.4"` data.

pub mod json;

pub use json::{JsonCatalog, VersionFile};

use crate::model::{ClusterSide, hex};
use serde::{Deserialize, Serialize};

/// How the specification classifies an element for a given version.
///
/// Only `Mandatory` elements are validated. Everything else (optional,
/// feature-gated, provisional, deprecated, disallowed) is carried in the
/// catalog for reference and skipped by the checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conformance {
    #[default]
    #[serde(alias = "M")]
    Mandatory,
    #[serde(alias = "O")]
    Optional,
    #[serde(alias = "C")]
    Conditional,
    #[serde(alias = "P")]
    Provisional,
    #[serde(alias = "D")]
    Deprecated,
    #[serde(alias = "X")]
    Disallowed,
}

impl Conformance {
    pub fn is_mandatory(self) -> bool {
        self == Conformance::Mandatory
    }
}

/// An attribute or command the specification defines for a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRequirement {
    #[serde(with = "hex")]
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub conformance: Conformance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRequirement {
    /// Bit position in FeatureMap.
    pub bit: u8,
    /// Short feature code, e.g. `LT`.
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub conformance: Conformance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRequirement {
    #[serde(with = "hex")]
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub side: ClusterSide,
    #[serde(default)]
    pub revision: Option<u16>,
    #[serde(default)]
    pub attributes: Vec<ElementRequirement>,
    #[serde(default)]
    pub commands: Vec<ElementRequirement>,
    #[serde(default)]
    pub generated_commands: Vec<ElementRequirement>,
    #[serde(default)]
    pub features: Vec<FeatureRequirement>,
    /// Events a conforming server must be able to emit.
    #[serde(default)]
    pub events: Vec<String>,
}

impl ClusterRequirement {
    pub fn feature(&self, code: &str) -> Option<&FeatureRequirement> {
        self.features
            .iter()
            .find(|f| f.code.eq_ignore_ascii_case(code))
    }
}

/// A cluster a device type requires, plus anything the device type makes
/// mandatory on top of the cluster's own rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRef {
    #[serde(with = "hex")]
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub side: ClusterSide,
    #[serde(default)]
    pub conformance: Conformance,
    #[serde(default)]
    pub attributes: Vec<ElementRequirement>,
    #[serde(default)]
    pub commands: Vec<ElementRequirement>,
    #[serde(default)]
    pub generated_commands: Vec<ElementRequirement>,
    /// Feature codes, resolved against the cluster definition.
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceTypeRequirement {
    #[serde(with = "hex")]
    pub id: u32,
    pub name: String,
    pub revision: u16,
    #[serde(default)]
    pub clusters: Vec<ClusterRef>,
}

/// Read-only, versioned lookup of specification rules.
///
/// Implementations are shared across worker threads during validation.
pub trait SpecCatalog: Send + Sync {
    /// Every version this catalog can validate against, sorted.
    fn supported_versions(&self) -> Vec<String>;

    fn device_type(&self, version: &str, id: u32) -> Option<&DeviceTypeRequirement>;

    fn cluster(&self, version: &str, id: u32, side: ClusterSide) -> Option<&ClusterRequirement>;

    fn supports(&self, version: &str) -> bool {
        self.supported_versions().iter().any(|v| v == version)
    }
}
