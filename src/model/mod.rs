//! Parsed device topology: endpoints -> device types -> clusters.
//!
//! Produced by the wildcard log parser and consumed by the conformance checker.
//! The whole tree is plain data (serde-friendly) so a parsed model can be saved
//! as `parsed_data.json` and validated again later against another version.

pub mod cluster;
pub mod hex;

pub use cluster::{ClusterInstance, ClusterSide, Element, Repeated, repeated_ids};

use serde::{Deserialize, Serialize};

/// A record the parser could not make sense of.
///
/// Serialized with an `error` key so that degraded entries are recognisable in
/// `parsed_data.json` and in validation results alike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseIssue {
    #[serde(rename = "error")]
    pub message: String,
    /// 1-based line in the input text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl ParseIssue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
        }
    }

    pub fn at(line: usize, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
        }
    }
}

/// A device type declared in an endpoint's DeviceTypeList.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceTypeInstance {
    #[serde(with = "hex")]
    pub device_type_id: u32,
    #[serde(default)]
    pub device_type_name: Option<String>,
    pub revision: u16,
    /// The endpoint's clusters; every device type on an endpoint shares them.
    #[serde(default)]
    pub clusters: Vec<ClusterInstance>,
}

impl DeviceTypeInstance {
    pub fn cluster(&self, id: u32, side: ClusterSide) -> Option<&ClusterInstance> {
        self.clusters
            .iter()
            .find(|c| c.cluster_id == id && c.side == side)
    }
}

/// One DeviceTypeList entry: either fully parsed or degraded to the problem
/// that stopped it from parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeviceTypeEntry {
    Parsed(DeviceTypeInstance),
    Malformed(ParseIssue),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: u16,
    #[serde(default)]
    pub device_types: Vec<DeviceTypeEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<ParseIssue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceModel {
    pub endpoints: Vec<Endpoint>,
    /// Raw SpecificationVersion value, exactly as printed in the dump.
    #[serde(default)]
    pub spec_version_hint: Option<String>,
    /// Reports that could not be attached to any endpoint.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<ParseIssue>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn malformed_entries_survive_json() {
        let ep = Endpoint {
            id: 1,
            device_types: vec![
                DeviceTypeEntry::Parsed(DeviceTypeInstance {
                    device_type_id: 0x0100,
                    device_type_name: None,
                    revision: 3,
                    clusters: vec![ClusterInstance::new(0x0006, ClusterSide::Server)],
                }),
                DeviceTypeEntry::Malformed(ParseIssue::at(12, "missing DeviceType field")),
            ],
            issues: vec![],
        };

        let json = serde_json::to_value(&ep).unwrap();
        assert_eq!(json["device_types"][0]["device_type_id"], "0x0100");
        assert_eq!(json["device_types"][0]["clusters"][0]["type"], "server");
        assert_eq!(json["device_types"][1]["error"], "missing DeviceType field");
        assert_eq!(json["device_types"][1]["line"], 12);

        let back: Endpoint = serde_json::from_value(json).unwrap();
        assert_eq!(back, ep);
    }
}
