//! Validation results.
//!
//! Everything here is plain owned data: a report never borrows from the model
//! it was computed from, and it round-trips through `validation_results.json`.

use crate::model::{ClusterSide, ParseIssue, hex};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Cluster,
    Attribute,
    Command,
    GeneratedCommand,
    Feature,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Cluster => "cluster",
            ElementKind::Attribute => "attribute",
            ElementKind::Command => "command",
            ElementKind::GeneratedCommand => "generated command",
            ElementKind::Feature => "feature",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionItem {
    DeviceType,
    Cluster,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    EventRequirement,
}

/// A mandatory element the device does not expose.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MissingElement {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// Element id; for features, the FeatureMap mask of the feature bit.
    #[serde(with = "hex")]
    pub id: u32,
    pub cluster_name: String,
    pub message: String,
}

/// An id listed `count` times in one of a cluster's lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DuplicateElement {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(with = "hex")]
    pub id: u32,
    pub count: usize,
    pub cluster_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RevisionIssue {
    pub item_name: String,
    pub item_type: RevisionItem,
    #[serde(with = "hex")]
    pub item_id: u32,
    /// `None` when the device never reported a revision.
    pub actual_revision: Option<u16>,
    pub required_revision: u16,
    pub severity: Severity,
}

/// Informational only. Never affects compliance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventWarning {
    #[serde(rename = "type")]
    pub kind: WarningKind,
    pub event_name: String,
    pub cluster_name: String,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Finding {
    Missing(MissingElement),
    Duplicate(DuplicateElement),
    Revision(RevisionIssue),
    Event(EventWarning),
}

impl From<MissingElement> for Finding {
    fn from(f: MissingElement) -> Self {
        Finding::Missing(f)
    }
}

impl From<DuplicateElement> for Finding {
    fn from(f: DuplicateElement) -> Self {
        Finding::Duplicate(f)
    }
}

impl From<RevisionIssue> for Finding {
    fn from(f: RevisionIssue) -> Self {
        Finding::Revision(f)
    }
}

impl From<EventWarning> for Finding {
    fn from(f: EventWarning) -> Self {
        Finding::Event(f)
    }
}

/// The four finding lists carried at every level of the report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingSet {
    #[serde(default)]
    pub missing_elements: Vec<MissingElement>,
    #[serde(default)]
    pub duplicate_elements: Vec<DuplicateElement>,
    #[serde(default)]
    pub revision_issues: Vec<RevisionIssue>,
    #[serde(default)]
    pub event_warnings: Vec<EventWarning>,
}

impl FindingSet {
    pub fn push(&mut self, finding: impl Into<Finding>) {
        match finding.into() {
            Finding::Missing(f) => self.missing_elements.push(f),
            Finding::Duplicate(f) => self.duplicate_elements.push(f),
            Finding::Revision(f) => self.revision_issues.push(f),
            Finding::Event(f) => self.event_warnings.push(f),
        }
    }

    /// Append everything from `other` that is not already present.
    pub fn merge_unique(&mut self, other: &FindingSet) {
        fn extend<T: Clone + PartialEq>(into: &mut Vec<T>, from: &[T]) {
            for item in from {
                if !into.contains(item) {
                    into.push(item.clone());
                }
            }
        }
        extend(&mut self.missing_elements, &other.missing_elements);
        extend(&mut self.duplicate_elements, &other.duplicate_elements);
        extend(&mut self.revision_issues, &other.revision_issues);
        extend(&mut self.event_warnings, &other.event_warnings);
    }

    /// Missing, duplicate or revision findings. Event warnings don't count.
    pub fn has_failures(&self) -> bool {
        !self.missing_elements.is_empty()
            || !self.duplicate_elements.is_empty()
            || !self.revision_issues.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_failures() && self.event_warnings.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterValidation {
    #[serde(with = "hex")]
    pub cluster_id: u32,
    pub cluster_name: String,
    pub cluster_type: ClusterSide,
    pub revision: Option<u16>,
    pub required_revision: Option<u16>,
    pub is_compliant: bool,
    #[serde(flatten)]
    pub findings: FindingSet,
    /// Catalog gaps and parse notes. Informational.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceTypeResult {
    #[serde(with = "hex")]
    pub device_type_id: u32,
    pub device_type_name: Option<String>,
    pub revision: u16,
    pub required_revision: Option<u16>,
    pub is_compliant: bool,
    pub cluster_validations: Vec<ClusterValidation>,
    #[serde(flatten)]
    pub findings: FindingSet,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
}

/// Result for one DeviceTypeList entry. A malformed entry is carried through
/// as the parse problem that degraded it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeviceTypeOutcome {
    Resolved(DeviceTypeResult),
    Degraded(ParseIssue),
}

impl DeviceTypeOutcome {
    pub fn as_resolved(&self) -> Option<&DeviceTypeResult> {
        match self {
            DeviceTypeOutcome::Resolved(r) => Some(r),
            DeviceTypeOutcome::Degraded(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointResult {
    pub endpoint: u16,
    pub is_compliant: bool,
    pub device_types: Vec<DeviceTypeOutcome>,
    /// Union of the device types' findings, each distinct finding once.
    #[serde(flatten)]
    pub findings: FindingSet,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_endpoints: usize,
    pub compliant_endpoints: usize,
    pub non_compliant_endpoints: usize,
    pub total_missing_elements: usize,
    pub total_revision_issues: usize,
    pub total_event_warnings: usize,
    pub total_duplicate_elements: usize,
}

impl Summary {
    pub fn from_endpoints(endpoints: &[EndpointResult]) -> Self {
        let mut summary = Summary {
            total_endpoints: endpoints.len(),
            ..Summary::default()
        };
        for ep in endpoints {
            if ep.is_compliant {
                summary.compliant_endpoints += 1;
            } else {
                summary.non_compliant_endpoints += 1;
            }
            summary.total_missing_elements += ep.findings.missing_elements.len();
            summary.total_duplicate_elements += ep.findings.duplicate_elements.len();
            summary.total_revision_issues += ep.findings.revision_issues.len();
            summary.total_event_warnings += ep.findings.event_warnings.len();
        }
        summary
    }

    /// Percentage of compliant endpoints; 0 when there are none.
    pub fn compliance_rate(&self) -> f64 {
        if self.total_endpoints == 0 {
            return 0.0;
        }
        self.compliant_endpoints as f64 * 100.0 / self.total_endpoints as f64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub spec_version: String,
    pub summary: Summary,
    pub endpoints: Vec<EndpointResult>,
}

impl ValidationReport {
    pub fn new(spec_version: impl Into<String>, endpoints: Vec<EndpointResult>) -> Self {
        Self {
            spec_version: spec_version.into(),
            summary: Summary::from_endpoints(&endpoints),
            endpoints,
        }
    }

    pub fn is_compliant(&self) -> bool {
        self.summary.non_compliant_endpoints == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn missing(id: u32) -> MissingElement {
        MissingElement {
            name: "OnOff".to_string(),
            kind: ElementKind::Attribute,
            id,
            cluster_name: "On/Off".to_string(),
            message: "Mandatory attribute OnOff (0x0000) is not in AttributeList".to_string(),
        }
    }

    fn warning() -> EventWarning {
        EventWarning {
            kind: WarningKind::EventRequirement,
            event_name: "StartUp".to_string(),
            cluster_name: "Basic Information".to_string(),
            severity: Severity::Warning,
            message: "Mandatory event StartUp cannot be checked from a wildcard log".to_string(),
        }
    }

    #[test]
    fn merge_counts_identical_findings_once() {
        let mut a = FindingSet::default();
        a.push(missing(0));
        let mut b = FindingSet::default();
        b.push(missing(0));
        b.push(missing(0x4000));

        a.merge_unique(&b);
        let ids: Vec<u32> = a.missing_elements.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![0, 0x4000]);
    }

    #[test]
    fn warnings_are_not_failures() {
        let mut set = FindingSet::default();
        assert!(set.is_empty());
        set.push(warning());
        assert!(!set.has_failures());
        assert!(!set.is_empty());
    }

    #[test]
    fn summary_counts_endpoint_lists() {
        let mut findings = FindingSet::default();
        findings.push(missing(0));
        findings.push(warning());
        let endpoints = vec![
            EndpointResult {
                endpoint: 0,
                is_compliant: true,
                device_types: vec![],
                findings: FindingSet::default(),
                issues: vec![],
            },
            EndpointResult {
                endpoint: 1,
                is_compliant: false,
                device_types: vec![],
                findings,
                issues: vec![],
            },
        ];
        let report = ValidationReport::new("1.4", endpoints);
        assert_eq!(
            report.summary,
            Summary {
                total_endpoints: 2,
                compliant_endpoints: 1,
                non_compliant_endpoints: 1,
                total_missing_elements: 1,
                total_revision_issues: 0,
                total_event_warnings: 1,
                total_duplicate_elements: 0,
            }
        );
        assert_eq!(report.summary.compliance_rate(), 50.0);
        assert!(!report.is_compliant());
    }

    #[test]
    fn finding_lists_are_flattened_in_json() {
        let mut findings = FindingSet::default();
        findings.push(RevisionIssue {
            item_name: "On/Off".to_string(),
            item_type: RevisionItem::Cluster,
            item_id: 6,
            actual_revision: None,
            required_revision: 6,
            severity: Severity::Error,
        });
        let result = EndpointResult {
            endpoint: 1,
            is_compliant: false,
            device_types: vec![DeviceTypeOutcome::Degraded(ParseIssue::at(
                4,
                "DeviceTypeList entry [1] has no Revision field",
            ))],
            findings,
            issues: vec![],
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["revision_issues"][0]["item_type"], "cluster");
        assert_eq!(json["revision_issues"][0]["item_id"], "0x0006");
        assert!(json["revision_issues"][0]["actual_revision"].is_null());
        assert_eq!(json["revision_issues"][0]["severity"], "error");
        assert_eq!(json["missing_elements"], serde_json::json!([]));
        assert_eq!(json["device_types"][0]["line"], 4);
        assert!(json.get("issues").is_none());

        let back: EndpointResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }
}
