use crate::catalog::SpecCatalog;
use crate::check::cluster;
use crate::model::hex::format_id;
use crate::model::{ClusterSide, DeviceTypeInstance};
use crate::report::{
    DeviceTypeResult, ElementKind, FindingSet, MissingElement, RevisionIssue, RevisionItem,
    Severity,
};
use tracing::debug;

/// Validate one parsed device type against the rules of `version`.
///
/// Every cluster the endpoint exposes is validated (implementing a cluster
/// makes its mandatory elements mandatory), in the order the dump listed
/// them. Required clusters the endpoint lacks are reported afterwards.
pub(crate) fn validate_device_type(
    dt: &DeviceTypeInstance,
    version: &str,
    catalog: &dyn SpecCatalog,
) -> DeviceTypeResult {
    let Some(rules) = catalog.device_type(version, dt.device_type_id) else {
        debug!(device_type = %format_id(dt.device_type_id), version, "device type not in catalog");
        return DeviceTypeResult {
            device_type_id: dt.device_type_id,
            device_type_name: dt.device_type_name.clone(),
            revision: dt.revision,
            required_revision: None,
            is_compliant: true,
            cluster_validations: Vec::new(),
            findings: FindingSet::default(),
            issues: vec![format!(
                "device type {} is not defined for Matter {}; not validated",
                format_id(dt.device_type_id),
                version
            )],
        };
    };

    let mut findings = FindingSet::default();
    if dt.revision != rules.revision {
        findings.push(RevisionIssue {
            item_name: rules.name.clone(),
            item_type: RevisionItem::DeviceType,
            item_id: dt.device_type_id,
            actual_revision: Some(dt.revision),
            required_revision: rules.revision,
            severity: Severity::Error,
        });
    }

    let mut cluster_validations = Vec::with_capacity(dt.clusters.len());
    for observed in &dt.clusters {
        let reference = rules
            .clusters
            .iter()
            .find(|r| r.id == observed.cluster_id && r.side == observed.side);
        let cluster_rules = catalog.cluster(version, observed.cluster_id, observed.side);
        let validation = match observed.side {
            ClusterSide::Server => {
                cluster::validate_server(observed, cluster_rules, reference, version)
            }
            ClusterSide::Client => cluster::validate_client(observed, cluster_rules, reference),
        };
        findings.merge_unique(&validation.findings);
        cluster_validations.push(validation);
    }

    for required in rules.clusters.iter().filter(|r| r.conformance.is_mandatory()) {
        if dt.cluster(required.id, required.side).is_some() {
            continue;
        }
        findings.push(MissingElement {
            name: required.name.clone(),
            kind: ElementKind::Cluster,
            id: required.id,
            cluster_name: required.name.clone(),
            message: format!(
                "Mandatory {} cluster required by {} ({}) is not in {}",
                required.side.as_str(),
                rules.name,
                format_id(rules.id),
                match required.side {
                    ClusterSide::Server => "ServerList",
                    ClusterSide::Client => "ClientList",
                }
            ),
        });
    }

    DeviceTypeResult {
        device_type_id: dt.device_type_id,
        device_type_name: dt
            .device_type_name
            .clone()
            .or_else(|| Some(rules.name.clone())),
        revision: dt.revision,
        required_revision: Some(rules.revision),
        is_compliant: !findings.has_failures(),
        cluster_validations,
        findings,
        issues: Vec::new(),
    }
}
