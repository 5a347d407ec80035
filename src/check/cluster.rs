use crate::catalog::{ClusterRef, ClusterRequirement, ElementRequirement, FeatureRequirement};
use crate::model::hex::format_id;
use crate::model::{ClusterInstance, ClusterSide, Element, repeated_ids};
use crate::report::{
    ClusterValidation, DuplicateElement, ElementKind, EventWarning, FindingSet, MissingElement,
    RevisionIssue, RevisionItem, Severity, WarningKind,
};
use tracing::{debug, warn};

/// Validate one observed server cluster.
///
/// `rules` is the catalog definition for the target version (if any) and
/// `reference` the device type's entry for this cluster (if the device type
/// names it), whose extra mandatory elements are layered on top.
pub(crate) fn validate_server(
    observed: &ClusterInstance,
    rules: Option<&ClusterRequirement>,
    reference: Option<&ClusterRef>,
    version: &str,
) -> ClusterValidation {
    let cluster_name = display_name(observed, rules, reference);
    let mut issues: Vec<String> = observed.issues.iter().map(|i| i.message.clone()).collect();

    let Some(rules) = rules else {
        debug!(cluster = %format_id(observed.cluster_id), version, "cluster not in catalog");
        issues.push(format!(
            "cluster {} is not defined for Matter {}; not validated",
            format_id(observed.cluster_id),
            version
        ));
        return ClusterValidation {
            cluster_id: observed.cluster_id,
            cluster_name,
            cluster_type: ClusterSide::Server,
            revision: observed.revision,
            required_revision: None,
            is_compliant: true,
            findings: FindingSet::default(),
            issues,
        };
    };

    let (extra_attributes, extra_commands, extra_generated) = match reference {
        Some(r) => (
            r.attributes.as_slice(),
            r.commands.as_slice(),
            r.generated_commands.as_slice(),
        ),
        None => (&[][..], &[][..], &[][..]),
    };

    let mut findings = FindingSet::default();
    let lists = [
        (
            ElementKind::Attribute,
            "AttributeList",
            rules.attributes.as_slice(),
            extra_attributes,
            observed.attributes.as_slice(),
        ),
        (
            ElementKind::Command,
            "AcceptedCommandList",
            rules.commands.as_slice(),
            extra_commands,
            observed.commands.as_slice(),
        ),
        (
            ElementKind::GeneratedCommand,
            "GeneratedCommandList",
            rules.generated_commands.as_slice(),
            extra_generated,
            observed.generated_commands.as_slice(),
        ),
    ];
    for (kind, list_name, base, extra, present) in lists {
        check_missing(&mut findings, kind, list_name, base, extra, present, &cluster_name);
        check_duplicates(&mut findings, kind, base, present, &cluster_name);
    }

    check_features(&mut findings, observed, rules, reference, &cluster_name, &mut issues);

    if let Some(required) = rules.revision {
        if observed.revision != Some(required) {
            findings.push(RevisionIssue {
                item_name: cluster_name.clone(),
                item_type: RevisionItem::Cluster,
                item_id: observed.cluster_id,
                actual_revision: observed.revision,
                required_revision: required,
                severity: Severity::Error,
            });
        }
    }

    for event in &rules.events {
        findings.push(EventWarning {
            kind: WarningKind::EventRequirement,
            event_name: event.clone(),
            cluster_name: cluster_name.clone(),
            severity: Severity::Warning,
            message: format!(
                "Mandatory event {} on {} cannot be verified from a wildcard log",
                event, cluster_name
            ),
        });
    }

    ClusterValidation {
        cluster_id: observed.cluster_id,
        cluster_name,
        cluster_type: ClusterSide::Server,
        revision: observed.revision,
        required_revision: rules.revision,
        is_compliant: !findings.has_failures(),
        findings,
        issues,
    }
}

/// Client clusters carry no data in a wildcard log; presence is all there is
/// to check, and the caller already did.
pub(crate) fn validate_client(
    observed: &ClusterInstance,
    rules: Option<&ClusterRequirement>,
    reference: Option<&ClusterRef>,
) -> ClusterValidation {
    ClusterValidation {
        cluster_id: observed.cluster_id,
        cluster_name: display_name(observed, rules, reference),
        cluster_type: ClusterSide::Client,
        revision: None,
        required_revision: None,
        is_compliant: true,
        findings: FindingSet::default(),
        issues: Vec::new(),
    }
}

/// Catalog name first so reports read the same across devices, then whatever
/// chip-tool annotated, then the bare id.
fn display_name(
    observed: &ClusterInstance,
    rules: Option<&ClusterRequirement>,
    reference: Option<&ClusterRef>,
) -> String {
    rules
        .map(|r| r.name.clone())
        .or_else(|| reference.map(|r| r.name.clone()))
        .or_else(|| observed.cluster_name.clone())
        .unwrap_or_else(|| format_id(observed.cluster_id))
}

fn check_missing(
    findings: &mut FindingSet,
    kind: ElementKind,
    list_name: &str,
    base: &[ElementRequirement],
    extra: &[ElementRequirement],
    present: &[Element],
    cluster_name: &str,
) {
    let mut seen: Vec<u32> = Vec::new();
    for req in base.iter().chain(extra) {
        if !req.conformance.is_mandatory() || seen.contains(&req.id) {
            continue;
        }
        seen.push(req.id);
        if present.iter().any(|e| e.id == req.id) {
            continue;
        }
        findings.push(MissingElement {
            name: req.name.clone(),
            kind,
            id: req.id,
            cluster_name: cluster_name.to_string(),
            message: format!(
                "Mandatory {} {} ({}) is not in {}",
                kind.as_str(),
                req.name,
                format_id(req.id),
                list_name
            ),
        });
    }
}

fn check_duplicates(
    findings: &mut FindingSet,
    kind: ElementKind,
    known: &[ElementRequirement],
    present: &[Element],
    cluster_name: &str,
) {
    for rep in repeated_ids(present) {
        let name = rep
            .name
            .map(str::to_string)
            .or_else(|| known.iter().find(|k| k.id == rep.id).map(|k| k.name.clone()))
            .unwrap_or_else(|| format_id(rep.id));
        findings.push(DuplicateElement {
            name,
            kind,
            id: rep.id,
            count: rep.count,
            cluster_name: cluster_name.to_string(),
        });
    }
}

fn check_features(
    findings: &mut FindingSet,
    observed: &ClusterInstance,
    rules: &ClusterRequirement,
    reference: Option<&ClusterRef>,
    cluster_name: &str,
    issues: &mut Vec<String>,
) {
    let mut required: Vec<&FeatureRequirement> = rules
        .features
        .iter()
        .filter(|f| f.conformance.is_mandatory())
        .collect();
    for code in reference.map(|r| r.features.as_slice()).unwrap_or(&[]) {
        match rules.feature(code) {
            Some(feature) if !required.iter().any(|f| f.bit == feature.bit) => {
                required.push(feature);
            }
            Some(_) => {}
            None => {
                warn!(cluster = %format_id(rules.id), code = %code, "required feature code is not defined for cluster");
                issues.push(format!("required feature {} is not defined for {}", code, cluster_name));
            }
        }
    }

    for feature in required {
        let Some(mask) = 1u32.checked_shl(u32::from(feature.bit)) else {
            warn!(cluster = %format_id(rules.id), bit = feature.bit, "feature bit does not fit in FeatureMap");
            issues.push(format!(
                "feature {} uses bit {}, which does not fit in the 32-bit FeatureMap; not validated",
                feature.code, feature.bit
            ));
            continue;
        };
        if observed.has_feature(feature.bit) {
            continue;
        }
        let message = match observed.feature_map {
            Some(map) => format!(
                "Mandatory feature {} ({}) is not set in FeatureMap {}",
                feature.code,
                feature.name,
                format_id(map)
            ),
            None => format!(
                "Mandatory feature {} ({}) cannot be confirmed: FeatureMap not reported",
                feature.code, feature.name
            ),
        };
        findings.push(MissingElement {
            name: feature.name.clone(),
            kind: ElementKind::Feature,
            id: mask,
            cluster_name: cluster_name.to_string(),
            message,
        });
    }
}
