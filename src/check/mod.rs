//! Conformance checker: [`DeviceModel`] + version + catalog -> [`ValidationReport`].
//!
//! Endpoints are independent, so they are validated in parallel; `collect`
//! keeps them in input order. Within an endpoint every device type is
//! validated on its own and the endpoint lists are the union of theirs.

mod cluster;
mod device_type;

use crate::catalog::SpecCatalog;
use crate::error::UnsupportedVersionError;
use crate::model::{DeviceModel, DeviceTypeEntry, Endpoint};
use crate::report::{DeviceTypeOutcome, EndpointResult, FindingSet, ValidationReport};
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Validate `model` against the rules of `version`.
///
/// Fails only when the catalog has no rules for `version`. Compliance
/// problems are data in the returned report.
pub fn validate(
    model: &DeviceModel,
    version: &str,
    catalog: &dyn SpecCatalog,
) -> crate::Result<ValidationReport> {
    if !catalog.supports(version) {
        return Err(UnsupportedVersionError {
            requested: version.to_string(),
            supported: catalog.supported_versions(),
        }
        .into());
    }

    let endpoints: Vec<EndpointResult> = model
        .endpoints
        .par_iter()
        .map(|ep| validate_endpoint(ep, version, catalog))
        .collect();

    let report = ValidationReport::new(version, endpoints);
    info!(
        version,
        endpoints = report.summary.total_endpoints,
        non_compliant = report.summary.non_compliant_endpoints,
        "validation finished"
    );
    Ok(report)
}

fn validate_endpoint(ep: &Endpoint, version: &str, catalog: &dyn SpecCatalog) -> EndpointResult {
    let mut findings = FindingSet::default();
    let mut degraded = false;
    let mut device_types = Vec::with_capacity(ep.device_types.len());

    for entry in &ep.device_types {
        match entry {
            DeviceTypeEntry::Parsed(dt) => {
                let result = device_type::validate_device_type(dt, version, catalog);
                findings.merge_unique(&result.findings);
                device_types.push(DeviceTypeOutcome::Resolved(result));
            }
            DeviceTypeEntry::Malformed(issue) => {
                warn!(endpoint = ep.id, line = ?issue.line, "{}", issue.message);
                degraded = true;
                device_types.push(DeviceTypeOutcome::Degraded(issue.clone()));
            }
        }
    }

    let issues: Vec<String> = ep
        .issues
        .iter()
        .map(|issue| match issue.line {
            Some(line) => format!("line {}: {}", line, issue.message),
            None => issue.message.clone(),
        })
        .collect();

    let is_compliant = !degraded && !findings.has_failures();
    debug!(endpoint = ep.id, is_compliant, "endpoint validated");

    EndpointResult {
        endpoint: ep.id,
        is_compliant,
        device_types,
        findings,
        issues,
    }
}
