use crate::model::hex::format_id;
use crate::render::RenderContext;
use crate::report::{DeviceTypeOutcome, EndpointResult, ValidationReport};
use std::fmt::{self, Write};

const RULE: &str = "================================================================================";

const CHECKED: &[&str] = &[
    "Device type revisions",
    "Cluster revisions",
    "Mandatory attributes",
    "Mandatory accepted and generated commands",
    "Mandatory features (when applicable)",
    "Duplicate attributes and commands",
];

const NOT_VALIDATED: &[&str] = &[
    "Optional elements beyond the mandatory set and their dependencies",
    "Attribute values and their bounds",
    "Events (not present in wildcard logs)",
];

/// Render the human-readable compliance report.
pub fn render_text_report(report: &ValidationReport, ctx: &RenderContext) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_header(&mut out, report, ctx)?;
    write_summary(&mut out, report)?;
    write_overview(&mut out, report)?;

    writeln!(out, "\n{}\nPER-ENDPOINT DETAILED COMPLIANCE ANALYSIS\n{}", RULE, RULE)?;
    for ep in &report.endpoints {
        write_endpoint(&mut out, ep)?;
    }

    write_recommendations(&mut out, report)?;
    write_scope(&mut out, ctx)?;
    Ok(out)
}

fn write_header(out: &mut String, report: &ValidationReport, ctx: &RenderContext) -> fmt::Result {
    writeln!(out, "{}\nMATTER DEVICE COMPLIANCE REPORT\n{}", RULE, RULE)?;
    writeln!(out)?;
    if ctx.auto_detected {
        writeln!(out, "Auto-detected specification version: {}", report.spec_version)?;
        writeln!(out, "  (from SpecificationVersion in the wildcard log)")?;
    } else {
        writeln!(out, "Using specification version: {}", report.spec_version)?;
    }
    writeln!(out, "Validation against Matter {} specification", report.spec_version)
}

fn write_summary(out: &mut String, report: &ValidationReport) -> fmt::Result {
    let s = &report.summary;
    let status = if report.is_compliant() {
        "COMPLIANT"
    } else {
        "NON-COMPLIANT"
    };
    let rows = vec![
        vec!["Total Endpoints".to_string(), s.total_endpoints.to_string()],
        vec!["Compliant Endpoints".to_string(), s.compliant_endpoints.to_string()],
        vec!["Non-Compliant Endpoints".to_string(), s.non_compliant_endpoints.to_string()],
        vec!["Compliance Rate".to_string(), format!("{:.1}%", s.compliance_rate())],
        vec!["Total Missing Elements".to_string(), s.total_missing_elements.to_string()],
        vec!["Total Duplicate Elements".to_string(), s.total_duplicate_elements.to_string()],
        vec!["Total Revision Issues".to_string(), s.total_revision_issues.to_string()],
        vec!["Total Event Warnings".to_string(), s.total_event_warnings.to_string()],
        vec!["Overall Status".to_string(), status.to_string()],
    ];
    write_table(out, "OVERALL COMPLIANCE SUMMARY", &["Metric", "Value"], &rows)
}

fn write_overview(out: &mut String, report: &ValidationReport) -> fmt::Result {
    let rows: Vec<Vec<String>> = report
        .endpoints
        .iter()
        .map(|ep| {
            let names: Vec<&str> = ep
                .device_types
                .iter()
                .filter_map(|dt| dt.as_resolved()?.device_type_name.as_deref())
                .collect();
            vec![
                ep.endpoint.to_string(),
                status(ep.is_compliant).to_string(),
                truncate(&names.join(", "), 40),
                ep.findings.missing_elements.len().to_string(),
                ep.findings.duplicate_elements.len().to_string(),
                ep.findings.revision_issues.len().to_string(),
                ep.findings.event_warnings.len().to_string(),
            ]
        })
        .collect();
    write_table(
        out,
        "ENDPOINTS QUICK OVERVIEW",
        &["Endpoint", "Status", "Device Types", "Missing", "Duplicates", "Rev Issues", "Warnings"],
        &rows,
    )
}

fn write_endpoint(out: &mut String, ep: &EndpointResult) -> fmt::Result {
    if !ep.device_types.is_empty() {
        let rows: Vec<Vec<String>> = ep
            .device_types
            .iter()
            .map(|outcome| match outcome {
                DeviceTypeOutcome::Resolved(dt) => vec![
                    format_id(dt.device_type_id),
                    dt.device_type_name.clone().unwrap_or_else(|| "Unknown".to_string()),
                    status(dt.is_compliant).to_string(),
                    dt.cluster_validations.len().to_string(),
                ],
                DeviceTypeOutcome::Degraded(issue) => vec![
                    "Error".to_string(),
                    truncate(&issue.message, 50),
                    "Error".to_string(),
                    "0".to_string(),
                ],
            })
            .collect();
        write_table(
            out,
            &format!("Endpoint {} Device Types", ep.endpoint),
            &["Type ID", "Type Name", "Status", "Clusters"],
            &rows,
        )?;
    }

    let mut cluster_rows = Vec::new();
    for dt in ep.device_types.iter().filter_map(DeviceTypeOutcome::as_resolved) {
        let dt_name = dt.device_type_name.as_deref().unwrap_or("Unknown");
        for c in &dt.cluster_validations {
            let revisions = match c.findings.revision_issues.len() {
                0 => "OK".to_string(),
                n => format!("{} errors", n),
            };
            cluster_rows.push(vec![
                format_id(c.cluster_id),
                c.cluster_name.clone(),
                c.cluster_type.as_str().to_string(),
                dt_name.to_string(),
                status(c.is_compliant).to_string(),
                c.findings.missing_elements.len().to_string(),
                revisions,
            ]);
        }
    }
    if !cluster_rows.is_empty() {
        write_table(
            out,
            &format!("Endpoint {} Cluster Compliance", ep.endpoint),
            &["Cluster ID", "Cluster Name", "Type", "Device Type", "Status", "Missing", "Revisions"],
            &cluster_rows,
        )?;
    }

    writeln!(out, "\nEndpoint {} Recommendations:", ep.endpoint)?;
    for note in &ep.issues {
        writeln!(out, "  - Note: {}", note)?;
    }
    if ep.is_compliant {
        writeln!(out, "  - Endpoint is compliant; no action needed")?;
    } else {
        let f = &ep.findings;
        if !f.revision_issues.is_empty() {
            writeln!(out, "  - Fix {} revision issue(s):", f.revision_issues.len())?;
            for r in &f.revision_issues {
                let actual = r
                    .actual_revision
                    .map_or_else(|| "not reported".to_string(), |v| v.to_string());
                writeln!(
                    out,
                    "      * {}: revision on device is {} but the required revision is {}",
                    r.item_name, actual, r.required_revision
                )?;
            }
        }
        if !f.missing_elements.is_empty() {
            writeln!(out, "  - Add {} missing element(s):", f.missing_elements.len())?;
            for m in &f.missing_elements {
                writeln!(
                    out,
                    "      * {} {} is missing on {} cluster. {}",
                    m.name,
                    m.kind.as_str(),
                    m.cluster_name,
                    m.message
                )?;
            }
        }
        if !f.duplicate_elements.is_empty() {
            writeln!(out, "  - Remove {} duplicate element(s):", f.duplicate_elements.len())?;
            for d in &f.duplicate_elements {
                writeln!(
                    out,
                    "      * {} ({}) is listed {} times on {} cluster",
                    d.name,
                    format_id(d.id),
                    d.count,
                    d.cluster_name
                )?;
            }
        }
        for outcome in &ep.device_types {
            if let DeviceTypeOutcome::Degraded(issue) = outcome {
                writeln!(out, "  - Fix malformed DeviceTypeList entry: {}", issue.message)?;
            }
        }
    }

    if !ep.findings.event_warnings.is_empty() {
        writeln!(out, "  - Review event warnings (informational only):")?;
        for w in &ep.findings.event_warnings {
            writeln!(
                out,
                "      * Make sure {} event is present on {} cluster",
                w.event_name, w.cluster_name
            )?;
        }
    }
    Ok(())
}

fn write_recommendations(out: &mut String, report: &ValidationReport) -> fmt::Result {
    let s = &report.summary;
    writeln!(out, "\n{}\nOVERALL RECOMMENDATIONS\n{}", RULE, RULE)?;
    if s.non_compliant_endpoints > 0 {
        writeln!(out, "- Fix compliance issues in {} endpoint(s)", s.non_compliant_endpoints)?;
        writeln!(out, "- Check per-endpoint missing elements and revision issues")?;
        if s.total_duplicate_elements > 0 {
            writeln!(
                out,
                "- Remove {} duplicate element(s) from device clusters",
                s.total_duplicate_elements
            )?;
        }
        if s.total_revision_issues > 0 {
            writeln!(out, "- Update firmware to meet required revisions")?;
        }
    } else {
        writeln!(out, "- All endpoints are compliant")?;
        writeln!(out, "- All mandatory elements are present with the required revisions")?;
    }
    if s.total_event_warnings > 0 {
        writeln!(
            out,
            "- Review {} event warning(s) (they don't affect compliance)",
            s.total_event_warnings
        )?;
    }
    Ok(())
}

fn write_scope(out: &mut String, ctx: &RenderContext) -> fmt::Result {
    writeln!(out, "\n{}\nVALIDATION SCOPE\n{}", RULE, RULE)?;
    writeln!(out, "\nMandatory elements checked:")?;
    for item in CHECKED {
        writeln!(out, "  - {}", item)?;
    }
    writeln!(out, "\nNot validated (optional/provisional/disallowed/deprecated):")?;
    for item in NOT_VALIDATED {
        writeln!(out, "  - {}", item)?;
    }
    if !ctx.saved_files.is_empty() {
        writeln!(out, "\nDetailed results saved in:")?;
        for path in &ctx.saved_files {
            writeln!(out, "  - {}", path.display())?;
        }
    }
    writeln!(out, "{}", RULE)
}

fn status(compliant: bool) -> &'static str {
    if compliant { "Compliant" } else { "Non-Compliant" }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let head: String = s.chars().take(max).collect();
    format!("{}...", head)
}

/// Grid table, columns sized to their widest cell.
fn write_table(out: &mut String, title: &str, headers: &[&str], rows: &[Vec<String>]) -> fmt::Result {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for r in rows {
        for (w, cell) in widths.iter_mut().zip(r) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let border: String = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let border = format!("+{}+", border);

    let line = |out: &mut String, cells: &mut dyn Iterator<Item = &str>| -> fmt::Result {
        out.push('|');
        for (cell, w) in cells.zip(&widths) {
            let pad = w - cell.chars().count();
            write!(out, " {}{} |", cell, " ".repeat(pad))?;
        }
        out.push('\n');
        Ok(())
    };

    writeln!(out, "\n{}\n{}", title, "=".repeat(title.chars().count()))?;
    writeln!(out, "{}", border)?;
    line(out, &mut headers.iter().copied())?;
    writeln!(out, "{}", border.replace('-', "="))?;
    for r in rows {
        line(out, &mut r.iter().map(String::as_str))?;
        writeln!(out, "{}", border)?;
    }
    Ok(())
}
