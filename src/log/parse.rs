use crate::error::ParseError;
use crate::log::row::{Row, parse_annotated, tokenize};
use crate::model::hex::{format_id, parse_id};
use crate::model::{
    ClusterInstance, ClusterSide, DeviceModel, DeviceTypeEntry, DeviceTypeInstance, Element,
    Endpoint, ParseIssue,
};
use std::collections::BTreeMap;
use tracing::{debug, warn};

mod ids {
    pub const DESCRIPTOR: u32 = 0x001D;
    pub const BASIC_INFORMATION: u32 = 0x0028;

    pub const DEVICE_TYPE_LIST: u32 = 0x0000;
    pub const SERVER_LIST: u32 = 0x0001;
    pub const CLIENT_LIST: u32 = 0x0002;
    pub const SPECIFICATION_VERSION: u32 = 0x0015;

    pub const GENERATED_COMMAND_LIST: u32 = 0xFFF8;
    pub const ACCEPTED_COMMAND_LIST: u32 = 0xFFF9;
    pub const ATTRIBUTE_LIST: u32 = 0xFFFB;
    pub const FEATURE_MAP: u32 = 0xFFFC;
    pub const CLUSTER_REVISION: u32 = 0xFFFD;
}

/// One attribute report: the header line plus the body lines up to the next
/// header.
#[derive(Debug)]
struct Record<'a> {
    line: usize,
    endpoint: u32,
    cluster: u32,
    attribute: u32,
    body: Vec<(usize, Row<'a>)>,
}

impl Record<'_> {
    fn describe(&self) -> String {
        format!(
            "endpoint {} cluster {} attribute {}",
            self.endpoint,
            format_id(self.cluster),
            format_id(self.attribute)
        )
    }

    /// First `Name: value` row of the body, for scalar attributes.
    fn scalar(&self) -> Option<(usize, &str)> {
        self.body.iter().find_map(|(lno, row)| match row {
            Row::Field { value, .. } => Some((*lno, *value)),
            _ => None,
        })
    }
}

/// Parse a chip-tool wildcard read (`any read-by-id 0xFFFFFFFF 0xFFFFFFFF`)
/// into a device model.
///
/// Only an input with no usable attribute report is an error. Anything odd
/// inside an otherwise recognisable dump is kept as a [`ParseIssue`] on the
/// endpoint, cluster or device type it belongs to, or on the model itself
/// when no endpoint can own it.
pub fn parse_wildcard_log(text: &str) -> Result<DeviceModel, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let records = split_records(text);
    if records.is_empty() {
        return Err(ParseError::NoRecords {
            lines: text.lines().count(),
        });
    }
    debug!(records = records.len(), "split wildcard log into attribute reports");

    let mut builder = ModelBuilder::default();
    for record in &records {
        builder.apply(record);
    }
    if builder.endpoints.is_empty() {
        return Err(ParseError::NoRecords {
            lines: text.lines().count(),
        });
    }
    Ok(builder.finish())
}

fn split_records(text: &str) -> Vec<Record<'_>> {
    let mut records: Vec<Record<'_>> = Vec::new();
    for (lineno, raw) in text.lines().enumerate() {
        let lno = lineno + 1;
        let Some(row) = tokenize(raw) else {
            continue;
        };
        match row {
            Row::Header {
                endpoint,
                cluster,
                attribute,
            } => records.push(Record {
                line: lno,
                endpoint,
                cluster,
                attribute,
                body: Vec::new(),
            }),
            Row::Blank => {}
            row => {
                // Anything before the first header is preamble.
                if let Some(current) = records.last_mut() {
                    current.body.push((lno, row));
                }
            }
        }
    }
    records
}

#[derive(Debug)]
struct EndpointBuilder {
    id: u16,
    device_types: Option<Vec<DeviceTypeEntry>>,
    clusters: Vec<ClusterInstance>,
    index: BTreeMap<(u32, ClusterSide), usize>,
    issues: Vec<ParseIssue>,
    /// Issues of the current DeviceTypeList report; replaced with it.
    device_type_issues: Vec<ParseIssue>,
}

impl EndpointBuilder {
    fn new(id: u16) -> Self {
        Self {
            id,
            device_types: None,
            clusters: Vec::new(),
            index: BTreeMap::new(),
            issues: Vec::new(),
            device_type_issues: Vec::new(),
        }
    }

    fn cluster(&mut self, id: u32, side: ClusterSide) -> &mut ClusterInstance {
        let next = self.clusters.len();
        let slot = *self.index.entry((id, side)).or_insert(next);
        if slot == next {
            self.clusters.push(ClusterInstance::new(id, side));
        }
        &mut self.clusters[slot]
    }

    fn finish(self) -> Endpoint {
        let mut issues = self.device_type_issues;
        issues.extend(self.issues);
        let device_types = match self.device_types {
            Some(entries) => entries
                .into_iter()
                .map(|entry| match entry {
                    DeviceTypeEntry::Parsed(mut dt) => {
                        dt.clusters = self.clusters.clone();
                        DeviceTypeEntry::Parsed(dt)
                    }
                    malformed => malformed,
                })
                .collect(),
            None => {
                if !self.clusters.is_empty() {
                    warn!(endpoint = self.id, "endpoint reports clusters but no DeviceTypeList");
                    issues.push(ParseIssue::new(format!(
                        "no DeviceTypeList reported; {} cluster(s) are not attributed to any device type",
                        self.clusters.len()
                    )));
                }
                Vec::new()
            }
        };

        Endpoint {
            id: self.id,
            device_types,
            issues,
        }
    }
}

#[derive(Debug, Default)]
struct ModelBuilder {
    endpoints: Vec<EndpointBuilder>,
    index: BTreeMap<u16, usize>,
    spec_version_hint: Option<String>,
    issues: Vec<ParseIssue>,
}

impl ModelBuilder {
    fn endpoint(&mut self, id: u16) -> &mut EndpointBuilder {
        let next = self.endpoints.len();
        let slot = *self.index.entry(id).or_insert(next);
        if slot == next {
            self.endpoints.push(EndpointBuilder::new(id));
        }
        &mut self.endpoints[slot]
    }

    fn apply(&mut self, record: &Record<'_>) {
        let Ok(endpoint_id) = u16::try_from(record.endpoint) else {
            warn!(line = record.line, endpoint = record.endpoint, "endpoint id out of range");
            self.issues.push(ParseIssue::at(
                record.line,
                format!("endpoint id {} is out of range", record.endpoint),
            ));
            return;
        };

        if record.cluster == ids::BASIC_INFORMATION
            && record.attribute == ids::SPECIFICATION_VERSION
            && self.spec_version_hint.is_none()
        {
            self.spec_version_hint = record.scalar().map(|(_, v)| v.to_string());
        }

        let ep = self.endpoint(endpoint_id);
        // A report for a cluster means the endpoint serves it.
        ep.cluster(record.cluster, ClusterSide::Server);

        match (record.cluster, record.attribute) {
            (ids::DESCRIPTOR, ids::DEVICE_TYPE_LIST) => {
                let (entries, issues) = parse_device_type_list(record);
                if ep.device_types.replace(entries).is_some() {
                    debug!(
                        endpoint = endpoint_id,
                        line = record.line,
                        "DeviceTypeList reported again; keeping the later one"
                    );
                }
                ep.device_type_issues = issues;
            }
            (ids::DESCRIPTOR, ids::SERVER_LIST) => {
                apply_cluster_list(ep, record, ClusterSide::Server);
            }
            (ids::DESCRIPTOR, ids::CLIENT_LIST) => {
                apply_cluster_list(ep, record, ClusterSide::Client);
            }
            (cluster, ids::CLUSTER_REVISION) => {
                let revision = scalar_number(record).and_then(|v| {
                    u16::try_from(v).map_err(|_| {
                        ParseIssue::at(
                            record.line,
                            format!("{}: ClusterRevision {} out of range", record.describe(), v),
                        )
                    })
                });
                let target = ep.cluster(cluster, ClusterSide::Server);
                match revision {
                    Ok(rev) => target.revision = Some(rev),
                    Err(issue) => target.issues.push(issue),
                }
            }
            (cluster, ids::FEATURE_MAP) => {
                let value = scalar_number(record);
                let target = ep.cluster(cluster, ClusterSide::Server);
                match value {
                    Ok(map) => target.feature_map = Some(map),
                    Err(issue) => target.issues.push(issue),
                }
            }
            (cluster, ids::ATTRIBUTE_LIST) => {
                let (elements, issues) = parse_element_list(record);
                let target = ep.cluster(cluster, ClusterSide::Server);
                replace_list(&mut target.attributes, elements, record);
                target.issues.extend(issues);
            }
            (cluster, ids::ACCEPTED_COMMAND_LIST) => {
                let (elements, issues) = parse_element_list(record);
                let target = ep.cluster(cluster, ClusterSide::Server);
                replace_list(&mut target.commands, elements, record);
                target.issues.extend(issues);
            }
            (cluster, ids::GENERATED_COMMAND_LIST) => {
                let (elements, issues) = parse_element_list(record);
                let target = ep.cluster(cluster, ClusterSide::Server);
                replace_list(&mut target.generated_commands, elements, record);
                target.issues.extend(issues);
            }
            _ => {}
        }
    }

    fn finish(self) -> DeviceModel {
        DeviceModel {
            endpoints: self
                .endpoints
                .into_iter()
                .map(EndpointBuilder::finish)
                .collect(),
            spec_version_hint: self.spec_version_hint,
            issues: self.issues,
        }
    }
}

fn replace_list(slot: &mut Vec<Element>, elements: Vec<Element>, record: &Record<'_>) {
    if !slot.is_empty() {
        debug!(line = record.line, "{} reported again; keeping the later one", record.describe());
    }
    *slot = elements;
}

fn scalar_number(record: &Record<'_>) -> Result<u32, ParseIssue> {
    let (lno, value) = record.scalar().ok_or_else(|| {
        ParseIssue::at(record.line, format!("{}: no value reported", record.describe()))
    })?;
    parse_id(value).ok_or_else(|| {
        ParseIssue::at(lno, format!("{}: cannot parse value {:?}", record.describe(), value))
    })
}

/// Entries of a list attribute, in order, duplicates kept.
fn parse_element_list(record: &Record<'_>) -> (Vec<Element>, Vec<ParseIssue>) {
    let mut elements = Vec::new();
    let mut issues = Vec::new();
    let mut declared: Option<usize> = None;

    for (lno, row) in &record.body {
        match row {
            Row::ListStart { count, .. } if declared.is_none() => declared = Some(*count),
            Row::Entry { index, value } => match parse_annotated(value) {
                Some((id, name)) => elements.push(Element { id, name }),
                None => issues.push(ParseIssue::at(
                    *lno,
                    format!("{}: cannot parse entry [{}] {:?}", record.describe(), index, value),
                )),
            },
            Row::Field { value, .. } if declared.is_none() && value.trim() == "[]" => {
                declared = Some(0);
            }
            _ => {}
        }
    }

    if let Some(count) = declared {
        let seen = elements.len() + issues.len();
        if count != seen {
            issues.push(ParseIssue::at(
                record.line,
                format!("{}: list declares {} entries but {} were found", record.describe(), count, seen),
            ));
        }
    }
    (elements, issues)
}

fn apply_cluster_list(ep: &mut EndpointBuilder, record: &Record<'_>, side: ClusterSide) {
    let (elements, issues) = parse_element_list(record);
    for element in elements {
        let cluster = ep.cluster(element.id, side);
        if cluster.cluster_name.is_none() {
            cluster.cluster_name = element.name;
        }
    }
    ep.issues.extend(issues);
}

#[derive(Debug)]
struct PendingStruct<'a> {
    line: usize,
    index: usize,
    fields: Vec<(usize, &'a str, &'a str)>,
}

fn parse_device_type_list(record: &Record<'_>) -> (Vec<DeviceTypeEntry>, Vec<ParseIssue>) {
    let mut entries: Vec<DeviceTypeEntry> = Vec::new();
    let mut issues: Vec<ParseIssue> = Vec::new();
    let mut declared: Option<usize> = None;
    let mut pending: Option<PendingStruct<'_>> = None;

    for (lno, row) in &record.body {
        match row {
            Row::ListStart { count, .. } if declared.is_none() && pending.is_none() => {
                declared = Some(*count);
            }
            Row::StructOpen { index } => {
                if let Some(open) = pending.take() {
                    entries.push(unterminated(open));
                }
                pending = Some(PendingStruct {
                    line: *lno,
                    index: *index,
                    fields: Vec::new(),
                });
            }
            Row::Field { name, value } => match pending.as_mut() {
                Some(open) => open.fields.push((*lno, name, value)),
                None if value.trim() == "[]" && declared.is_none() => declared = Some(0),
                None => {}
            },
            Row::StructClose => match pending.take() {
                Some(open) => entries.push(finish_device_type(open)),
                None => issues.push(ParseIssue::at(*lno, "unbalanced '}' in DeviceTypeList")),
            },
            Row::Entry { index, value } => {
                if let Some(open) = pending.take() {
                    entries.push(unterminated(open));
                }
                entries.push(DeviceTypeEntry::Malformed(ParseIssue::at(
                    *lno,
                    format!("DeviceTypeList entry [{}] is not a struct: {:?}", index, value),
                )));
            }
            _ => {}
        }
    }
    if let Some(open) = pending.take() {
        entries.push(unterminated(open));
    }

    for entry in &entries {
        if let DeviceTypeEntry::Malformed(issue) = entry {
            warn!(line = ?issue.line, endpoint = record.endpoint, "{}", issue.message);
        }
    }

    if let Some(count) = declared {
        if count != entries.len() {
            issues.push(ParseIssue::at(
                record.line,
                format!(
                    "DeviceTypeList on endpoint {} declares {} entries but {} were found",
                    record.endpoint,
                    count,
                    entries.len()
                ),
            ));
        }
    }
    (entries, issues)
}

fn unterminated(open: PendingStruct<'_>) -> DeviceTypeEntry {
    DeviceTypeEntry::Malformed(ParseIssue::at(
        open.line,
        format!("DeviceTypeList entry [{}] is not terminated", open.index),
    ))
}

fn finish_device_type(open: PendingStruct<'_>) -> DeviceTypeEntry {
    let field = |names: &[&str]| {
        open.fields
            .iter()
            .find(|(_, name, _)| names.iter().any(|n| n.eq_ignore_ascii_case(name)))
            .map(|(lno, _, value)| (*lno, *value))
    };

    let Some((lno, raw_type)) = field(&["DeviceType", "Type", "DeviceTypeID"]) else {
        return DeviceTypeEntry::Malformed(ParseIssue::at(
            open.line,
            format!("DeviceTypeList entry [{}] has no DeviceType field", open.index),
        ));
    };
    let Some((device_type_id, device_type_name)) = parse_annotated(raw_type) else {
        return DeviceTypeEntry::Malformed(ParseIssue::at(
            lno,
            format!("DeviceTypeList entry [{}] has an invalid DeviceType {:?}", open.index, raw_type),
        ));
    };

    let Some((lno, raw_rev)) = field(&["Revision"]) else {
        return DeviceTypeEntry::Malformed(ParseIssue::at(
            open.line,
            format!("DeviceTypeList entry [{}] has no Revision field", open.index),
        ));
    };
    let Some(revision) = parse_id(raw_rev).and_then(|v| u16::try_from(v).ok()) else {
        return DeviceTypeEntry::Malformed(ParseIssue::at(
            lno,
            format!("DeviceTypeList entry [{}] has an invalid Revision {:?}", open.index, raw_rev),
        ));
    };

    DeviceTypeEntry::Parsed(DeviceTypeInstance {
        device_type_id,
        device_type_name,
        revision,
        clusters: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LIGHT: &str = "\
[1718012345.100] [4242:4243] [DMG] ReportDataMessage =
[1718012345.101] [4242:4243] [TOO] Endpoint: 1 Cluster: 0x0000_001D Attribute 0x0000_0000 DataVersion: 1
[1718012345.101] [4242:4243] [TOO]   DeviceTypeList: 1 entries
[1718012345.101] [4242:4243] [TOO]     [1]: {
[1718012345.101] [4242:4243] [TOO]       DeviceType: 256 (On/Off Light)
[1718012345.101] [4242:4243] [TOO]       Revision: 3
[1718012345.101] [4242:4243] [TOO]      }
[1718012345.102] [4242:4243] [TOO] Endpoint: 1 Cluster: 0x0000_001D Attribute 0x0000_0001 DataVersion: 1
[1718012345.102] [4242:4243] [TOO]   ServerList: 2 entries
[1718012345.102] [4242:4243] [TOO]     [1]: 29 (Descriptor)
[1718012345.102] [4242:4243] [TOO]     [2]: 6 (OnOff)
[1718012345.103] [4242:4243] [TOO] Endpoint: 1 Cluster: 0x0000_001D Attribute 0x0000_0002 DataVersion: 1
[1718012345.103] [4242:4243] [TOO]   ClientList: 1 entries
[1718012345.103] [4242:4243] [TOO]     [1]: 3
[1718012345.104] [4242:4243] [TOO] Endpoint: 1 Cluster: 0x0000_0006 Attribute 0x0000_FFFD DataVersion: 7
[1718012345.104] [4242:4243] [TOO]   ClusterRevision: 6
[1718012345.105] [4242:4243] [TOO] Endpoint: 1 Cluster: 0x0000_0006 Attribute 0x0000_FFFC DataVersion: 7
[1718012345.105] [4242:4243] [TOO]   FeatureMap: 1
[1718012345.106] [4242:4243] [TOO] Endpoint: 1 Cluster: 0x0000_0006 Attribute 0x0000_FFFB DataVersion: 7
[1718012345.106] [4242:4243] [TOO]   AttributeList: 3 entries
[1718012345.106] [4242:4243] [TOO]     [1]: 0 (OnOff)
[1718012345.106] [4242:4243] [TOO]     [2]: 0 (OnOff)
[1718012345.106] [4242:4243] [TOO]     [3]: 65533
[1718012345.107] [4242:4243] [TOO] Endpoint: 1 Cluster: 0x0000_0006 Attribute 0x0000_FFF9 DataVersion: 7
[1718012345.107] [4242:4243] [TOO]   AcceptedCommandList: 2 entries
[1718012345.107] [4242:4243] [TOO]     [1]: 0
[1718012345.107] [4242:4243] [TOO]     [2]: 1
[1718012345.108] [4242:4243] [TOO] Endpoint: 1 Cluster: 0x0000_0006 Attribute 0x0000_FFF8 DataVersion: 7
[1718012345.108] [4242:4243] [TOO]   GeneratedCommandList: 0 entries
";

    fn parsed(entry: &DeviceTypeEntry) -> &DeviceTypeInstance {
        match entry {
            DeviceTypeEntry::Parsed(dt) => dt,
            DeviceTypeEntry::Malformed(issue) => panic!("malformed device type: {:?}", issue),
        }
    }

    #[test]
    fn builds_endpoint_topology() {
        let model = parse_wildcard_log(LIGHT).unwrap();
        assert_eq!(model.endpoints.len(), 1);
        assert_eq!(model.spec_version_hint, None);

        let ep = &model.endpoints[0];
        assert_eq!(ep.id, 1);
        assert!(ep.issues.is_empty(), "{:?}", ep.issues);
        assert_eq!(ep.device_types.len(), 1);

        let dt = parsed(&ep.device_types[0]);
        assert_eq!(dt.device_type_id, 0x0100);
        assert_eq!(dt.device_type_name.as_deref(), Some("On/Off Light"));
        assert_eq!(dt.revision, 3);

        let ids: Vec<(u32, ClusterSide)> = dt.clusters.iter().map(|c| (c.cluster_id, c.side)).collect();
        assert_eq!(
            ids,
            vec![
                (0x001D, ClusterSide::Server),
                (0x0006, ClusterSide::Server),
                (0x0003, ClusterSide::Client),
            ]
        );

        let on_off = dt.cluster(0x0006, ClusterSide::Server).unwrap();
        assert_eq!(on_off.cluster_name.as_deref(), Some("OnOff"));
        assert_eq!(on_off.revision, Some(6));
        assert_eq!(on_off.feature_map, Some(1));
        assert_eq!(
            on_off.attributes,
            vec![Element::named(0, "OnOff"), Element::named(0, "OnOff"), Element::new(0xFFFD)]
        );
        assert_eq!(on_off.commands, vec![Element::new(0), Element::new(1)]);
        assert!(on_off.generated_commands.is_empty());
        assert!(on_off.issues.is_empty(), "{:?}", on_off.issues);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert_eq!(parse_wildcard_log(""), Err(ParseError::Empty));
        assert_eq!(parse_wildcard_log("  \n\t\n"), Err(ParseError::Empty));
    }

    #[test]
    fn input_without_reports_is_an_error() {
        let text = "hello\nthis is not a wildcard log\n";
        assert_eq!(
            parse_wildcard_log(text),
            Err(ParseError::NoRecords { lines: 2 })
        );
    }

    #[test]
    fn malformed_device_type_does_not_discard_siblings() {
        let text = "\
Endpoint: 0 Cluster: 0x001D Attribute 0x0000
  DeviceTypeList: 3 entries
    [1]: {
      DeviceType: 22
      Revision: 2
    }
    [2]: {
      Revision: 1
    }
    [3]: {
      DeviceType: 17
      Revision: many
    }
Endpoint: 2 Cluster: 0x001D Attribute 0x0000
  DeviceTypeList: 1 entries
    [1]: {
      DeviceType: 770
";
        let model = parse_wildcard_log(text).unwrap();
        assert_eq!(model.endpoints.len(), 2);

        let ep0 = &model.endpoints[0];
        assert_eq!(ep0.device_types.len(), 3);
        assert_eq!(parsed(&ep0.device_types[0]).device_type_id, 22);
        assert_eq!(
            ep0.device_types[1],
            DeviceTypeEntry::Malformed(ParseIssue::at(7, "DeviceTypeList entry [2] has no DeviceType field"))
        );
        assert_eq!(
            ep0.device_types[2],
            DeviceTypeEntry::Malformed(ParseIssue::at(
                12,
                "DeviceTypeList entry [3] has an invalid Revision \"many\""
            ))
        );

        let ep2 = &model.endpoints[1];
        assert_eq!(
            ep2.device_types,
            vec![DeviceTypeEntry::Malformed(ParseIssue::at(
                16,
                "DeviceTypeList entry [1] is not terminated"
            ))]
        );
    }

    #[test]
    fn captures_specification_version() {
        let text = "\
CHIP:TOO: Endpoint: 0 Cluster: 0x0000_0028 Attribute 0x0000_0015 DataVersion: 9
CHIP:TOO:   SpecificationVersion: 17039616
";
        let model = parse_wildcard_log(text).unwrap();
        assert_eq!(model.spec_version_hint.as_deref(), Some("17039616"));
    }

    #[test]
    fn count_mismatch_becomes_cluster_issue() {
        let text = "\
Endpoint: 1 Cluster: 0x001D Attribute 0x0000
  DeviceTypeList: 1 entries
    [1]: {
      DeviceType: 256
      Revision: 3
    }
Endpoint: 1 Cluster: 0x0006 Attribute 0xFFFB
  AttributeList: 3 entries
    [1]: 0
    [2]: 65533
";
        let model = parse_wildcard_log(text).unwrap();
        let dt = parsed(&model.endpoints[0].device_types[0]);
        let on_off = dt.cluster(6, ClusterSide::Server).unwrap();
        assert_eq!(on_off.attributes, vec![Element::new(0), Element::new(0xFFFD)]);
        assert_eq!(
            on_off.issues,
            vec![ParseIssue::at(
                7,
                "endpoint 1 cluster 0x0006 attribute 0xFFFB: list declares 3 entries but 2 were found"
            )]
        );
    }

    #[test]
    fn clusters_without_device_types_are_noted() {
        let text = "\
Endpoint: 3 Cluster: 0x0006 Attribute 0xFFFD
  ClusterRevision: 6
";
        let model = parse_wildcard_log(text).unwrap();
        let ep = &model.endpoints[0];
        assert_eq!(ep.id, 3);
        assert!(ep.device_types.is_empty());
        assert_eq!(ep.issues.len(), 1);
        assert!(ep.issues[0].message.contains("not attributed"));
    }

    #[test]
    fn repeated_list_report_replaces_previous() {
        let text = "\
Endpoint: 1 Cluster: 0x001D Attribute 0x0000
  DeviceTypeList: 1 entries
    [1]: {
      DeviceType: 256
      Revision: 3
    }
Endpoint: 1 Cluster: 0x0006 Attribute 0xFFFB
  AttributeList: 1 entries
    [1]: 0
Endpoint: 1 Cluster: 0x0006 Attribute 0xFFFB
  AttributeList: 2 entries
    [1]: 0
    [2]: 65533
";
        let model = parse_wildcard_log(text).unwrap();
        let dt = parsed(&model.endpoints[0].device_types[0]);
        let on_off = dt.cluster(6, ClusterSide::Server).unwrap();
        assert_eq!(on_off.attributes, vec![Element::new(0), Element::new(0xFFFD)]);
        assert!(on_off.issues.is_empty());
    }

    #[test]
    fn out_of_range_endpoints_only_is_an_error() {
        let text = "\
Endpoint: 70000 Cluster: 0x0006 Attribute 0xFFFD
  ClusterRevision: 6
";
        assert_eq!(
            parse_wildcard_log(text),
            Err(ParseError::NoRecords { lines: 2 })
        );
    }

    #[test]
    fn out_of_range_endpoint_is_kept_on_the_model() {
        let text = "\
Endpoint: 1 Cluster: 0x0006 Attribute 0xFFFD
  ClusterRevision: 6
Endpoint: 70000 Cluster: 0x0006 Attribute 0xFFFD
  ClusterRevision: 6
";
        let model = parse_wildcard_log(text).unwrap();
        assert_eq!(model.endpoints.len(), 1);
        assert_eq!(
            model.issues,
            vec![ParseIssue::at(3, "endpoint id 70000 is out of range")]
        );
    }

    #[test]
    fn replaced_device_type_list_drops_its_count_mismatch() {
        let text = "\
Endpoint: 1 Cluster: 0x001D Attribute 0x0000
  DeviceTypeList: 2 entries
    [1]: {
      DeviceType: 256
      Revision: 3
    }
Endpoint: 1 Cluster: 0x001D Attribute 0x0000
  DeviceTypeList: 1 entries
    [1]: {
      DeviceType: 256
      Revision: 3
    }
";
        let model = parse_wildcard_log(text).unwrap();
        let ep = &model.endpoints[0];
        assert_eq!(ep.device_types.len(), 1);
        assert!(ep.issues.is_empty(), "{:?}", ep.issues);
    }

    #[test]
    fn latest_device_type_list_keeps_its_count_mismatch() {
        let text = "\
Endpoint: 1 Cluster: 0x001D Attribute 0x0000
  DeviceTypeList: 2 entries
    [1]: {
      DeviceType: 256
      Revision: 3
    }
";
        let model = parse_wildcard_log(text).unwrap();
        assert_eq!(
            model.endpoints[0].issues,
            vec![ParseIssue::at(
                1,
                "DeviceTypeList on endpoint 1 declares 2 entries but 1 were found"
            )]
        );
    }
}
