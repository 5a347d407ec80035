//! Specification version detection from a parsed dump.

use crate::catalog::SpecCatalog;
use crate::model::DeviceModel;
use crate::model::hex::parse_id;
use tracing::debug;

/// Released versions a device can claim through SpecificationVersion.
pub const RELEASED_VERSIONS: &[&str] = &["1.2", "1.3", "1.4", "1.4.1", "1.4.2"];

/// Decode a raw SpecificationVersion value into `major.minor[.dot]`.
///
/// The attribute is a `u32` laid out as `major:8 minor:8 dot:8 reserved:8`
/// (so 1.4.1 is `0x01040100`); chip-tool prints it in decimal. Already dotted
/// strings are accepted too. The dot component is omitted when zero.
pub fn decode_specification_version(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let is_hex = raw.starts_with("0x") || raw.starts_with("0X");

    let (major, minor, dot) = if raw.contains('.') && !is_hex {
        let mut parts = raw.split('.').map(|p| p.trim().parse::<u32>().ok());
        let major = parts.next()??;
        let minor = parts.next()??;
        let dot = parts.next().unwrap_or(Some(0))?;
        if parts.next().is_some() {
            return None;
        }
        (major, minor, dot)
    } else {
        let value = parse_id(raw)?;
        (value >> 24, (value >> 16) & 0xFF, (value >> 8) & 0xFF)
    };

    if major == 0 {
        return None;
    }
    Some(if dot == 0 {
        format!("{}.{}", major, minor)
    } else {
        format!("{}.{}.{}", major, minor, dot)
    })
}

/// The released version the device reports, if it reports a known one.
pub fn detect_version(model: &DeviceModel) -> Option<String> {
    let raw = model.spec_version_hint.as_deref()?;
    let decoded = decode_specification_version(raw);
    match decoded {
        Some(version) if RELEASED_VERSIONS.contains(&version.as_str()) => {
            debug!(raw, version = %version, "detected specification version");
            Some(version)
        }
        other => {
            debug!(raw, decoded = ?other, "SpecificationVersion is not a released version");
            None
        }
    }
}

/// Like [`detect_version`], but only versions `catalog` can validate against.
pub fn detect_supported_version(model: &DeviceModel, catalog: &dyn SpecCatalog) -> Option<String> {
    detect_version(model).filter(|v| catalog.supports(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::JsonCatalog;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn with_hint(hint: Option<&str>) -> DeviceModel {
        DeviceModel {
            endpoints: vec![],
            spec_version_hint: hint.map(str::to_string),
            ..DeviceModel::default()
        }
    }

    #[rstest]
    #[case("16973824", Some("1.3"))]
    #[case("17039360", Some("1.4"))]
    #[case("17039616", Some("1.4.1"))]
    #[case("17039872", Some("1.4.2"))]
    #[case("0x01040200", Some("1.4.2"))]
    #[case("0x0102_0000", Some("1.2"))]
    #[case("1.4.1", Some("1.4.1"))]
    #[case("1.4.0", Some("1.4"))]
    #[case("0", None)]
    #[case("1.x", None)]
    #[case("1.2.3.4", None)]
    #[case("", None)]
    fn decodes_raw_values(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(decode_specification_version(raw).as_deref(), expected);
    }

    #[test]
    fn reserved_byte_is_ignored() {
        assert_eq!(decode_specification_version("0x010400FF").as_deref(), Some("1.4"));
    }

    #[rstest]
    #[case(Some("17039360"), Some("1.4"))]
    #[case(Some("0x01050000"), None)]
    #[case(Some("0x01010000"), None)]
    #[case(Some("garbage"), None)]
    #[case(None, None)]
    fn only_released_versions_are_detected(
        #[case] hint: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(detect_version(&with_hint(hint)).as_deref(), expected);
    }

    #[test]
    fn supported_version_requires_catalog_rules() {
        let mut catalog = JsonCatalog::new();
        catalog
            .add_json("inline", r#"{"version": "1.3"}"#)
            .unwrap();

        let model = with_hint(Some("16973824"));
        assert_eq!(detect_supported_version(&model, &catalog).as_deref(), Some("1.3"));

        let model = with_hint(Some("17039360"));
        assert_eq!(detect_version(&model).as_deref(), Some("1.4"));
        assert_eq!(detect_supported_version(&model, &catalog), None);
    }
}
