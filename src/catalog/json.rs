//! JSON-backed catalog.
//!
//! One file per specification version:
//!
//! ```json
//! {
//!   "version": "1.4",
//!   "global_attributes": [{"id": "0xFFFD", "name": "ClusterRevision"}],
//!   "device_types": [
//!     {"id": "0x0100", "name": "On/Off Light", "revision": 3,
//!      "clusters": [{"id": "0x0006", "name": "On/Off", "features": ["LT"]}]}
//!   ],
//!   "clusters": [
//!     {"id": "0x0006", "name": "On/Off", "revision": 6,
//!      "attributes": [{"id": "0x0000", "name": "OnOff"}],
//!      "commands": [{"id": "0x00", "name": "Off"}],
//!      "features": [{"bit": 0, "code": "LT", "name": "Lighting", "conformance": "O"}]}
//!   ]
//! }
//! ```
//!
//! `global_attributes` are merged into every server cluster of that version at
//! load time, so rule lookups never need to consult them separately.

use crate::catalog::{
    ClusterRequirement, DeviceTypeRequirement, ElementRequirement, SpecCatalog,
};
use crate::error::CatalogError;
use crate::model::ClusterSide;
use crate::model::hex::format_id;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Rule sets compiled into the binary.
const BUNDLED: &[(&str, &str)] = &[
    ("data/1.2.json", include_str!("../../data/1.2.json")),
    ("data/1.3.json", include_str!("../../data/1.3.json")),
    ("data/1.4.json", include_str!("../../data/1.4.json")),
    ("data/1.4.1.json", include_str!("../../data/1.4.1.json")),
    ("data/1.4.2.json", include_str!("../../data/1.4.2.json")),
    ("data/master.json", include_str!("../../data/master.json")),
];

/// Raw shape of one catalog file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionFile {
    pub version: String,
    #[serde(default)]
    pub global_attributes: Vec<ElementRequirement>,
    #[serde(default)]
    pub device_types: Vec<DeviceTypeRequirement>,
    #[serde(default)]
    pub clusters: Vec<ClusterRequirement>,
}

#[derive(Debug, Clone, Default)]
struct VersionRules {
    device_types: BTreeMap<u32, DeviceTypeRequirement>,
    clusters: BTreeMap<(u32, ClusterSide), ClusterRequirement>,
}

#[derive(Debug, Clone, Default)]
pub struct JsonCatalog {
    versions: BTreeMap<String, VersionRules>,
}

impl JsonCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The rule sets shipped with the crate.
    pub fn bundled() -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for (origin, text) in BUNDLED {
            catalog.add_json(origin, text)?;
        }
        Ok(catalog)
    }

    /// Load every `*.json` file in `dir`, in file name order.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let dir = dir.as_ref();
        let io_err = |source| CatalogError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        if paths.is_empty() {
            return Err(CatalogError::EmptyDirectory(dir.to_path_buf()));
        }
        paths.sort();

        let mut catalog = Self::new();
        for path in paths {
            let text = fs::read_to_string(&path).map_err(|source| CatalogError::Io {
                path: path.clone(),
                source,
            })?;
            catalog.add_json(&path.display().to_string(), &text)?;
        }
        Ok(catalog)
    }

    /// Parse one catalog file and add its version.
    pub fn add_json(&mut self, origin: &str, text: &str) -> Result<(), CatalogError> {
        let file: VersionFile =
            serde_json::from_str(text).map_err(|source| CatalogError::Json {
                origin: origin.to_string(),
                source,
            })?;
        debug!(origin, version = %file.version, "loaded catalog file");
        self.insert(file)
    }

    /// Validate and add one version's rules.
    pub fn insert(&mut self, file: VersionFile) -> Result<(), CatalogError> {
        let VersionFile {
            version,
            global_attributes,
            device_types,
            clusters,
        } = file;

        if version.trim().is_empty() {
            return Err(CatalogError::Invalid {
                version,
                message: "version name is empty".to_string(),
            });
        }
        if self.versions.contains_key(&version) {
            return Err(CatalogError::DuplicateVersion(version));
        }

        let mut rules = VersionRules::default();

        for mut cluster in clusters {
            if let Some(bad) = cluster.features.iter().find(|f| f.bit >= 32) {
                return Err(CatalogError::Invalid {
                    version,
                    message: format!(
                        "cluster {} feature {} uses bit {} (FeatureMap is 32 bits)",
                        format_id(cluster.id),
                        bad.code,
                        bad.bit
                    ),
                });
            }
            if cluster.side == ClusterSide::Server {
                for global in &global_attributes {
                    if !cluster.attributes.iter().any(|a| a.id == global.id) {
                        cluster.attributes.push(global.clone());
                    }
                }
            }
            let key = (cluster.id, cluster.side);
            if rules.clusters.contains_key(&key) {
                return Err(CatalogError::DuplicateCluster {
                    version,
                    id: format_id(cluster.id),
                    side: cluster.side.as_str(),
                });
            }
            rules.clusters.insert(key, cluster);
        }

        for device_type in device_types {
            if rules.device_types.contains_key(&device_type.id) {
                return Err(CatalogError::DuplicateDeviceType {
                    version,
                    id: format_id(device_type.id),
                });
            }
            for cref in &device_type.clusters {
                if cref.side == ClusterSide::Server
                    && cref.conformance.is_mandatory()
                    && !rules.clusters.contains_key(&(cref.id, ClusterSide::Server))
                {
                    warn!(
                        version = %version,
                        device_type = %device_type.name,
                        cluster = %format_id(cref.id),
                        "device type requires a cluster the catalog does not define"
                    );
                }
            }
            rules.device_types.insert(device_type.id, device_type);
        }

        self.versions.insert(version, rules);
        Ok(())
    }
}

impl SpecCatalog for JsonCatalog {
    fn supported_versions(&self) -> Vec<String> {
        self.versions.keys().cloned().collect()
    }

    fn device_type(&self, version: &str, id: u32) -> Option<&DeviceTypeRequirement> {
        self.versions.get(version)?.device_types.get(&id)
    }

    fn cluster(&self, version: &str, id: u32, side: ClusterSide) -> Option<&ClusterRequirement> {
        self.versions.get(version)?.clusters.get(&(id, side))
    }

    fn supports(&self, version: &str) -> bool {
        self.versions.contains_key(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Conformance;
    use pretty_assertions::assert_eq;

    const MINIMAL: &str = r#"{
        "version": "1.4",
        "global_attributes": [{"id": "0xFFFD", "name": "ClusterRevision"}],
        "device_types": [
            {"id": 256, "name": "On/Off Light", "revision": 3,
             "clusters": [{"id": "0x0006", "name": "On/Off", "features": ["LT"]}]}
        ],
        "clusters": [
            {"id": "0x0006", "name": "On/Off", "revision": 6,
             "attributes": [{"id": "0x0000", "name": "OnOff"},
                            {"id": "0x4000", "name": "GlobalSceneControl", "conformance": "C"}],
             "features": [{"bit": 0, "code": "LT", "name": "Lighting", "conformance": "O"}]}
        ]
    }"#;

    #[test]
    fn loads_and_merges_global_attributes() {
        let mut catalog = JsonCatalog::new();
        catalog.add_json("inline", MINIMAL).unwrap();

        assert_eq!(catalog.supported_versions(), vec!["1.4".to_string()]);
        let dt = catalog.device_type("1.4", 0x0100).unwrap();
        assert_eq!(dt.clusters[0].side, ClusterSide::Server);
        assert_eq!(dt.clusters[0].conformance, Conformance::Mandatory);

        let on_off = catalog.cluster("1.4", 6, ClusterSide::Server).unwrap();
        let ids: Vec<u32> = on_off.attributes.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![0x0000, 0x4000, 0xFFFD]);
        assert_eq!(on_off.attributes[1].conformance, Conformance::Conditional);
        assert_eq!(on_off.feature("lt").map(|f| f.bit), Some(0));
    }

    #[test]
    fn lookups_never_cross_versions() {
        let mut catalog = JsonCatalog::new();
        catalog.add_json("inline", MINIMAL).unwrap();

        assert!(catalog.supports("1.4"));
        assert!(!catalog.supports("1.4.1"));
        assert!(catalog.device_type("1.4.1", 0x0100).is_none());
        assert!(catalog.cluster("1.4.1", 6, ClusterSide::Server).is_none());
        assert!(catalog.cluster("1.4", 6, ClusterSide::Client).is_none());
    }

    #[test]
    fn rejects_duplicates() {
        let mut catalog = JsonCatalog::new();
        catalog.add_json("a", MINIMAL).unwrap();
        assert!(matches!(
            catalog.add_json("b", MINIMAL),
            Err(CatalogError::DuplicateVersion(v)) if v == "1.4"
        ));

        let doubled = r#"{"version": "x", "clusters": [
            {"id": 6, "name": "On/Off"}, {"id": "0x0006", "name": "On/Off"}]}"#;
        assert!(matches!(
            JsonCatalog::new().add_json("c", doubled),
            Err(CatalogError::DuplicateCluster { id, .. }) if id == "0x0006"
        ));
    }

    #[test]
    fn reports_bad_json_with_origin() {
        let err = JsonCatalog::new()
            .add_json("broken.json", "{\"version\": ")
            .unwrap_err();
        assert!(err.to_string().contains("broken.json"), "{}", err);
    }

    #[test]
    fn bundled_catalog_loads() {
        let catalog = JsonCatalog::bundled().unwrap();
        assert_eq!(
            catalog.supported_versions(),
            vec!["1.2", "1.3", "1.4", "1.4.1", "1.4.2", "master"]
        );
        for version in catalog.supported_versions() {
            // Every version carries the root node and a basic light.
            assert!(catalog.device_type(&version, 0x0016).is_some(), "{}", version);
            assert!(catalog.device_type(&version, 0x0100).is_some(), "{}", version);
        }
    }
}
