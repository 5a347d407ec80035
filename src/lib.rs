//! Matter device data model conformance checking.
//!
//! A chip-tool wildcard read is parsed into a [`DeviceModel`], which is then
//! checked against the mandatory-element rules of one Matter specification
//! version from a [`SpecCatalog`]:
//!
//! ```no_run
//! use matter_dmv::catalog::JsonCatalog;
//!
//! # fn main() -> matter_dmv::Result<()> {
//! let text = std::fs::read_to_string("wildcard.txt").unwrap_or_default();
//! let catalog = JsonCatalog::bundled()?;
//! let model = matter_dmv::parse(&text)?;
//! let version = matter_dmv::detect_version(&model).unwrap_or_else(|| "master".to_string());
//! let report = matter_dmv::validate(&model, &version, &catalog)?;
//! println!("{} non-compliant endpoints", report.summary.non_compliant_endpoints);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod check;
pub mod error;
pub mod log;
pub mod model;
pub mod render;
pub mod report;
pub mod version;

pub use catalog::SpecCatalog;
pub use check::validate;
pub use error::{CatalogError, Error, ParseError, UnsupportedVersionError};
pub use model::DeviceModel;
pub use report::ValidationReport;
pub use version::{detect_supported_version, detect_version};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Parse a chip-tool wildcard log. See [`log::parse_wildcard_log`].
pub fn parse(text: &str) -> Result<DeviceModel> {
    Ok(log::parse_wildcard_log(text)?)
}
