//! Human-readable output for a [`ValidationReport`].
//!
//! [`ValidationReport`]: crate::report::ValidationReport

mod text;

pub use text::render_text_report;

use std::path::PathBuf;

/// Facts about the run that the report itself does not carry.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    /// The version came from the device's SpecificationVersion rather than
    /// from the command line.
    pub auto_detected: bool,
    /// Files the run wrote, listed at the end of the report.
    pub saved_files: Vec<PathBuf>,
}
