//! checkreport core library - HTML reports for localization quality checks

#![deny(warnings)]

// Global invariants enforced in this crate:
// - No global mutable state; configuration is passed in explicitly
// - No network access; links are built as text only
// - Message annotation never fails, it only degrades to unlinked text
// - Identical input yields byte-for-byte identical output

pub mod annotate;
pub mod config;
pub mod data;
pub mod html;

pub use annotate::{Annotation, Annotator, LinkConfig, MessageShape};
pub use config::ResolvedConfig;
pub use data::{Changelog, ChangelogEntry, ErrorReport, ErrorSummary, SummaryCount};

use anyhow::Result;
use std::path::Path;

/// Both rendered report pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReports {
    pub index: String,
    pub errors: String,
}

/// Render both pages from already-decoded data
pub fn render_reports(
    changelog: &Changelog,
    report: &ErrorReport,
    config: &ResolvedConfig,
) -> RenderedReports {
    let annotator = Annotator::new(config.link_config());
    RenderedReports {
        index: html::render_index(changelog, &annotator, &config.errors_output),
        errors: html::render_errors(report, &annotator, &config.index_output),
    }
}

/// Load both input files from `data_dir` and render the pages
pub fn render_from_dir(data_dir: &Path, config: &ResolvedConfig) -> Result<RenderedReports> {
    let changelog = data::load_changelog(&data_dir.join(&config.checks_file))?;
    let report = data::load_error_report(&data_dir.join(&config.errors_file))?;
    Ok(render_reports(&changelog, &report, config))
}
