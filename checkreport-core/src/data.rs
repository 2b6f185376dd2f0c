//! Report data produced by the quality checks
//!
//! Two JSON documents feed the reports:
//! - `checks.json`: changelog keyed by run date (`"YYYY-MM-DD HH:MM"`), each
//!   run carrying an optional message and the lists of new and fixed errors
//! - `errors.json`: the current errors, compare-locales messages and a
//!   per-check error summary
//!
//! Global invariants enforced:
//! - Changelog entries keep the insertion order of the source document
//! - Missing input files are reported as `File <name> does not exist.`

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// One check run in the changelog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed: Option<Vec<String>>,
}

/// Check runs in the order they were recorded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changelog {
    entries: Vec<(String, ChangelogEntry)>,
}

impl Changelog {
    pub fn from_entries(entries: Vec<(String, ChangelogEntry)>) -> Self {
        Changelog { entries }
    }

    /// Parse a `checks.json` document, preserving key order
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(json).context("changelog must be a JSON object")?;

        let entries = raw
            .into_iter()
            .map(|(date, value)| {
                let entry: ChangelogEntry = serde_json::from_value(value)
                    .with_context(|| format!("invalid changelog entry for {}", date))?;
                Ok((date, entry))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Changelog { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate runs most recent first (reverse insertion order)
    pub fn iter_recent_first(&self) -> impl Iterator<Item = (&str, &ChangelogEntry)> {
        self.entries
            .iter()
            .rev()
            .map(|(date, entry)| (date.as_str(), entry))
    }
}

/// Error count for a single check
///
/// Most checks record a plain count; compare-locales records errors and
/// warnings separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SummaryCount {
    Count(u64),
    Split { errors: u64, warnings: u64 },
}

impl SummaryCount {
    pub fn errors(&self) -> u64 {
        match self {
            SummaryCount::Count(n) => *n,
            SummaryCount::Split { errors, .. } => *errors,
        }
    }

    pub fn warnings(&self) -> u64 {
        match self {
            SummaryCount::Count(_) => 0,
            SummaryCount::Split { warnings, .. } => *warnings,
        }
    }
}

/// Error counts by check name
pub type ErrorSummary = BTreeMap<String, SummaryCount>;

/// Current state of the checks (`errors.json`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default, rename = "compare-locales")]
    pub compare_locales: Vec<String>,
    #[serde(default)]
    pub summary: ErrorSummary,
}

/// Older runs wrote `errors.json` as a bare list of messages
#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorReportFormat {
    Legacy(Vec<String>),
    Current(ErrorReport),
}

impl ErrorReport {
    /// Parse an `errors.json` document in either format
    pub fn from_json(json: &str) -> Result<Self> {
        let format: ErrorReportFormat = serde_json::from_str(json)
            .context("expected an object with errors/compare-locales/summary or a list of messages")?;

        Ok(match format {
            ErrorReportFormat::Legacy(errors) => ErrorReport {
                errors,
                ..ErrorReport::default()
            },
            ErrorReportFormat::Current(report) => report,
        })
    }

    /// Total number of open messages
    pub fn total_messages(&self) -> usize {
        self.errors.len() + self.compare_locales.len()
    }
}

/// Load `checks.json`
pub fn load_changelog(path: &Path) -> Result<Changelog> {
    let content = read_input(path)?;
    let changelog = Changelog::from_json(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    debug!(path = %path.display(), runs = changelog.len(), "loaded changelog");
    Ok(changelog)
}

/// Load `errors.json`
pub fn load_error_report(path: &Path) -> Result<ErrorReport> {
    let content = read_input(path)?;
    let report = ErrorReport::from_json(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    debug!(
        path = %path.display(),
        errors = report.errors.len(),
        compare_locales = report.compare_locales.len(),
        total = report.total_messages(),
        checks = report.summary.len(),
        "loaded error report"
    );
    Ok(report)
}

fn read_input(path: &Path) -> Result<String> {
    if !path.exists() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        anyhow::bail!("File {} does not exist.", name);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
