//! Configuration file support for checkreport
//!
//! Loads report-specific configuration from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.checkreportrc.json` in the data directory
//! 3. `checkreport.config.json` in the data directory
//!
//! All fields are optional.

use crate::annotate::{LinkConfig, DEFAULT_BASE_URL, DEFAULT_REPO, DEFAULT_SOURCE_LOCALE};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

pub const DEFAULT_CHECKS_FILE: &str = "checks.json";
pub const DEFAULT_ERRORS_FILE: &str = "errors.json";
pub const DEFAULT_INDEX_OUTPUT: &str = "index.html";
pub const DEFAULT_ERRORS_OUTPUT: &str = "errors.html";

const CONFIG_FILE_NAMES: &[&str] = &[".checkreportrc.json", "checkreport.config.json"];

/// checkreport configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Transvision base URL (default: https://transvision.flod.org/)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Repository searched in Transvision (default: gecko_strings)
    #[serde(default)]
    pub repo: Option<String>,

    /// Source locale for Transvision searches (default: en-US)
    #[serde(default)]
    pub source_locale: Option<String>,

    /// Changelog input file name (default: checks.json)
    #[serde(default)]
    pub checks_file: Option<String>,

    /// Current errors input file name (default: errors.json)
    #[serde(default)]
    pub errors_file: Option<String>,

    /// Changelog page file name (default: index.html)
    #[serde(default)]
    pub index_output: Option<String>,

    /// Current errors page file name (default: errors.html)
    #[serde(default)]
    pub errors_output: Option<String>,
}

/// Resolved configuration with defaults applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub repo: String,
    pub source_locale: String,
    pub checks_file: String,
    pub errors_file: String,
    pub index_output: String,
    pub errors_output: String,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl ReportConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some(ref base_url) = self.base_url {
            let parsed = Url::parse(base_url)
                .with_context(|| format!("base_url is not a valid URL (got {})", base_url))?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                anyhow::bail!(
                    "base_url must use http or https (got {})",
                    parsed.scheme()
                );
            }
        }

        for (name, value) in [
            ("repo", &self.repo),
            ("source_locale", &self.source_locale),
        ] {
            if let Some(v) = value {
                if v.trim().is_empty() {
                    anyhow::bail!("{} must not be empty", name);
                }
            }
        }

        for (name, value) in [
            ("checks_file", &self.checks_file),
            ("errors_file", &self.errors_file),
            ("index_output", &self.index_output),
            ("errors_output", &self.errors_output),
        ] {
            if let Some(v) = value {
                validate_file_name(name, v)?;
            }
        }

        if let (Some(index), Some(errors)) = (&self.index_output, &self.errors_output) {
            if index == errors {
                anyhow::bail!(
                    "index_output and errors_output must differ (both are {})",
                    index
                );
            }
        }

        Ok(())
    }

    /// Resolve into a fully-populated configuration
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let pick = |value: &Option<String>, default: &str| {
            value.clone().unwrap_or_else(|| default.to_string())
        };

        Ok(ResolvedConfig {
            base_url: pick(&self.base_url, DEFAULT_BASE_URL),
            repo: pick(&self.repo, DEFAULT_REPO),
            source_locale: pick(&self.source_locale, DEFAULT_SOURCE_LOCALE),
            checks_file: pick(&self.checks_file, DEFAULT_CHECKS_FILE),
            errors_file: pick(&self.errors_file, DEFAULT_ERRORS_FILE),
            index_output: pick(&self.index_output, DEFAULT_INDEX_OUTPUT),
            errors_output: pick(&self.errors_output, DEFAULT_ERRORS_OUTPUT),
            config_path: None,
        })
    }
}

/// File names are joined onto the data/output directories, so they must be
/// plain names.
fn validate_file_name(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{} must not be empty", field);
    }
    if value.contains('/') || value.contains('\\') || value == "." || value == ".." {
        anyhow::bail!("{} must be a plain file name (got {})", field, value);
    }
    Ok(())
}

impl ResolvedConfig {
    /// Create a resolved config with all defaults
    pub fn defaults() -> Result<Self> {
        ReportConfig::default().resolve()
    }

    /// Link parameters for the annotator
    pub fn link_config(&self) -> LinkConfig {
        LinkConfig {
            base_url: self.base_url.clone(),
            repo: self.repo.clone(),
            source_locale: self.source_locale.clone(),
        }
    }
}

/// Discover a config file in the data directory
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(data_dir: &Path) -> Result<Option<(ReportConfig, PathBuf)>> {
    for name in CONFIG_FILE_NAMES {
        let path = data_dir.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }
    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<ReportConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: ReportConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve config for a data directory
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config in the data directory.
/// Returns default config if nothing is found.
pub fn load_and_resolve(data_dir: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(data_dir)? {
            Some((config, path)) => (config, Some(path)),
            None => (ReportConfig::default(), None),
        }
    };

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}
