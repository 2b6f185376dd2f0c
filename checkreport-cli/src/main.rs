//! checkreport CLI - HTML reports for localization quality checks

#![deny(warnings)]

// Global invariants enforced:
// - Pages are written atomically (temp file + rename)
// - Identical input yields byte-for-byte identical output

use anyhow::Context;
use checkreport_core::config::{self, ResolvedConfig};
use checkreport_core::{render_from_dir, Annotation, Annotator};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "checkreport")]
#[command(about = "Render HTML reports for Firefox localization quality checks")]
#[command(version = env!("CHECKREPORT_VERSION"))]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the changelog and current error pages
    Render {
        /// Directory containing checks.json and errors.json
        #[arg(default_value = ".")]
        data_dir: PathBuf,

        /// Directory for the generated pages (default: the data directory)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Path to config file (default: auto-discover in the data directory)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Show the Transvision link and HTML produced for a single message
    Annotate {
        /// Diagnostic message, e.g. "fr - empty: browser.ftl:key"
        message: String,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Validate or show configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without rendering
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Render {
            data_dir,
            output,
            config: config_path,
        } => {
            if !data_dir.is_dir() {
                anyhow::bail!("Data directory does not exist: {}", data_dir.display());
            }

            let resolved = config::load_and_resolve(&data_dir, config_path.as_deref())
                .context("failed to load configuration")?;
            log_config_source(&resolved);

            let reports = render_from_dir(&data_dir, &resolved)?;

            let output_dir = output.unwrap_or_else(|| data_dir.clone());
            let index_path = output_dir.join(&resolved.index_output);
            let errors_path = output_dir.join(&resolved.errors_output);

            write_html_report(&index_path, &reports.index)?;
            info!(path = %index_path.display(), "changelog page written");
            write_html_report(&errors_path, &reports.errors)?;
            info!(path = %errors_path.display(), "error page written");
        }
        Commands::Annotate {
            message,
            format,
            config: config_path,
        } => {
            let cwd = std::env::current_dir()?;
            let resolved = config::load_and_resolve(&cwd, config_path.as_deref())
                .context("failed to load configuration")?;
            log_config_source(&resolved);

            let annotation = Annotator::new(resolved.link_config()).annotate(&message);
            match format {
                OutputFormat::Text => print_annotation_text(&annotation),
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&annotation)
                        .context("failed to serialize annotation")?;
                    println!("{}", json);
                }
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let cwd = std::env::current_dir()?;
                match config::load_and_resolve(&cwd, path.as_deref()) {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let cwd = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&cwd, path.as_deref())
                    .context("failed to load configuration")?;
                print_config(&resolved);
            }
        },
    }

    Ok(())
}

/// Log events go to stderr; `RUST_LOG` overrides the level chosen by `--verbose`
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn log_config_source(resolved: &ResolvedConfig) {
    match &resolved.config_path {
        Some(path) => info!(path = %path.display(), "using config"),
        None => debug!("no config file found, using defaults"),
    }
}

fn print_annotation_text(annotation: &Annotation) {
    println!("shape:  {}", annotation.shape.as_str());
    if let Some(ref locale) = annotation.locale {
        println!("locale: {}", locale);
    }
    if let Some(ref key) = annotation.key {
        println!("key:    {}", key);
    }
    if let Some(ref url) = annotation.url {
        println!("url:    {}", url);
    }
    println!("html:   {}", annotation.html);
}

fn print_config(resolved: &ResolvedConfig) {
    println!("Configuration:");
    if let Some(ref p) = resolved.config_path {
        println!("  Source: {}", p.display());
    } else {
        println!("  Source: defaults (no config file found)");
    }
    println!();
    println!("Transvision:");
    println!("  base_url: {}", resolved.base_url);
    println!("  repo: {}", resolved.repo);
    println!("  source_locale: {}", resolved.source_locale);
    println!();
    println!("Inputs:");
    println!("  checks_file: {}", resolved.checks_file);
    println!("  errors_file: {}", resolved.errors_file);
    println!();
    println!("Outputs:");
    println!("  index_output: {}", resolved.index_output);
    println!("  errors_output: {}", resolved.errors_output);
}

/// Write HTML report to file with atomic write pattern
fn write_html_report(path: &Path, html: &str) -> anyhow::Result<()> {
    use std::fs;

    // Create parent directories if needed
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let temp_path = path.with_extension("html.tmp");
    fs::write(&temp_path, html)
        .with_context(|| format!("Failed to write temporary file: {}", temp_path.display()))?;
    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temporary file to: {}", path.display()))?;

    Ok(())
}
