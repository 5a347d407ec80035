use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use matter_dmv::catalog::JsonCatalog;
use matter_dmv::log::decode_text;
use matter_dmv::model::DeviceModel;
use matter_dmv::render::{RenderContext, render_text_report};
use matter_dmv::{SpecCatalog, ValidationReport};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

pub type Result<T> = anyhow::Result<T>;

/// Used when `--spec-version auto` finds nothing usable in the dump.
const FALLBACK_VERSION: &str = "master";

#[derive(Parser)]
#[command(name = "matter-dmv")]
#[command(about = "Matter device data model conformance checker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,

    /// Directory of catalog JSON files to use instead of the bundled rules.
    #[arg(long, env = "MATTER_DMV_CATALOG_DIR", global = true)]
    catalog_dir: Option<PathBuf>,

    /// Only print errors; the report is written to files only.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// More logging (-v for debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Log as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a wildcard log and check it against the specification.
    Check {
        /// chip-tool wildcard read output (`any read-by-id 0xFFFFFFFF 0xFFFFFFFF`).
        log: PathBuf,

        /// Version to validate against, or `auto` to read it from the log.
        #[arg(long, env = "MATTER_DMV_SPEC_VERSION", default_value = "auto")]
        spec_version: String,

        #[arg(short = 'o', long, default_value = "output")]
        out_dir: PathBuf,
    },

    /// Check a previously saved parsed_data.json against another version.
    Validate {
        #[arg(long)]
        parsed: PathBuf,

        #[arg(long)]
        spec_version: String,

        #[arg(short = 'o', long, default_value = "output")]
        out_dir: PathBuf,
    },

    /// List the specification versions the catalog can check against.
    Versions,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            error!("{:#}", err);
            eprintln!("error: {:#}", err);
            ExitCode::from(2)
        }
    }
}

fn init_tracing(cli: &Cli) {
    let level = if cli.quiet {
        "error"
    } else if cli.verbose > 0 {
        "debug"
    } else {
        "info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Returns whether the device was compliant.
fn run(cli: Cli) -> Result<bool> {
    let catalog = load_catalog(cli.catalog_dir.as_deref())?;

    match cli.cmd {
        Commands::Check {
            log,
            spec_version,
            out_dir,
        } => {
            info!(path = %log.display(), "reading wildcard log");
            let bytes = fs::read(&log).with_context(|| format!("read {}", log.display()))?;
            let text = decode_text(&bytes);
            let model = matter_dmv::parse(&text)
                .with_context(|| format!("parse wildcard log {}", log.display()))?;
            info!(endpoints = model.endpoints.len(), "parsed wildcard log");

            let (version, auto_detected) = if spec_version.eq_ignore_ascii_case("auto") {
                match matter_dmv::detect_supported_version(&model, &catalog) {
                    Some(v) => {
                        info!(version = %v, "using auto-detected specification version");
                        (v, true)
                    }
                    None => {
                        info!(version = FALLBACK_VERSION, "no specification version detected; using default");
                        (FALLBACK_VERSION.to_string(), false)
                    }
                }
            } else {
                (spec_version, false)
            };

            check_and_write(&model, &version, auto_detected, &catalog, &out_dir, cli.quiet)
        }
        Commands::Validate {
            parsed,
            spec_version,
            out_dir,
        } => {
            let text = fs::read_to_string(&parsed)
                .with_context(|| format!("read {}", parsed.display()))?;
            let model: DeviceModel = serde_json::from_str(&text)
                .with_context(|| format!("parse {}", parsed.display()))?;
            check_and_write(&model, &spec_version, false, &catalog, &out_dir, cli.quiet)
        }
        Commands::Versions => {
            for version in catalog.supported_versions() {
                println!("{}", version);
            }
            Ok(true)
        }
    }
}

fn load_catalog(dir: Option<&Path>) -> Result<JsonCatalog> {
    match dir {
        Some(dir) => JsonCatalog::from_dir(dir)
            .with_context(|| format!("load catalog from {}", dir.display())),
        None => JsonCatalog::bundled().context("load bundled catalog"),
    }
}

fn check_and_write(
    model: &DeviceModel,
    version: &str,
    auto_detected: bool,
    catalog: &JsonCatalog,
    out_dir: &Path,
    quiet: bool,
) -> Result<bool> {
    let report = matter_dmv::validate(model, version, catalog)?;

    fs::create_dir_all(out_dir).with_context(|| format!("create {}", out_dir.display()))?;
    let parsed_path = write_json(out_dir, "parsed_data.json", model)?;
    let results_path = write_json(out_dir, "validation_results.json", &report)?;

    let ctx = RenderContext {
        auto_detected,
        saved_files: vec![parsed_path, results_path],
    };
    let text = render_text_report(&report, &ctx)?;
    let report_path = out_dir.join("validation_report.txt");
    fs::write(&report_path, &text).with_context(|| format!("write {}", report_path.display()))?;
    info!(path = %report_path.display(), "wrote text report");

    if !quiet {
        println!("{}", text);
        println!("{}", verdict(&report));
    }
    Ok(report.is_compliant())
}

fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> Result<PathBuf> {
    let path = dir.join(name);
    let json = serde_json::to_string_pretty(value)?;
    fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), "wrote {}", name);
    Ok(path)
}

fn verdict(report: &ValidationReport) -> &'static str {
    if report.is_compliant() {
        "COMPLIANCE CHECK PASSED"
    } else {
        "COMPLIANCE CHECK FAILED"
    }
}
