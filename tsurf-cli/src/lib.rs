//! Command-line front end for tsurf-core
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{debug, info};
use thiserror::Error;
use tsurf_core::{convert_file, ConversionReport, ConvertOptions, TsurfError};

pub mod config;

pub use config::{FileConfig, LogLevel, Settings};

/// Split a GOCAD TSurf file into one OBJ file per surface.
#[derive(Parser, Debug)]
#[command(name = "tsurf2obj", version, about)]
pub struct CliArgs {
    /// Input .ts / .gcd file (GOCAD TSurf).
    #[arg(value_name = "GOCAD_TSURF_FILE")]
    pub input: PathBuf,
    /// Output directory, created if absent [default: out_obj].
    #[arg(short, long, value_name = "DIR")]
    pub outdir: Option<PathBuf>,
    /// Path to a TOML configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Convert(#[from] TsurfError),
    #[error("failed to read config file {path}: {source}")]
    ConfigRead { path: PathBuf, source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    ConfigParse { path: PathBuf, source: toml::de::Error },
    #[error("output path exists but is not a directory: {0}")]
    OutputNotDirectory(PathBuf),
    #[error("failed to create output directory {path}: {source}")]
    OutputCreate { path: PathBuf, source: std::io::Error },
}

impl CliError {
    /// 1 for input and configuration problems, 2 for output problems
    pub fn status(&self) -> u8 {
        match self {
            CliError::Convert(TsurfError::OutputWrite { .. })
            | CliError::OutputNotDirectory(_)
            | CliError::OutputCreate { .. } => 2,
            CliError::Convert(_) | CliError::ConfigRead { .. } | CliError::ConfigParse { .. } => 1,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.status())
    }
}

pub fn run() -> ExitCode {
    let cli = CliArgs::parse();

    let settings = match resolve_settings(&cli) {
        Ok(settings) => settings,
        Err(err) => return report_error(&err),
    };
    init_logger(&settings.log_level);

    match execute(&settings) {
        Ok(report) => {
            let dir = fs::canonicalize(&report.output_dir)
                .unwrap_or_else(|_| report.output_dir.clone());
            println!(
                "Saved {} surfaces as separate OBJ files in: {}",
                report.surface_count(),
                dir.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => report_error(&err),
    }
}

fn report_error(err: &CliError) -> ExitCode {
    eprintln!("error: {}", err);
    err.exit_code()
}

pub fn resolve_settings(cli: &CliArgs) -> Result<Settings, CliError> {
    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let env_log = std::env::var("RUST_LOG").ok();

    Ok(Settings::merge(
        cli.input.clone(),
        cli.outdir.clone(),
        cli.log_level,
        env_log,
        file,
    ))
}

/// Create the output directory if needed, then convert.
pub fn execute(settings: &Settings) -> Result<ConversionReport, CliError> {
    let output_dir = ensure_output_dir(&settings.output_dir)?;
    debug!("Output directory: {}", output_dir.display());

    let report = convert_file(&settings.input, &ConvertOptions::new(output_dir))?;
    info!("Converted {} surfaces", report.surface_count());
    Ok(report)
}

/// Make sure `output` is a usable directory, creating it and its parents.
pub fn ensure_output_dir(output: &Path) -> Result<PathBuf, CliError> {
    match fs::metadata(output) {
        Ok(metadata) if metadata.is_dir() => {}
        Ok(_) => return Err(CliError::OutputNotDirectory(output.to_path_buf())),
        Err(_) => fs::create_dir_all(output).map_err(|source| CliError::OutputCreate {
            path: output.to_path_buf(),
            source,
        })?,
    }
    Ok(output.to_path_buf())
}

fn init_logger(level: &str) {
    let mut builder = env_logger::Builder::new();
    builder
        .target(env_logger::Target::Stderr)
        .filter_level(log::LevelFilter::Warn)
        .parse_filters(level)
        .format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "{}", log_line(record))
        });

    if let Err(err) = builder.try_init() {
        eprintln!("tsurf2obj: logger already initialized: {}", err);
    }
}

/// `tsurf2obj: LEVEL [module] message`, module being the last path segment
fn log_line(record: &log::Record) -> String {
    let target = record.target();
    let module = target.rsplit("::").next().unwrap_or(target);
    format!(
        "tsurf2obj: {:<5} [{}] {}",
        record.level().as_str(),
        module,
        record.args()
    )
}
