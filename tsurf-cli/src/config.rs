//! Optional TOML configuration and its merge with command-line flags
use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Deserialize;

use crate::CliError;

pub const DEFAULT_OUTDIR: &str = "out_obj";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone, Copy, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Settings read from `--config <FILE>`
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Output directory for the OBJ files.
    pub outdir: Option<PathBuf>,
    /// Log verbosity.
    pub log_level: Option<LogLevel>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let content = fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Fully merged settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub log_level: String,
}

impl Settings {
    /// Flags win over `RUST_LOG`, which wins over the config file.
    pub fn merge(
        input: PathBuf,
        outdir: Option<PathBuf>,
        log_level: Option<LogLevel>,
        env_log: Option<String>,
        file: FileConfig,
    ) -> Self {
        let output_dir = outdir
            .or(file.outdir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTDIR));

        let log_level = match (log_level, env_log.filter(|level| !level.trim().is_empty())) {
            (Some(level), _) => level.as_str().to_string(),
            (None, Some(env)) => env,
            (None, None) => file
                .log_level
                .map(LogLevel::as_str)
                .unwrap_or(DEFAULT_LOG_LEVEL)
                .to_string(),
        };

        Self {
            input,
            output_dir,
            log_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_any_source() {
        let settings = Settings::merge("in.ts".into(), None, None, None, FileConfig::default());
        assert_eq!(settings.output_dir, PathBuf::from(DEFAULT_OUTDIR));
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn test_flags_override_config_file() {
        let file = FileConfig {
            outdir: Some("from_file".into()),
            log_level: Some(LogLevel::Debug),
        };
        let settings = Settings::merge(
            "in.ts".into(),
            Some("from_flag".into()),
            Some(LogLevel::Error),
            Some("trace".to_string()),
            file,
        );
        assert_eq!(settings.output_dir, PathBuf::from("from_flag"));
        assert_eq!(settings.log_level, "error");
    }

    #[test]
    fn test_env_log_beats_config_file() {
        let file = FileConfig {
            outdir: Some("from_file".into()),
            log_level: Some(LogLevel::Debug),
        };
        let env = Some("info".to_string());
        let settings = Settings::merge("in.ts".into(), None, None, env, file.clone());
        assert_eq!(settings.output_dir, PathBuf::from("from_file"));
        assert_eq!(settings.log_level, "info");

        let settings = Settings::merge("in.ts".into(), None, None, Some("  ".to_string()), file);
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tsurf2obj.toml");
        fs::write(&path, "outdir = \"meshes\"\nlog_level = \"info\"\n").unwrap();

        let config = FileConfig::load(&path).unwrap();
        assert_eq!(config.outdir, Some(PathBuf::from("meshes")));
        assert_eq!(config.log_level, Some(LogLevel::Info));
    }

    #[test]
    fn test_unknown_config_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "output = \"meshes\"\n").unwrap();

        assert!(matches!(FileConfig::load(&path), Err(CliError::ConfigParse { .. })));
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, CliError::ConfigRead { .. }));
    }
}
