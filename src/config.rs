use crate::external::converter::{DEFAULT_CONVERTER, DEFAULT_CONVERTER_ARGS};
use crate::migration::FailurePolicy;
use crate::telemetry::LogFormat;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE_STEM: &str = "decaf-rename";
pub const ENV_PREFIX: &str = "DECAF_RENAME";

/// Main configuration structure for decaf-rename
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DecafConfig {
    /// External converter settings
    pub converter: ConverterConfig,
    /// Pipeline behaviour
    pub pipeline: PipelineConfig,
    /// Log output settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Program to run on the file once it has its original name back
    pub program: String,
    /// Arguments passed before the file path
    pub args: Vec<String>,
    /// Wait for the converter to exit and check its status
    pub wait: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_CONVERTER.to_string(),
            args: DEFAULT_CONVERTER_ARGS.iter().map(|arg| arg.to_string()).collect(),
            wait: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Keep going or stop after a failed step
    pub failure_policy: FailurePolicy,
    /// Accept files without a `.coffee` segment (the rename becomes a no-op)
    pub allow_unchanged: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl DecafConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. `decaf-rename.toml` in `dir`
    /// 3. Environment variables (prefixed with DECAF_RENAME_, `__` between nested keys)
    pub fn load_from(dir: &Path) -> Result<Self> {
        let mut builder = Config::builder();

        let file = dir.join(format!("{CONFIG_FILE_STEM}.toml"));
        if file.exists() {
            builder = builder.add_source(File::from(file.as_path()));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .list_separator(" ")
                .with_list_parse_key("converter.args")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to read configuration sources")?;
        config
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// Load from the current directory, after pulling in a `.env` file if present
    pub fn load() -> Result<Self> {
        Self::load_env_file()?;
        Self::load_from(Path::new("."))
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        Self::load_env_file_in(Path::new("."))
    }

    /// Load `dir/.env` if it exists; variables already set are left alone
    pub fn load_env_file_in(dir: &Path) -> Result<()> {
        let env_file = dir.join(".env");
        if env_file.exists() {
            dotenvy::from_path(&env_file).context("Failed to load .env file")?;
        }
        Ok(())
    }
}
