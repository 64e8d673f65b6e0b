use crate::config::DecafConfig;
use crate::migration::FailurePolicy;
use crate::telemetry::LogFormat;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "decaf-rename")]
#[command(about = "Rename a .coffee file to .js in its own git commit, then run decaffeinate on it")]
#[command(long_about = "decaf-rename backs up FILE, renames it to .js, commits that rename on its own \
                       (hooks skipped) so git keeps the file's history, moves it back to its original \
                       name and runs `decaffeinate --loose-js-modules FILE` on it.")]
pub struct Cli {
    /// The .coffee file to migrate
    pub file: PathBuf,

    /// What to do after a step fails
    #[arg(long, value_enum, help = "continue: attempt every step anyway; halt: stop at the first failure")]
    pub policy: Option<FailurePolicy>,

    /// Launch the converter without waiting for it to finish
    #[arg(long, help = "Do not wait for the converter to exit (its failures go unnoticed)")]
    pub no_wait: bool,

    /// Run even when the file name has no .coffee segment
    #[arg(long, help = "Accept files whose name would not change")]
    pub allow_unchanged: bool,

    /// Converter program to run instead of decaffeinate
    #[arg(long, value_name = "PROGRAM")]
    pub converter: Option<String>,

    /// Log output format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    /// Layer command-line flags over the loaded configuration
    pub fn apply_to(&self, config: &mut DecafConfig) {
        if let Some(policy) = self.policy {
            config.pipeline.failure_policy = policy;
        }
        if self.no_wait {
            config.converter.wait = false;
        }
        if self.allow_unchanged {
            config.pipeline.allow_unchanged = true;
        }
        if let Some(program) = &self.converter {
            config.converter.program = program.clone();
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "decaf-rename",
            "--policy",
            "halt",
            "--no-wait",
            "--converter",
            "echo",
            "--log-format",
            "json",
            "src/app.coffee",
        ])
        .unwrap();
        let mut config = DecafConfig::default();

        cli.apply_to(&mut config);

        assert_eq!(cli.file, PathBuf::from("src/app.coffee"));
        assert_eq!(config.pipeline.failure_policy, FailurePolicy::Halt);
        assert!(!config.converter.wait);
        assert_eq!(config.converter.program, "echo");
        assert_eq!(config.converter.args, vec!["--loose-js-modules".to_string()]);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_absent_flags_leave_config_alone() {
        let cli = Cli::try_parse_from(["decaf-rename", "app.coffee"]).unwrap();
        let mut config = DecafConfig::default();
        config.pipeline.failure_policy = FailurePolicy::Halt;

        cli.apply_to(&mut config);

        assert_eq!(config.pipeline.failure_policy, FailurePolicy::Halt);
        assert!(config.converter.wait);
    }

    #[test]
    fn test_file_argument_is_required() {
        assert!(Cli::try_parse_from(["decaf-rename"]).is_err());
    }
}
