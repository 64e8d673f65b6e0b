//! External converter invocation
//!
//! Provides the trait the pipeline uses to hand a file to the source-to-source
//! converter, enabling dependency injection for testing.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tracing::{debug, info, warn};

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

pub const DEFAULT_CONVERTER: &str = "decaffeinate";
pub const DEFAULT_CONVERTER_ARGS: &[&str] = &["--loose-js-modules"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// The converter ran to completion and exited successfully
    Completed,
    /// The converter was launched and left running
    Detached { pid: Option<u32> },
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Converter not found: {program}")]
    NotFound { program: String },
    #[error("IO error running {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with status {}: {stderr}", .code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Trait for running the external converter on a file
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait Converter: Send + Sync {
    async fn convert(&self, path: &Path) -> Result<ConversionOutcome, ConvertError>;
}

/// Real implementation using tokio::process::Command
///
/// The program is executed directly with `args` followed by the file path,
/// never through a shell.
#[derive(Debug, Clone)]
pub struct ProcessConverter {
    program: String,
    args: Vec<String>,
    wait: bool,
}

impl Default for ProcessConverter {
    fn default() -> Self {
        Self::new(
            DEFAULT_CONVERTER,
            DEFAULT_CONVERTER_ARGS.iter().map(|arg| arg.to_string()).collect(),
            true,
        )
    }
}

impl ProcessConverter {
    pub fn new(program: impl Into<String>, args: Vec<String>, wait: bool) -> Self {
        Self {
            program: program.into(),
            args,
            wait,
        }
    }

    fn spawn_error(&self, e: std::io::Error) -> ConvertError {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConvertError::NotFound {
                program: self.program.clone(),
            }
        } else {
            ConvertError::Io {
                program: self.program.clone(),
                source: e,
            }
        }
    }
}

#[async_trait]
impl Converter for ProcessConverter {
    async fn convert(&self, path: &Path) -> Result<ConversionOutcome, ConvertError> {
        let mut command = tokio::process::Command::new(&self.program);
        command.args(&self.args).arg(path);

        if !self.wait {
            let child = command
                .stdin(Stdio::null())
                .spawn()
                .map_err(|e| self.spawn_error(e))?;
            let pid = child.id();
            info!(program = %self.program, ?pid, "Converter launched without waiting for it");
            return Ok(ConversionOutcome::Detached { pid });
        }

        let output = command
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stdout.trim().is_empty() {
            debug!(program = %self.program, stdout = %stdout.trim(), "Converter output");
        }

        if !output.status.success() {
            return Err(ConvertError::Failed {
                program: self.program.clone(),
                code: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }
        if !stderr.trim().is_empty() {
            warn!(program = %self.program, stderr = %stderr.trim(), "Converter reported warnings");
        }

        Ok(ConversionOutcome::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_default_converter_is_decaffeinate() {
        let converter = ProcessConverter::default();
        assert_eq!(converter.program, "decaffeinate");
        assert_eq!(converter.args, vec!["--loose-js-modules".to_string()]);
        assert!(converter.wait);
    }

    #[tokio::test]
    async fn test_process_converter_success() {
        let converter = ProcessConverter::new("echo", vec!["--loose-js-modules".into()], true);
        let result = converter.convert(Path::new("app.coffee")).await;

        assert_eq!(result.unwrap(), ConversionOutcome::Completed);
    }

    #[tokio::test]
    async fn test_process_converter_logs_stderr_of_successful_run() {
        let logs = Arc::new(Mutex::new(Vec::new()));
        let writer_logs = Arc::clone(&logs);
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || LogBuffer(Arc::clone(&writer_logs)))
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let converter = ProcessConverter::new(
            "sh",
            vec!["-c".into(), "echo 'deprecated option' >&2".into()],
            true,
        );
        let result = converter.convert(Path::new("app.coffee")).await;

        assert_eq!(result.unwrap(), ConversionOutcome::Completed);
        let output = String::from_utf8(logs.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"));
        assert!(output.contains("deprecated option"));
    }

    #[tokio::test]
    async fn test_process_converter_nonzero_exit_is_failure() {
        let converter = ProcessConverter::new("false", vec![], true);
        let result = converter.convert(Path::new("app.coffee")).await;

        match result.unwrap_err() {
            ConvertError::Failed { program, code, .. } => {
                assert_eq!(program, "false");
                assert_eq!(code, Some(1));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_process_converter_command_not_found() {
        let converter = ProcessConverter::new("nonexistent_converter_xyz", vec![], true);
        let result = converter.convert(Path::new("app.coffee")).await;

        assert!(matches!(result.unwrap_err(), ConvertError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_process_converter_detached_reports_pid() {
        let converter = ProcessConverter::new("true", vec![], false);
        let result = converter.convert(Path::new("app.coffee")).await.unwrap();

        assert!(matches!(result, ConversionOutcome::Detached { pid: Some(_) }));
    }

    #[tokio::test]
    async fn test_process_converter_detached_still_reports_launch_failure() {
        let converter = ProcessConverter::new("nonexistent_converter_xyz", vec![], false);
        let result = converter.convert(Path::new("app.coffee")).await;

        assert!(matches!(result.unwrap_err(), ConvertError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_mock_converter_receives_path() {
        let mut mock = MockConverter::new();
        mock.expect_convert()
            .withf(|path| path == Path::new("src/app.coffee"))
            .times(1)
            .returning(|_| Ok(ConversionOutcome::Completed));

        let outcome = mock.convert(&PathBuf::from("src/app.coffee")).await.unwrap();
        assert_eq!(outcome, ConversionOutcome::Completed);
    }
}
