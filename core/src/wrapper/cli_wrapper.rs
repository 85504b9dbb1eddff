//! Process wrapper around the `mlx_lm.generate` command line

use crate::config::GenerateConfig;
use crate::error::GenerateError;
use crate::process::{run_process, ProcessFailure};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::args::{build_command_args, render_command_line};

/// Runs `mlx_lm.generate` as a child process, one process per call.
///
/// The wrapper holds no mutable state, so any number of instances can run side
/// by side; each call spawns and owns its own child.
#[derive(Debug, Clone)]
pub struct CliWrapper {
    config: GenerateConfig,
}

impl CliWrapper {
    /// Bind a wrapper to a configuration
    pub fn new(config: GenerateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GenerateConfig {
        &self.config
    }

    /// The argument vector that `generate(prompt)` would run
    pub fn build_args(&self, prompt: &str) -> Vec<String> {
        build_command_args(&self.config, prompt)
    }

    /// Generate text for `prompt` and return stdout with surrounding whitespace trimmed.
    ///
    /// Waits until the child exits or `timeout` elapses; on timeout the child is
    /// killed before the error is returned. There are no retries.
    pub async fn generate(
        &self,
        prompt: &str,
        timeout: Option<Duration>,
    ) -> Result<String, GenerateError> {
        let args = self.build_args(prompt);
        debug!(command = %render_command_line(&args), timeout = ?timeout, "running mlx_lm.generate");

        match run_process(&args, timeout).await {
            Ok(output) if output.success() => {
                let text = output.stdout.trim().to_string();
                info!(
                    duration_ms = output.duration_ms,
                    output_chars = text.chars().count(),
                    "generation finished"
                );
                Ok(text)
            }
            Ok(output) => {
                let err = self
                    .attach_command(GenerateError::nonzero_exit(output.exit_code), &args)
                    .with_stderr(&output.stderr);
                warn!(kind = %err.kind, exit_code = output.exit_code, "generation failed");
                Err(err)
            }
            Err(failure) => {
                let err = self.translate_failure(failure, &args);
                warn!(kind = %err.kind, "generation failed: {}", err.message);
                Err(err)
            }
        }
    }

    /// Blocking variant of [`CliWrapper::generate`] for synchronous callers.
    ///
    /// Drives the call on a private current-thread runtime. Called from inside an
    /// async context it returns a `LaunchFailure` without spawning anything.
    pub fn generate_blocking(
        &self,
        prompt: &str,
        timeout: Option<Duration>,
    ) -> Result<String, GenerateError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            let err = GenerateError::launch_failure(
                "generate_blocking called from within an async runtime; use generate().await",
            );
            return Err(self.attach_command(err, &self.build_args(prompt)));
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                GenerateError::launch_failure(format!("failed to start async runtime: {}", e))
            })?;
        runtime.block_on(self.generate(prompt, timeout))
    }

    fn translate_failure(&self, failure: ProcessFailure, args: &[String]) -> GenerateError {
        let err = match failure {
            ProcessFailure::TimedOut {
                timeout, stderr, ..
            } => GenerateError::timeout(timeout).with_stderr(&stderr),
            ProcessFailure::Spawn { program, source } => GenerateError::launch_failure(format!(
                "failed to execute '{}': {}",
                program, source
            )),
            ProcessFailure::EmptyCommand => GenerateError::launch_failure("empty command"),
            ProcessFailure::Io(e) => GenerateError::launch_failure(format!(
                "failed to read mlx_lm.generate output: {}",
                e
            )),
        };
        self.attach_command(err, args)
    }

    fn attach_command(&self, err: GenerateError, args: &[String]) -> GenerateError {
        if self.config.echo_command_on_error {
            err.with_command(render_command_line(args))
        } else {
            err
        }
    }
}
