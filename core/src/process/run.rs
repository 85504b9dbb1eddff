//! Child process execution utilities

use std::process::Stdio;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::time::{timeout, Duration, Instant};
use tracing::{debug, warn};

/// Output of a process that ran to completion
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Exit code, `-1` when the process was terminated by a signal
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Reasons a process did not run to completion
#[derive(Error, Debug)]
pub enum ProcessFailure {
    #[error("empty command")]
    EmptyCommand,

    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to collect process output: {0}")]
    Io(#[from] std::io::Error),

    /// `stderr` holds whatever the child wrote before it was killed
    #[error("process timed out after {timeout:?}")]
    TimedOut {
        timeout: Duration,
        elapsed_ms: u64,
        stderr: String,
    },
}

/// Run `args[0]` with the remaining arguments and wait for it.
///
/// Stdin is closed; stdout and stderr are buffered in full. With a timeout the
/// child is killed and reaped before `TimedOut` is returned. Without one the
/// call waits for as long as the child runs.
pub async fn run_process(
    args: &[String],
    timeout_after: Option<Duration>,
) -> Result<ProcessOutput, ProcessFailure> {
    let (program, rest) = args.split_first().ok_or(ProcessFailure::EmptyCommand)?;
    let start_time = Instant::now();

    let mut cmd = Command::new(program);
    cmd.args(rest)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| ProcessFailure::Spawn {
        program: program.clone(),
        source,
    })?;
    debug!(pid = ?child.id(), program = %program, "spawned child process");

    // Owned here so partial output outlives a cancelled collect_output
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();

    let collected = match timeout_after {
        Some(limit) => {
            let collecting = collect_output(&mut child, &mut stdout, &mut stderr);
            let result = timeout(limit, collecting).await;
            match result {
                Ok(collected) => collected,
                Err(_) => {
                    // kill() also waits, so the child is reaped here
                    if let Err(e) = child.kill().await {
                        warn!(error = %e, "failed to kill timed out child process");
                    }
                    return Err(ProcessFailure::TimedOut {
                        timeout: limit,
                        elapsed_ms: start_time.elapsed().as_millis() as u64,
                        stderr: lossy(&stderr),
                    });
                }
            }
        }
        None => collect_output(&mut child, &mut stdout, &mut stderr).await,
    };

    let exit_code = collected?;

    Ok(ProcessOutput {
        exit_code,
        stdout: lossy(&stdout),
        stderr: lossy(&stderr),
        duration_ms: start_time.elapsed().as_millis() as u64,
    })
}

/// Drain both pipes concurrently, then wait for exit
async fn collect_output(
    child: &mut Child,
    stdout: &mut Vec<u8>,
    stderr: &mut Vec<u8>,
) -> std::io::Result<i32> {
    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();

    let (stdout_result, stderr_result) =
        tokio::join!(read_into(stdout_pipe, stdout), read_into(stderr_pipe, stderr));
    stdout_result?;
    stderr_result?;

    let status = child.wait().await?;
    Ok(status.code().unwrap_or(-1))
}

async fn read_into<R: AsyncRead + Unpin>(
    pipe: Option<R>,
    buf: &mut Vec<u8>,
) -> std::io::Result<()> {
    if let Some(mut pipe) = pipe {
        // chunk by chunk, so every completed read is already in `buf`
        while pipe.read_buf(buf).await? != 0 {}
    }
    Ok(())
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
