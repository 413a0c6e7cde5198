//! Generic, timeout-bounded subprocess invocation.
//!
//! Shared by the Audio Ingestor (decode) and, outside the core, the CLI's
//! render step. Captures stdout/stderr, enforces a deadline, and leaves
//! mapping the outcome to the caller — different stages fail differently
//! (`DecodeError` vs `RendererError`).

use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::error::{DuckError, Stage};

pub struct SubprocessOutput {
    pub stdout: Vec<u8>,
    pub stderr: String,
}

/// Run `program args...`, capturing stdout and stderr, bounded by `timeout`.
///
/// On a nonzero exit or spawn failure, returns `Err` with `stderr` folded
/// into the message via `on_failure`. On timeout, the child is killed and
/// `DuckError::TimeoutError { stage }` is returned.
pub async fn run(
    program: &str,
    args: &[&str],
    timeout: Duration,
    stage: Stage,
    on_failure: impl FnOnce(String) -> DuckError,
) -> Result<SubprocessOutput, DuckError> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| on_failure(format!("failed to spawn {program}: {e}")))?;

    let mut stdout_pipe = child.stdout.take().expect("stdout was piped");
    let mut stderr_pipe = child.stderr.take().expect("stderr was piped");

    let read_both = async {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let (stdout_res, stderr_res) = tokio::join!(
            stdout_pipe.read_to_end(&mut stdout),
            stderr_pipe.read_to_end(&mut stderr),
        );
        stdout_res.map_err(DuckError::Io)?;
        stderr_res.map_err(DuckError::Io)?;
        let status = child.wait().await.map_err(DuckError::Io)?;
        Ok::<_, DuckError>((status, stdout, stderr))
    };

    let (status, stdout, stderr) = match tokio::time::timeout(timeout, read_both).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(DuckError::TimeoutError { stage });
        }
    };

    let stderr = String::from_utf8_lossy(&stderr).into_owned();

    if !status.success() {
        return Err(on_failure(format!(
            "{program} exited with {status}: {stderr}"
        )));
    }

    Ok(SubprocessOutput { stdout, stderr })
}
