//! Subprocess plumbing shared by every media operation.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, Command};
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::error::MediaError;
use super::types::ToolOutput;

/// Maps a spawn failure to `ToolNotFound` when the binary is missing.
pub(crate) fn spawn_error(tool: &'static str, path: &Path, e: io::Error) -> MediaError {
    if e.kind() == io::ErrorKind::NotFound {
        MediaError::ToolNotFound {
            tool,
            path: path.to_path_buf(),
        }
    } else {
        MediaError::Io(e)
    }
}

/// Spawns `program` with stdout and stderr piped.
///
/// The child is killed if its handle is dropped before it exits.
pub(crate) fn spawn_tool(
    tool: &'static str,
    program: &Path,
    args: &[String],
) -> Result<Child, MediaError> {
    debug!(tool, program = %program.display(), ?args, "Spawning external tool");
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| spawn_error(tool, program, e))
}

/// Runs `program` to completion and captures its output.
///
/// With `timeout_secs` set, the child is killed once the deadline passes.
/// The exit status is not interpreted here; see [`ensure_success`].
pub(crate) async fn run_tool(
    tool: &'static str,
    program: &Path,
    args: &[String],
    timeout_secs: Option<u64>,
) -> Result<ToolOutput, MediaError> {
    let child = spawn_tool(tool, program, args)?;

    let output = match timeout_secs {
        Some(secs) => match timeout(Duration::from_secs(secs), child.wait_with_output()).await {
            Ok(result) => result?,
            // Dropping the wait future drops the child, which kills it.
            Err(_) => return Err(MediaError::Timeout { timeout_secs: secs }),
        },
        None => child.wait_with_output().await?,
    };

    Ok(ToolOutput {
        status_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Turns a non-zero exit into `MediaError::ExternalTool` carrying stderr.
pub(crate) fn ensure_success(tool: &'static str, output: ToolOutput) -> Result<ToolOutput, MediaError> {
    if output.success() {
        Ok(output)
    } else {
        Err(MediaError::external_tool(
            tool,
            output.status_code,
            output.stderr.trim_end(),
        ))
    }
}

/// Checks that `path` exists before handing it to ffmpeg.
pub(crate) async fn require_file(path: &Path) -> Result<(), MediaError> {
    match tokio::fs::try_exists(path).await {
        Ok(true) => Ok(()),
        _ => Err(MediaError::InputNotFound {
            path: PathBuf::from(path),
        }),
    }
}

/// Renders a path as a single command-line argument.
pub(crate) fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
