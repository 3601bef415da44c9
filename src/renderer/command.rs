//! Process spawning shared by the renderer implementations.

use super::RenderRequest;
use crate::constants::STDERR_TAIL_LINES;
use crate::error::{Error, Result};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, trace};

/// Resolve a program on `PATH` (or as a path), failing if it is missing.
pub fn resolve_program(program: &str) -> Result<PathBuf> {
    which::which(program).map_err(|_| Error::RendererNotFound {
        program: program.to_string(),
    })
}

/// Run `program` with `args` and wait for it to exit.
///
/// Output is captured; stdout is logged at trace level and the tail of
/// stderr is attached to the error on a non-zero exit.
pub fn run_to_completion(
    program: &str,
    args: &[OsString],
    request: &RenderRequest<'_>,
) -> Result<()> {
    debug!(
        "Running: {} {}",
        program,
        args.iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::RendererNotFound {
                    program: program.to_string(),
                }
            } else {
                Error::RendererSpawn {
                    program: program.to_string(),
                    source: e,
                }
            }
        })?;

    if !output.stdout.is_empty() {
        trace!("{} stdout: {}", program, String::from_utf8_lossy(&output.stdout).trim_end());
    }

    if output.status.success() {
        return Ok(());
    }

    let status = output.status.code().map_or_else(
        || "terminated by signal".to_string(),
        |code| format!("exit code {code}"),
    );

    Err(Error::RenderFailed {
        input: request.input.to_path_buf(),
        format: request.format,
        status,
        stderr: stderr_tail(&output.stderr),
    })
}

/// Keep the last few lines of a process's stderr.
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ExportFormat;
    use std::path::Path;

    fn request() -> RenderRequest<'static> {
        RenderRequest {
            input: Path::new("diagrams/a.drawio"),
            format: ExportFormat::Png,
            destination: Path::new("build/png/a.png"),
        }
    }

    #[test]
    fn test_stderr_tail_keeps_last_lines() {
        let stderr: String = (0..30).map(|i| format!("line {i}\n")).collect();
        let tail = stderr_tail(stderr.as_bytes());
        assert_eq!(tail.lines().count(), STDERR_TAIL_LINES);
        assert!(tail.ends_with("line 29"));
        assert!(!tail.contains("line 9\n"));
    }

    #[test]
    fn test_resolve_missing_program() {
        let result = resolve_program("drawio-batch-no-such-program");
        assert!(matches!(result, Err(Error::RendererNotFound { .. })));
    }

    #[test]
    fn test_missing_program_maps_to_not_found() {
        let result = run_to_completion("drawio-batch-no-such-program", &[], &request());
        assert!(matches!(result, Err(Error::RendererNotFound { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_render_failure() {
        let args: Vec<OsString> = vec!["-c".into(), "echo broken diagram >&2; exit 3".into()];
        let err = run_to_completion("sh", &args, &request()).unwrap_err();
        match err {
            Error::RenderFailed {
                status, stderr, ..
            } => {
                assert_eq!(status, "exit code 3");
                assert_eq!(stderr, "broken diagram");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_zero_exit_is_success() {
        let args: Vec<OsString> = vec!["-c".into(), "echo ok".into()];
        assert!(run_to_completion("sh", &args, &request()).is_ok());
    }
}
