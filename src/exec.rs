//! Shell command execution
//!
//! The execution primitive behind the dispatcher: run a fully built
//! command line through the platform shell (`cmd /C` on Windows, `sh -c`
//! elsewhere), capture both output streams, and honor the caller-supplied
//! timeout and output-size limits. Completion is reported exactly once,
//! either directly (blocking) or on a worker thread (asynchronous).

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command as StdCommand, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use tracing::debug;
use wait_timeout::ChildExt;

use crate::error::{ElevError, ElevResult};

/// Options forwarded to the execution primitive.
///
/// The dispatcher does not interpret these values; they only shape how the
/// child process runs.
#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    /// Working directory for the child process
    pub working_dir: Option<PathBuf>,
    /// Extra environment variables for the child process
    pub env: HashMap<String, String>,
    /// Kill the child and fail if it runs longer than this
    pub timeout: Option<Duration>,
    /// Fail if either captured stream exceeds this many bytes
    pub max_output: Option<usize>,
}

impl ExecOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the working directory
    pub fn current_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Set an environment variable
    pub fn env<K, V>(mut self, key: K, val: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.env.insert(key.into(), val.into());
        self
    }

    /// Set the execution timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the captured-output size limit, per stream
    pub fn max_output(mut self, bytes: usize) -> Self {
        self.max_output = Some(bytes);
        self
    }
}

/// Captured result of a successful execution
#[derive(Debug, Clone)]
pub struct ExecOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutcome {
    /// Check if the command was successful
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Build the platform shell invocation for a complete command line
fn shell_command(line: &str) -> StdCommand {
    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        let mut command = StdCommand::new("cmd");
        // raw_arg keeps the already-quoted helper path intact
        command.raw_arg("/C");
        command.raw_arg(line);
        command
    }

    #[cfg(not(windows))]
    {
        let mut command = StdCommand::new("sh");
        command.arg("-c");
        command.arg(line);
        command
    }
}

fn drain_pipe<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

/// Run a command line through the platform shell and wait for completion.
///
/// Returns `Ok` only for a zero exit status; a non-zero exit, timeout, or
/// output overflow is reported as [`ElevError::Exec`] carrying the
/// captured streams so callers can diagnose the failure.
pub fn run_shell(line: &str, options: &ExecOptions) -> ElevResult<ExecOutcome> {
    debug!(command_line = %line, "executing shell command");

    let mut command = shell_command(line);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = &options.working_dir {
        command.current_dir(dir);
    }
    command.envs(&options.env);

    let mut child = command
        .spawn()
        .map_err(|e| ElevError::io_error("spawn", None, e))?;

    let stdout_reader = drain_pipe(child.stdout.take());
    let stderr_reader = drain_pipe(child.stderr.take());

    let status: ExitStatus = match options.timeout {
        Some(limit) => {
            match child
                .wait_timeout(limit)
                .map_err(|e| ElevError::io_error("wait", None, e))?
            {
                Some(status) => status,
                None => {
                    let _ = child.kill();
                    let _ = child.wait();
                    let stdout = collect_utf8(stdout_reader);
                    let stderr = collect_utf8(stderr_reader);
                    return Err(ElevError::exec_error(
                        line,
                        None,
                        stdout,
                        stderr,
                        &format!("timed out after {limit:?}"),
                    ));
                }
            }
        }
        None => child
            .wait()
            .map_err(|e| ElevError::io_error("wait", None, e))?,
    };

    let stdout_bytes = stdout_reader.join().unwrap_or_default();
    let stderr_bytes = stderr_reader.join().unwrap_or_default();

    // maxBuffer-style limit, enforced after capture
    if let Some(limit) = options.max_output {
        if stdout_bytes.len() > limit || stderr_bytes.len() > limit {
            return Err(ElevError::exec_error(
                line,
                status.code(),
                String::from_utf8_lossy(&stdout_bytes).into_owned(),
                String::from_utf8_lossy(&stderr_bytes).into_owned(),
                &format!("captured output exceeded {limit} bytes"),
            ));
        }
    }

    let stdout = String::from_utf8_lossy(&stdout_bytes).into_owned();
    let stderr = String::from_utf8_lossy(&stderr_bytes).into_owned();
    let exit_code = status.code().unwrap_or(-1);

    if status.success() {
        Ok(ExecOutcome {
            exit_code,
            stdout,
            stderr,
        })
    } else {
        Err(ElevError::exec_error(
            line,
            status.code(),
            stdout,
            stderr,
            &format!("helper exited with status {exit_code}"),
        ))
    }
}

fn collect_utf8(reader: thread::JoinHandle<Vec<u8>>) -> String {
    String::from_utf8_lossy(&reader.join().unwrap_or_default()).into_owned()
}

/// Run a command line on a worker thread, delivering the completion to
/// `on_complete` exactly once.
///
/// Returns immediately. The error path here covers only thread creation;
/// everything that happens to the child process is reported through the
/// callback.
pub fn spawn_shell<F>(line: String, options: ExecOptions, on_complete: F) -> ElevResult<()>
where
    F: FnOnce(ElevResult<ExecOutcome>) + Send + 'static,
{
    thread::Builder::new()
        .name("winelev-exec".to_string())
        .spawn(move || {
            let completion = run_shell(&line, &options);
            on_complete(completion);
        })
        .map_err(|e| ElevError::io_error("thread-spawn", None, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_exec_options_builder() {
        let options = ExecOptions::new()
            .current_dir("/tmp")
            .env("KEY", "value")
            .timeout(Duration::from_secs(5))
            .max_output(4096);
        assert_eq!(options.working_dir, Some(PathBuf::from("/tmp")));
        assert_eq!(options.env.get("KEY"), Some(&"value".to_string()));
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
        assert_eq!(options.max_output, Some(4096));
    }

    #[test]
    fn test_run_shell_captures_stdout() {
        let outcome = run_shell("echo hello", &ExecOptions::new()).unwrap();
        assert!(outcome.success());
        assert_eq!(outcome.stdout.trim(), "hello");
    }

    #[test]
    fn test_run_shell_nonzero_exit_is_error() {
        let err = run_shell("exit 7", &ExecOptions::new()).unwrap_err();
        assert_eq!(err.exit_code(), Some(7));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_shell_env_forwarded() {
        let options = ExecOptions::new().env("WINELEV_TEST_VAR", "forwarded");
        let outcome = run_shell("echo $WINELEV_TEST_VAR", &options).unwrap();
        assert_eq!(outcome.stdout.trim(), "forwarded");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_shell_timeout_kills_child() {
        let options = ExecOptions::new().timeout(Duration::from_millis(100));
        let err = run_shell("sleep 5", &options).unwrap_err();
        assert_eq!(err.exit_code(), None);
        assert!(err.to_string().contains("Execution failed"));
    }

    #[test]
    fn test_run_shell_output_limit() {
        let options = ExecOptions::new().max_output(2);
        let err = run_shell("echo overflowing", &options).unwrap_err();
        assert!(matches!(err, ElevError::Exec(_)));
    }

    #[test]
    fn test_spawn_shell_delivers_exactly_once() {
        let (tx, rx) = mpsc::channel();
        spawn_shell("echo async".to_string(), ExecOptions::new(), move |completion| {
            tx.send(completion).unwrap();
        })
        .unwrap();

        let completion = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert_eq!(completion.unwrap().stdout.trim(), "async");
        // sender dropped after the single delivery
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }
}
