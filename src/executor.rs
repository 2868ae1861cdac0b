//!
//! Execution of external formatter commands over stdin/stdout.
//!
//! Formatters are opaque collaborators: they receive raw text on stdin and
//! either print the formatted text on stdout or fail. Failures are reported
//! as errors and left for the caller to absorb; this module never falls back
//! on its own.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Error during formatter execution.
#[derive(Debug, Clone, Error)]
pub enum ExecutorError {
    /// Formatter binary not found in PATH.
    #[error("formatter '{tool}' not found in PATH")]
    ToolNotFound { tool: String },
    /// Formatter ran but did not succeed.
    #[error("formatter '{tool}' failed: {message}")]
    Failed { tool: String, message: String },
    /// Formatter did not finish within the timeout.
    #[error("formatter '{tool}' timed out after {timeout_ms}ms")]
    Timeout { tool: String, timeout_ms: u64 },
    /// I/O error while talking to the formatter process.
    #[error("I/O error: {message}")]
    Io { message: String },
}

/// Runs formatter commands, caching binary availability checks.
pub struct ToolExecutor {
    /// Cache of availability checks (binary name -> available).
    availability: Mutex<HashMap<String, bool>>,
}

impl ToolExecutor {
    pub fn new() -> Self {
        Self {
            availability: Mutex::new(HashMap::new()),
        }
    }

    /// Check if a formatter binary is available (lazy, cached).
    pub fn is_tool_available(&self, tool_name: &str) -> bool {
        {
            let cache = self.availability.lock().unwrap();
            if let Some(&available) = cache.get(tool_name) {
                return available;
            }
        }

        let available = check_tool_exists(tool_name);

        let mut cache = self.availability.lock().unwrap();
        cache.insert(tool_name.to_string(), available);
        available
    }

    /// Run `command` with `input` on stdin and return its stdout.
    ///
    /// `command` is an argv; the first element is the binary. A zero timeout
    /// waits indefinitely.
    pub fn format(&self, command: &[String], input: &str, timeout_ms: u64) -> Result<String, ExecutorError> {
        let tool_name = match command.first() {
            Some(name) => name,
            None => {
                return Err(ExecutorError::Failed {
                    tool: "unknown".to_string(),
                    message: "Empty command".to_string(),
                });
            }
        };

        if !self.is_tool_available(tool_name) {
            return Err(ExecutorError::ToolNotFound {
                tool: tool_name.clone(),
            });
        }

        let mut cmd = Command::new(tool_name);
        cmd.args(&command[1..]);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| ExecutorError::Io {
            message: format!("Failed to spawn '{tool_name}': {e}"),
        })?;

        let mut stdout_handle = child
            .stdout
            .take()
            .map(|stdout| thread::spawn(move || read_pipe_to_string(stdout)));
        let mut stderr_handle = child
            .stderr
            .take()
            .map(|stderr| thread::spawn(move || read_pipe_to_string(stderr)));

        // Write the input and close stdin so the formatter sees EOF.
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(input.as_bytes()).map_err(|e| ExecutorError::Io {
                message: format!("Failed to write to stdin: {e}"),
            })?;
        }

        let timeout = Duration::from_millis(timeout_ms);
        let status = if timeout.is_zero() {
            child.wait().map_err(|e| ExecutorError::Io {
                message: format!("Failed to wait for '{tool_name}': {e}"),
            })?
        } else {
            let start = Instant::now();
            loop {
                if let Some(status) = child.try_wait().map_err(|e| ExecutorError::Io {
                    message: format!("Failed to poll '{tool_name}': {e}"),
                })? {
                    break status;
                }
                if start.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    let _ = join_reader(stdout_handle.take());
                    let _ = join_reader(stderr_handle.take());
                    return Err(ExecutorError::Timeout {
                        tool: tool_name.clone(),
                        timeout_ms,
                    });
                }
                thread::sleep(Duration::from_millis(10));
            }
        };

        let stdout = join_reader(stdout_handle.take()).map_err(|message| ExecutorError::Io { message })?;
        let stderr = join_reader(stderr_handle.take()).map_err(|message| ExecutorError::Io { message })?;

        if status.success() {
            Ok(stdout)
        } else {
            let exit_code = status.code().unwrap_or(-1);
            Err(ExecutorError::Failed {
                tool: tool_name.clone(),
                message: format!("Exit code {exit_code}: {stderr}"),
            })
        }
    }
}

impl Default for ToolExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if a binary exists using `which` on Unix or `where` on Windows.
fn check_tool_exists(tool_name: &str) -> bool {
    #[cfg(unix)]
    {
        Command::new("which")
            .arg(tool_name)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|s| s.success())
    }

    #[cfg(windows)]
    {
        Command::new("where")
            .arg(tool_name)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|s| s.success())
    }
}

fn read_pipe_to_string<R: Read>(mut pipe: R) -> std::io::Result<String> {
    let mut buf = Vec::new();
    pipe.read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).to_string())
}

fn join_reader(handle: Option<thread::JoinHandle<std::io::Result<String>>>) -> Result<String, String> {
    match handle {
        Some(handle) => match handle.join() {
            Ok(res) => res.map_err(|e| format!("Failed to read output: {e}")),
            Err(_) => Err("Output reader thread panicked".to_string()),
        },
        None => Ok(String::new()),
    }
}
