//! External process transformers
//!
//! The current value is serialized to the process's stdin and its stdout is
//! decoded as the result. Process spawning goes through [`CommandRunner`] so
//! callers can substitute a sandbox, impose timeouts, or stub processes out in
//! tests.
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

use super::types::{ExternalCommand, OutputFormat, TransformError};
use serde_json::Value;
use std::io::{self, Write};
use std::process::{Command, Stdio};
use tracing::{debug, instrument, warn};

/// Captured result of running a process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, if the process exited normally
    pub status: Option<i32>,
    pub success: bool,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Runs external commands on behalf of the engine
pub trait CommandRunner: Send + Sync {
    /// Run `command`, feeding `stdin` when present, and wait for it to exit
    fn run(&self, command: &ExternalCommand, stdin: Option<&[u8]>) -> io::Result<CommandOutput>;
}

/// Spawns real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &ExternalCommand, stdin: Option<&[u8]>) -> io::Result<CommandOutput> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Feed stdin from a helper thread so a process that writes a lot
        // before reading cannot deadlock against us.
        let output = std::thread::scope(|scope| {
            let writer = match (child.stdin.take(), stdin) {
                (Some(mut pipe), Some(payload)) => Some(scope.spawn(move || {
                    let result = pipe.write_all(payload);
                    drop(pipe);
                    result
                })),
                _ => None,
            };

            let output = child.wait_with_output();

            if let Some(writer) = writer {
                match writer.join() {
                    Ok(Err(e)) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e),
                    Err(_) => return Err(io::Error::other("stdin writer thread panicked")),
                    _ => {}
                }
            }

            output
        })?;

        Ok(CommandOutput {
            status: output.status.code(),
            success: output.status.success(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Apply an external transformer to `input`
#[instrument(level = "debug", skip(command, input, runner), fields(command = %command))]
pub fn invoke(
    name: &str,
    command: &ExternalCommand,
    input: &Value,
    runner: &dyn CommandRunner,
) -> std::result::Result<Value, TransformError> {
    let payload = if command.stdin {
        Some(serde_json::to_vec(input).map_err(|e| {
            TransformError::external(name, format!("cannot serialize input: {}", e))
        })?)
    } else {
        None
    };

    let output = runner
        .run(command, payload.as_deref())
        .map_err(|e| TransformError::external(name, format!("cannot run '{}': {}", command, e)))?;

    let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
    if !stderr.is_empty() {
        debug!(transformer = name, %stderr, "external transformer wrote to stderr");
    }

    if !output.success {
        warn!(transformer = name, status = ?output.status, "external transformer failed");
        return Err(TransformError::ExternalFailure {
            name: name.to_string(),
            message: match output.status {
                Some(code) => format!("'{}' exited with status {}", command, code),
                None => format!("'{}' was terminated by a signal", command),
            },
            status: output.status,
            stderr,
        });
    }

    decode_output(name, command.format, &output.stdout)
}

fn decode_output(
    name: &str,
    format: OutputFormat,
    stdout: &[u8],
) -> std::result::Result<Value, TransformError> {
    match format {
        OutputFormat::Json => serde_json::from_slice(stdout).map_err(|e| {
            TransformError::external(name, format!("output is not a single JSON value: {}", e))
        }),
        OutputFormat::Text => {
            let text = std::str::from_utf8(stdout).map_err(|e| {
                TransformError::external(name, format!("output is not UTF-8: {}", e))
            })?;
            Ok(Value::String(text.trim().to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records what it was asked to run and replies with a canned output
    struct StubRunner {
        reply: CommandOutput,
        seen_stdin: Mutex<Option<Vec<u8>>>,
    }

    impl StubRunner {
        fn replying(stdout: &str, success: bool) -> Self {
            Self {
                reply: CommandOutput {
                    status: Some(if success { 0 } else { 3 }),
                    success,
                    stdout: stdout.as_bytes().to_vec(),
                    stderr: b"diagnostics".to_vec(),
                },
                seen_stdin: Mutex::new(None),
            }
        }
    }

    impl CommandRunner for StubRunner {
        fn run(&self, _: &ExternalCommand, stdin: Option<&[u8]>) -> io::Result<CommandOutput> {
            if let Ok(mut seen) = self.seen_stdin.lock() {
                *seen = stdin.map(<[u8]>::to_vec);
            }
            Ok(self.reply.clone())
        }
    }

    fn command(stdin: bool, format: OutputFormat) -> ExternalCommand {
        ExternalCommand {
            program: "tool".to_string(),
            args: vec![],
            stdin,
            format,
        }
    }

    #[test]
    fn test_json_round_trip_through_stdin() {
        let runner = StubRunner::replying("{\"ok\": true}\n", true);
        let result = invoke("tool", &command(true, OutputFormat::Json), &json!([1, 2]), &runner);

        assert_eq!(result, Ok(json!({"ok": true})));
        let seen = runner.seen_stdin.lock().expect("lock").clone();
        assert_eq!(seen, Some(b"[1,2]".to_vec()));
    }

    #[test]
    fn test_stdin_disabled() {
        let runner = StubRunner::replying("1", true);
        invoke("tool", &command(false, OutputFormat::Json), &json!("ignored"), &runner)
            .expect("invoke should succeed");
        assert_eq!(*runner.seen_stdin.lock().expect("lock"), None);
    }

    #[test]
    fn test_text_output_is_trimmed() {
        let runner = StubRunner::replying("2025-01-31\n", true);
        let result = invoke("date", &command(false, OutputFormat::Text), &Value::Null, &runner);
        assert_eq!(result, Ok(json!("2025-01-31")));
    }

    #[test]
    fn test_unparsable_json_is_failure() {
        let runner = StubRunner::replying("not json", true);
        let result = invoke("tool", &command(true, OutputFormat::Json), &Value::Null, &runner);
        assert!(matches!(result, Err(TransformError::ExternalFailure { .. })));
    }

    #[test]
    fn test_nonzero_exit_is_failure_with_stderr() {
        let runner = StubRunner::replying("{}", false);
        match invoke("tool", &command(true, OutputFormat::Json), &Value::Null, &runner) {
            Err(TransformError::ExternalFailure { status, stderr, .. }) => {
                assert_eq!(status, Some(3));
                assert_eq!(stderr, "diagnostics");
            }
            other => panic!("Expected external failure, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_process_runner_pipes_stdin() {
        let command = ExternalCommand::from_source(&json!("cat"), &[], true, OutputFormat::Json)
            .expect("command should build");
        let value = json!({"nested": {"list": [1, 2, 3]}, "text": "hello"});
        let result = invoke("cat", &command, &value, &ProcessRunner).expect("cat should echo");
        assert_eq!(result, value);
    }

    #[cfg(unix)]
    #[test]
    fn test_process_runner_large_payload() {
        let command = ExternalCommand::from_source(&json!("cat"), &[], true, OutputFormat::Json)
            .expect("command should build");
        let value = Value::Array((0..50_000).map(|i| json!({"i": i})).collect());
        let result = invoke("cat", &command, &value, &ProcessRunner).expect("cat should echo");
        assert_eq!(result, value);
    }

    #[cfg(unix)]
    #[test]
    fn test_process_runner_reports_exit_status() {
        let command = ExternalCommand::from_source(&json!("sh -c 'exit 7'"), &[], false, OutputFormat::Json)
            .expect("command should build");
        let result = invoke("fails", &command, &Value::Null, &ProcessRunner);
        assert!(matches!(
            result,
            Err(TransformError::ExternalFailure { status: Some(7), .. })
        ));
    }

    #[test]
    fn test_missing_program_is_failure() {
        let command = ExternalCommand::from_source(
            &json!("definitely-not-a-real-program-jsonatr"),
            &[],
            false,
            OutputFormat::Json,
        )
        .expect("command should build");
        let result = invoke("missing", &command, &Value::Null, &ProcessRunner);
        assert!(matches!(result, Err(TransformError::ExternalFailure { .. })));
    }
}
