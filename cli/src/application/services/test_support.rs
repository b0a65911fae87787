//! Shared test helpers for service and adapter tests.
//!
//! Provides cross-platform `exit_status()`, canned outputs, a recording
//! reporter and a scripted `CommandRunner`.

use std::sync::Mutex;

use crate::application::ports::ProgressReporter;

/// Build an `ExitStatus` from a logical exit code (cross-platform).
#[cfg(unix)]
pub fn exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    std::process::ExitStatus::from_raw(code as u32)
}

pub fn ok_output(stdout: &[u8]) -> std::process::Output {
    std::process::Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn fail_output(stderr: &[u8]) -> std::process::Output {
    std::process::Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

/// Reporter that records every message with its level.
#[derive(Default)]
pub struct RecordingReporter {
    pub lines: Mutex<Vec<String>>,
}

impl RecordingReporter {
    #[allow(clippy::expect_used)]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("mutex poisoned").clone()
    }

    #[allow(clippy::expect_used)]
    fn push(&self, level: &str, message: &str) {
        self.lines
            .lock()
            .expect("mutex poisoned")
            .push(format!("{level} {message}"));
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.push("step", message);
    }
    fn success(&self, message: &str) {
        self.push("ok", message);
    }
    fn warn(&self, message: &str) {
        self.push("warn", message);
    }
}

/// `CommandRunner` that records every invocation and answers from a script.
///
/// Calls are recorded as `program arg1 arg2 ...`; stdin payloads are kept
/// separately. Once the script is exhausted every call succeeds with empty
/// output.
#[derive(Default)]
pub struct RecordingRunner {
    pub calls: Mutex<Vec<String>>,
    pub stdin: Mutex<Vec<Vec<u8>>>,
    pub timeouts: Mutex<Vec<std::time::Duration>>,
    pub script: Mutex<std::collections::VecDeque<std::process::Output>>,
}

impl RecordingRunner {
    #[must_use]
    pub fn answering(outputs: Vec<std::process::Output>) -> Self {
        Self {
            script: Mutex::new(outputs.into()),
            ..Self::default()
        }
    }

    #[allow(clippy::expect_used)]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("mutex poisoned").clone()
    }

    #[allow(clippy::expect_used)]
    fn next(&self, program: &str, args: &[&str]) -> std::process::Output {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.calls.lock().expect("mutex poisoned").push(line);
        self.script
            .lock()
            .expect("mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| ok_output(b""))
    }
}

impl crate::application::ports::CommandRunner for RecordingRunner {
    async fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<std::process::Output> {
        Ok(self.next(program, args))
    }

    #[allow(clippy::expect_used)]
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: std::time::Duration,
    ) -> anyhow::Result<std::process::Output> {
        self.timeouts.lock().expect("mutex poisoned").push(timeout);
        Ok(self.next(program, args))
    }

    #[allow(clippy::expect_used)]
    async fn run_with_stdin(
        &self,
        program: &str,
        args: &[&str],
        stdin: &[u8],
    ) -> anyhow::Result<std::process::Output> {
        self.stdin.lock().expect("mutex poisoned").push(stdin.to_vec());
        Ok(self.next(program, args))
    }

    async fn run_status(&self, program: &str, args: &[&str]) -> anyhow::Result<std::process::ExitStatus> {
        Ok(self.next(program, args).status)
    }
}
