//! Execution of a rendered invocation through a shell.

use std::io::{self, Read};
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::debug;
use wait_timeout::ChildExt;

use crate::config::RunnerConfig;

/// How long readers may keep draining after a timed-out command is killed.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Outcome of running a command.
#[derive(Debug, Default)]
pub struct Execution {
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
    /// Captured standard output (empty when not capturing).
    pub stdout: String,
    /// Captured standard error (empty when not capturing).
    pub stderr: String,
    /// The process was killed after exceeding the timeout.
    pub timed_out: bool,
}

impl Execution {
    pub fn success(&self) -> bool {
        !self.timed_out && self.code == Some(0)
    }
}

/// Runs `command` with `config.shell`, waiting at most `config.timeout_secs`.
///
/// With a timeout on Unix the shell leads its own process group, and the
/// whole group is killed when the timeout fires. Output that is still held
/// open after that is abandoned once [`DRAIN_GRACE`] has passed.
pub fn execute(command: &str, config: &RunnerConfig) -> io::Result<Execution> {
    let mut process = Command::new(&config.shell);
    process.arg(&config.shell_flag).arg(command).stdin(Stdio::inherit());
    if config.capture_output {
        process.stdout(Stdio::piped()).stderr(Stdio::piped());
    }
    // Only with a timeout: a background group cannot read from the terminal.
    if config.timeout_secs.is_some() {
        lead_own_group(&mut process);
    }

    debug!(shell = %config.shell, command, "Spawning command");
    let mut child = process.spawn()?;

    // Drain pipes while waiting so a chatty child cannot block on a full pipe.
    let stdout_thread = child.stdout.take().map(drain);
    let stderr_thread = child.stderr.take().map(drain);

    let status = wait(&mut child, config.timeout_secs)?;
    let mut execution = Execution {
        code: status.and_then(|s| s.code()),
        timed_out: status.is_none(),
        ..Execution::default()
    };
    let mut deadline = None;
    if execution.timed_out {
        debug!(command, timeout_secs = ?config.timeout_secs, "Command timed out, killing process group");
        kill_group(&mut child);
        let _ = child.wait();
        deadline = Some(Instant::now() + DRAIN_GRACE);
    }

    execution.stdout = collect(stdout_thread, deadline);
    execution.stderr = collect(stderr_thread, deadline);
    Ok(execution)
}

#[cfg(unix)]
fn lead_own_group(process: &mut Command) {
    process.process_group(0);
}

#[cfg(not(unix))]
fn lead_own_group(_process: &mut Command) {}

/// Kills the child and, on Unix, the process group it leads.
fn kill_group(child: &mut Child) {
    signal_group(child);
    let _ = child.kill();
}

#[cfg(unix)]
fn signal_group(child: &Child) {
    let Ok(pgid) = libc::pid_t::try_from(child.id()) else {
        return;
    };
    // SAFETY: killpg only sends a signal. The group id is the child's pid,
    // made a group leader by `lead_own_group` and not reaped yet.
    unsafe {
        libc::killpg(pgid, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn signal_group(_child: &Child) {}

fn wait(child: &mut Child, timeout_secs: Option<u64>) -> io::Result<Option<ExitStatus>> {
    match timeout_secs {
        Some(secs) => child.wait_timeout(Duration::from_secs(secs)),
        None => child.wait().map(Some),
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Err(e) = pipe.read_to_end(&mut buf) {
            debug!(error = %e, "Failed to read command output");
        }
        buf
    })
}

/// Joins a reader. With a deadline, a reader still blocked past it is left
/// detached and its output dropped.
fn collect(handle: Option<JoinHandle<Vec<u8>>>, deadline: Option<Instant>) -> String {
    let Some(handle) = handle else {
        return String::new();
    };
    if let Some(deadline) = deadline {
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                debug!("Output still open after kill, abandoning reader");
                return String::new();
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }
    handle
        .join()
        .ok()
        .map(|buf| String::from_utf8_lossy(&buf).into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_output_and_exit_code() {
        let execution = execute("echo out; echo err >&2; exit 3", &RunnerConfig::default()).unwrap();
        assert_eq!(execution.code, Some(3));
        assert_eq!(execution.stdout, "out\n");
        assert_eq!(execution.stderr, "err\n");
        assert!(!execution.success());
    }

    #[test]
    fn test_timeout_kills_command() {
        let config = RunnerConfig {
            timeout_secs: Some(1),
            ..RunnerConfig::default()
        };
        let execution = execute("exec sleep 5", &config).unwrap();
        assert!(execution.timed_out);
        assert_eq!(execution.code, None);
    }

    #[test]
    fn test_timeout_kills_compound_command() {
        let config = RunnerConfig {
            timeout_secs: Some(1),
            ..RunnerConfig::default()
        };
        let start = Instant::now();
        let execution = execute("echo early; sleep 6; echo done", &config).unwrap();
        let elapsed = start.elapsed();

        assert!(execution.timed_out);
        assert!(elapsed < Duration::from_secs(3), "took {elapsed:?}");
        assert!(!execution.stdout.contains("done"));
    }

    #[test]
    fn test_timeout_abandons_output_held_by_escaped_process() {
        let config = RunnerConfig {
            timeout_secs: Some(1),
            ..RunnerConfig::default()
        };
        let start = Instant::now();
        // `setsid` moves the sleeper out of the killed group while it keeps
        // stdout open.
        let execution = execute("setsid sleep 6 & sleep 6", &config).unwrap();
        let elapsed = start.elapsed();

        assert!(execution.timed_out);
        assert!(elapsed < Duration::from_secs(3), "took {elapsed:?}");
    }

    #[test]
    fn test_missing_shell_is_an_error() {
        let config = RunnerConfig {
            shell: "/nonexistent/shell".into(),
            ..RunnerConfig::default()
        };
        assert!(execute("true", &config).is_err());
    }
}
