//! Detached launch of privileged installers, confirmed from log output.
//!
//! `softwareupdate --install` and `startosinstall` outlive the process
//! that starts them (the host usually reboots mid-way), so their exit
//! status is unobservable. The launch is confirmed instead by watching
//! the redirected log for a progress marker within a bounded window:
//! marker seen means started, timeout means unconfirmed, and a spawn
//! error means the launch itself failed.

use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use regex::Regex;

#[cfg(unix)]
use std::os::unix::process::CommandExt;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(30);

/// One detached launch attempt.
///
/// The secret never appears in the argument vector and is never logged;
/// it is piped to the child's stdin and dropped with the spec.
pub struct LaunchSpec {
    program: PathBuf,
    args: Vec<String>,
    secret: Option<String>,
    log_path: PathBuf,
    marker: Regex,
    interval: Duration,
    timeout: Duration,
}

impl LaunchSpec {
    pub fn new(program: impl Into<PathBuf>, log_path: impl Into<PathBuf>, marker: Regex) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            secret: None,
            log_path: log_path.into(),
            marker,
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_CONFIRM_TIMEOUT,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Start the process detached and wait for the progress marker.
    ///
    /// The child runs in its own process group with combined output
    /// redirected to the log file, so it survives this process exiting.
    /// It is never killed: an unconfirmed launch only means the marker
    /// was not observed in time.
    pub fn launch(self) -> LaunchOutcome {
        let log = match File::create(&self.log_path) {
            Ok(file) => file,
            Err(e) => {
                return LaunchOutcome::Failed {
                    error: format!("cannot create log file {}: {e}", self.log_path.display()),
                };
            }
        };
        let log_err = match log.try_clone() {
            Ok(file) => file,
            Err(e) => {
                return LaunchOutcome::Failed {
                    error: format!("cannot duplicate log handle: {e}"),
                };
            }
        };

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(if self.secret.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err));

        // Own process group: the child must survive this process exiting
        // and the reboot the installer itself triggers.
        #[cfg(unix)]
        command.process_group(0);

        log::info!(
            "Launching detached: {} {}",
            self.program.display(),
            self.args.join(" ")
        );

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                return LaunchOutcome::Failed {
                    error: format!("failed to spawn {}: {e}", self.program.display()),
                };
            }
        };

        if let Some(secret) = &self.secret {
            let Some(mut stdin) = child.stdin.take() else {
                return LaunchOutcome::Failed {
                    error: "child stdin was not captured".to_string(),
                };
            };
            if let Err(e) = writeln!(stdin, "{secret}") {
                return LaunchOutcome::Failed {
                    error: format!("failed to deliver credentials on stdin: {e}"),
                };
            }
            // stdin drops here, closing the pipe so the child sees EOF
        }

        // Dropping the handle detaches: the child is never waited on.
        drop(child);

        let deadline = Instant::now() + self.timeout;
        loop {
            // A missing or unreadable log just means no progress yet
            if let Ok(content) = fs::read_to_string(&self.log_path)
                && self.marker.is_match(&content)
            {
                return LaunchOutcome::Started;
            }

            let now = Instant::now();
            if now >= deadline {
                return LaunchOutcome::NotConfirmed {
                    log_path: self.log_path,
                };
            }
            thread::sleep(self.interval.min(deadline - now));
        }
    }
}

// Manual Debug so the secret can never end up in diagnostics.
impl fmt::Debug for LaunchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaunchSpec")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("log_path", &self.log_path)
            .field("marker", &self.marker.as_str())
            .field("interval", &self.interval)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Terminal result of one launch attempt.
#[derive(Debug)]
pub enum LaunchOutcome {
    /// The progress marker appeared in the log.
    Started,
    /// The marker was not observed before the timeout. The process was
    /// not killed and may still be running; inspect the log.
    NotConfirmed { log_path: PathBuf },
    /// The process could not be started.
    Failed { error: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn marker(pattern: &str) -> Regex {
        Regex::new(pattern).unwrap()
    }

    #[test]
    fn test_confirms_when_marker_appears() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("install.log");

        // Child takes a moment before printing progress
        let spec = LaunchSpec::new("sh", &log, marker(r"Downloading: \d+\.\d+%"))
            .args(["-c", "sleep 0.2; echo 'Downloading: 0.0%'"])
            .interval(Duration::from_millis(50))
            .timeout(Duration::from_secs(5));

        assert!(matches!(spec.launch(), LaunchOutcome::Started));
    }

    #[test]
    fn test_times_out_when_marker_never_appears() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("install.log");
        let timeout = Duration::from_millis(300);

        let spec = LaunchSpec::new("sh", &log, marker(r"Downloading: \d+\.\d+%"))
            .args(["-c", "echo 'no progress here'"])
            .interval(Duration::from_millis(50))
            .timeout(timeout);

        let start = Instant::now();
        let outcome = spec.launch();
        let elapsed = start.elapsed();

        match outcome {
            LaunchOutcome::NotConfirmed { log_path } => assert_eq!(log_path, log),
            other => panic!("expected NotConfirmed, got {other:?}"),
        }
        // The wait is bounded: the full window elapses, but not much more
        assert!(elapsed >= timeout);
        assert!(elapsed < timeout + Duration::from_secs(2));
    }

    #[test]
    fn test_spawn_failure_is_reported() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("install.log");

        let spec = LaunchSpec::new("/nonexistent/binary-xyz", &log, marker("x"))
            .timeout(Duration::from_millis(100));

        match spec.launch() {
            LaunchOutcome::Failed { error } => assert!(error.contains("failed to spawn")),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn test_secret_arrives_on_stdin_not_argv() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("install.log");

        // The child echoes what it read from stdin; the marker only
        // matches if the secret made it through the pipe
        let spec = LaunchSpec::new("sh", &log, marker("token=hunter2"))
            .args(["-c", "read value; echo \"token=$value\""])
            .secret("hunter2")
            .interval(Duration::from_millis(50))
            .timeout(Duration::from_secs(5));

        assert!(matches!(spec.launch(), LaunchOutcome::Started));
    }

    #[test]
    fn test_missing_log_during_polls_is_not_an_error() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("install.log");

        // The child deletes the log, waits, then recreates it with the
        // marker; intermediate polls must treat the gap as no-progress
        let script = format!(
            "rm -f {log}; sleep 0.2; echo 'Preparing: 1.0%' > {log}",
            log = log.display()
        );
        let spec = LaunchSpec::new("sh", &log, marker(r"Preparing: \d+\.\d+%"))
            .args(["-c", &script])
            .interval(Duration::from_millis(50))
            .timeout(Duration::from_secs(5));

        assert!(matches!(spec.launch(), LaunchOutcome::Started));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let spec = LaunchSpec::new("sh", "/tmp/x.log", marker("x")).secret("hunter2");
        let debug = format!("{spec:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
