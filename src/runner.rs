use anyhow::{Context, Result};
use std::process::{Command, Stdio};

/// Run a command and capture stdout
pub fn run_capture(cmd: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(cmd)
        .args(args)
        .output()
        .with_context(|| format!("Failed to execute: {} {}", cmd, args.join(" ")))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("Command failed: {}", stderr.trim())
    }
}

/// Run a command and capture stdout and stderr as one stream.
///
/// `softwareupdate` splits its listing output across both streams, so
/// callers that scrape listings need the merged text. A non-zero exit
/// fails with whatever was captured.
pub fn run_merged(cmd: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(cmd)
        .args(args)
        .output()
        .with_context(|| format!("Failed to execute: {} {}", cmd, args.join(" ")))?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    if output.status.success() {
        Ok(text)
    } else {
        anyhow::bail!("Command failed: {} {}: {}", cmd, args.join(" "), text.trim())
    }
}

/// Check if a command exists
pub fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_capture_trims_output() {
        let out = run_capture("sh", &["-c", "echo hello"]).unwrap();
        assert_eq!(out, "hello");
    }

    #[test]
    fn test_run_capture_failure_includes_stderr() {
        let err = run_capture("sh", &["-c", "echo broken >&2; exit 1"]).unwrap_err();
        assert!(format!("{err}").contains("broken"));
    }

    #[test]
    fn test_run_merged_combines_streams() {
        let out = run_merged("sh", &["-c", "echo out; echo err >&2"]).unwrap();
        assert!(out.contains("out"));
        assert!(out.contains("err"));
    }

    #[test]
    fn test_run_merged_failure_keeps_captured_text() {
        let err = run_merged("sh", &["-c", "echo partial; exit 2"]).unwrap_err();
        assert!(format!("{err}").contains("partial"));
    }

    #[test]
    fn test_command_exists() {
        assert!(command_exists("sh"));
        assert!(!command_exists("definitely-not-a-real-command-xyz"));
    }
}
