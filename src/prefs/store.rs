//! Preference store access over the `defaults` command.

use anyhow::{Context, Result, bail};
use std::process::Command;

/// Boolean key-value access to a named preference domain.
///
/// Reads fail soft: a missing key, unparseable output, or any execution
/// error reads as `None` (unknown), which is distinct from `Some(false)`.
pub trait PrefStore {
    fn read_bool(&self, domain: &str, key: &str) -> Option<bool>;
    fn write_bool(&mut self, domain: &str, key: &str, value: bool) -> Result<()>;
}

/// The host preference store, backed by `defaults read` / `defaults write`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultsStore;

impl PrefStore for DefaultsStore {
    fn read_bool(&self, domain: &str, key: &str) -> Option<bool> {
        let output = Command::new("defaults")
            .args(["read", domain, key])
            .output()
            .ok()?;

        if !output.status.success() {
            // Key doesn't exist
            return None;
        }

        match String::from_utf8_lossy(&output.stdout).trim() {
            "1" => Some(true),
            "0" => Some(false),
            _ => None,
        }
    }

    fn write_bool(&mut self, domain: &str, key: &str, value: bool) -> Result<()> {
        let value_str = if value { "true" } else { "false" };
        let output = Command::new("defaults")
            .args(["write", domain, key, "-bool", value_str])
            .output()
            .context("Failed to execute defaults write")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("defaults write failed: {}", stderr.trim());
        }

        Ok(())
    }
}
