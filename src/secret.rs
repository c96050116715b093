//! Admin credential sourcing.
//!
//! The password is never accepted as a command-line argument and never
//! interpolated into a command string; it is read from the environment
//! or prompted with echo off, then piped to the installer's stdin.

use anyhow::{Context as _, Result};
use dialoguer::Password;

pub const PASSWORD_ENV: &str = "MACUP_ADMIN_PASSWORD";

/// Password for the local administrator accepting the license.
pub fn admin_password(user: &str) -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV)
        && !password.is_empty()
    {
        log::debug!("Using admin password from ${PASSWORD_ENV}");
        return Ok(password);
    }

    Password::new()
        .with_prompt(format!("Password for {user}"))
        .interact()
        .context("Failed to read admin password")
}
