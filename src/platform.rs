//! Host platform guards and the full-installer name table.
//!
//! Every mutating operation starts with the same preflight: running on
//! macOS, on a major version this tool knows, and (where the operation
//! writes system state) as root.

use anyhow::{Context, Result, bail};

use crate::runner;
use crate::version::Version;

/// macOS major versions this tool knows how to drive.
pub const SUPPORTED_MAJORS: &[u64] = &[13, 14, 15];

/// Full-installer application names shipped per macOS major version.
///
/// Extend this table when a new major ships; nothing else needs to know
/// the app names.
const INSTALLER_APPS: &[(u64, &str)] = &[
    (13, "Install macOS Ventura.app"),
    (14, "Install macOS Sonoma.app"),
    (15, "Install macOS 15.app"),
];

/// Installer application name for a major version, if known.
pub fn installer_app(major: u64) -> Option<&'static str> {
    INSTALLER_APPS
        .iter()
        .find(|(version, _)| *version == major)
        .map(|(_, name)| *name)
}

/// Version of the running host, from `sw_vers`.
pub fn host_version() -> Result<Version> {
    let raw = runner::run_capture("sw_vers", &["-productVersion"])
        .context("Failed to determine the macOS version")?;
    let version = Version::parse(&raw);
    if version.is_empty() {
        bail!("Unrecognized sw_vers output: {raw}");
    }
    Ok(version)
}

/// Guard: running on macOS, on a supported major version.
///
/// Returns the host major so callers can reuse it.
pub fn ensure_supported_host() -> Result<u64> {
    if !cfg!(target_os = "macos") {
        bail!(
            "This tool can only run on macOS. Current OS: {}",
            std::env::consts::OS
        );
    }
    let version = host_version()?;
    let major = version
        .major()
        .context("Failed to determine the macOS major version")?;
    if !SUPPORTED_MAJORS.contains(&major) {
        bail!("Unsupported macOS major version {major} (supported: 13, 14, 15)");
    }
    Ok(major)
}

#[cfg(unix)]
pub fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
pub fn is_root() -> bool {
    false
}

/// Guard: the effective user must be root.
pub fn ensure_root() -> Result<()> {
    if !is_root() {
        bail!("This operation must run as root (try sudo)");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_installer_app_known_majors() {
        assert_eq!(installer_app(13), Some("Install macOS Ventura.app"));
        assert_eq!(installer_app(14), Some("Install macOS Sonoma.app"));
        assert_eq!(installer_app(15), Some("Install macOS 15.app"));
    }

    #[test]
    fn test_installer_app_unknown_major() {
        assert_eq!(installer_app(12), None);
        assert_eq!(installer_app(16), None);
    }

    #[test]
    fn test_every_supported_major_has_an_installer() {
        for major in SUPPORTED_MAJORS {
            assert!(installer_app(*major).is_some());
        }
    }
}
