//! Fetch a full macOS installer into /Applications.

use std::path::Path;

use anyhow::{Context as _, Result, bail};

use crate::Context;
use crate::cli::DownloadArgs;
use crate::platform;
use crate::progress;
use crate::runner;
use crate::ui;
use crate::version::Version;

pub fn run(ctx: &Context, args: &DownloadArgs) -> Result<()> {
    platform::ensure_supported_host()?;

    let Some(major) = Version::parse(&args.version).major() else {
        bail!(
            "Invalid macOS version '{}': no numeric major component",
            args.version
        );
    };
    let Some(app) = platform::installer_app(major) else {
        bail!("No installer mapping for macOS major version {major}; known versions: 13, 14, 15");
    };
    let expected = Path::new("/Applications").join(app);

    if !ctx.quiet {
        ui::info(&format!(
            "Fetching the full installer for {} (this can take a while)",
            args.version
        ));
    }

    let pb = progress::spinner("Downloading...");
    let result = runner::run_capture(
        "softwareupdate",
        &[
            "--fetch-full-installer",
            "--full-installer-version",
            &args.version,
        ],
    );
    pb.finish_and_clear();
    result.with_context(|| {
        format!(
            "Failed to fetch the full installer for version '{}'",
            args.version
        )
    })?;

    // The fetch reports success even when nothing usable landed; the
    // installer bundle is the ground truth
    if !expected.is_dir() {
        bail!(
            "Installer directory '{}' was not found after the fetch",
            expected.display()
        );
    }

    ui::success(&format!(
        "Installer for {} is at {}",
        args.version,
        expected.display()
    ));
    Ok(())
}
