//! Background install of a single update by label.
//!
//! The update is verified against a freshly fetched catalog, then
//! `softwareupdate --install` is launched detached (the host reboots
//! when the update requires it) and the start is confirmed from the
//! download-progress marker in its log.

use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Result, bail};
use regex::Regex;

use crate::Context;
use crate::catalog;
use crate::cli::InstallArgs;
use crate::launch::{LaunchOutcome, LaunchSpec};
use crate::platform;
use crate::progress;
use crate::runner;
use crate::secret;
use crate::ui;

const INSTALL_LOG: &str = "/tmp/softwareupdate_install.log";

/// `softwareupdate --verbose` prints this once the download is under way.
static DOWNLOAD_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Downloading: \d+\.\d+%").expect("download marker pattern"));

pub fn run(ctx: &Context, args: &InstallArgs) -> Result<()> {
    platform::ensure_supported_host()?;
    platform::ensure_root()?;

    // The label must exist in a fresh catalog; anything else is a typo
    // or an update that is no longer offered to this host.
    let listing = runner::run_merged("softwareupdate", &["--list"])?;
    let labels = catalog::available_labels(&listing);
    if !labels.iter().any(|l| l == &args.label) {
        bail!(
            "Update with label '{}' not found in available updates",
            args.label
        );
    }

    let password = secret::admin_password(&args.user)?;

    let spec = LaunchSpec::new("softwareupdate", INSTALL_LOG, DOWNLOAD_MARKER.clone())
        .args([
            "--install",
            args.label.as_str(),
            "--agree-to-license",
            "--verbose",
            "--no-scan",
            "--restart",
            "--stdinpass",
            "--user",
            args.user.as_str(),
        ])
        .secret(password)
        .interval(Duration::from_secs(args.poll_interval))
        .timeout(Duration::from_secs(args.confirm_timeout));

    if !ctx.quiet {
        ui::info(&format!("Starting '{}' in the background", args.label));
    }

    let pb = progress::spinner("Waiting for download progress...");
    let outcome = spec.launch();
    pb.finish_and_clear();

    match outcome {
        LaunchOutcome::Started => {
            ui::success(&format!(
                "Update '{}' installation started; the host will restart if required",
                args.label
            ));
            Ok(())
        }
        LaunchOutcome::NotConfirmed { log_path } => bail!(
            "Update '{}' did not report download progress within {}s; it may still start - check {}",
            args.label,
            args.confirm_timeout,
            log_path.display()
        ),
        LaunchOutcome::Failed { error } => {
            bail!("Failed to start update '{}': {error}", args.label)
        }
    }
}
