//! Full OS install via the bundled startosinstall binary.
//!
//! The target major version is mapped to its installer application, the
//! bundled `startosinstall` is launched detached, and the start is
//! confirmed from the preparation-progress marker in its log. Once
//! confirmed the install is out of our hands - the host reboots on its
//! own schedule.

use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Result, bail};
use dialoguer::Confirm;
use regex::Regex;

use crate::Context;
use crate::cli::OsInstallArgs;
use crate::launch::{LaunchOutcome, LaunchSpec};
use crate::platform;
use crate::progress;
use crate::secret;
use crate::ui;

const OSINSTALL_LOG: &str = "/tmp/startosinstall.log";

/// startosinstall reports preparation progress once it is really running.
static PREPARE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Preparing: \d+\.\d+%").expect("prepare marker pattern"));

pub fn run(ctx: &Context, args: &OsInstallArgs) -> Result<()> {
    platform::ensure_supported_host()?;
    platform::ensure_root()?;

    let Some(app) = platform::installer_app(args.version) else {
        bail!(
            "Unsupported target version {}; known versions: 13, 14, 15",
            args.version
        );
    };
    let binary = PathBuf::from("/Applications")
        .join(app)
        .join("Contents/Resources/startosinstall");
    if !binary.is_file() {
        bail!(
            "Installer not found: {}. Fetch it first with 'macup download'",
            binary.display()
        );
    }

    if !args.yes {
        let proceed = Confirm::new()
            .with_prompt(format!(
                "Start the macOS {} install? The host will reboot",
                args.version
            ))
            .default(false)
            .interact()?;
        if !proceed {
            ui::warn("Aborted");
            return Ok(());
        }
    }

    let password = secret::admin_password(&args.user)?;

    let spec = LaunchSpec::new(binary, OSINSTALL_LOG, PREPARE_MARKER.clone())
        .args([
            "--agreetolicense",
            "--forcequitapps",
            "--nointeraction",
            "--user",
            args.user.as_str(),
            "--stdinpass",
        ])
        .secret(password)
        .interval(Duration::from_secs(args.poll_interval))
        .timeout(Duration::from_secs(args.confirm_timeout));

    if !ctx.quiet {
        ui::info(&format!(
            "Starting the macOS {} install in the background",
            args.version
        ));
    }

    let pb = progress::spinner("Waiting for preparation progress...");
    let outcome = spec.launch();
    pb.finish_and_clear();

    match outcome {
        LaunchOutcome::Started => {
            ui::success("OS installation started; the host will reboot when ready");
            Ok(())
        }
        LaunchOutcome::NotConfirmed { log_path } => bail!(
            "startosinstall did not report progress within {}s; it may still be preparing - check {}",
            args.confirm_timeout,
            log_path.display()
        ),
        LaunchOutcome::Failed { error } => bail!("Failed to start the OS install: {error}"),
    }
}
