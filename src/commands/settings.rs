//! Automatic update settings - idempotent `defaults` reconciliation.

use anyhow::{Context as _, Result, bail};
use colored::Colorize;

use crate::Context;
use crate::cli::SettingsApplyArgs;
use crate::platform;
use crate::prefs::{self, DefaultsStore, DesiredSetting, SettingStatus};
use crate::runner;
use crate::ui;

/// System-level preference domain softwareupdate reads its policy from.
const SOFTWAREUPDATE_DOMAIN: &str = "/Library/Preferences/com.apple.SoftwareUpdate";
/// App Store auto-update lives in the commerce domain.
const COMMERCE_DOMAIN: &str = "/Library/Preferences/com.apple.commerce";

const SOFTWAREUPDATE_PLIST: &str = "/Library/Preferences/com.apple.SoftwareUpdate.plist";

pub fn apply(ctx: &Context, args: &SettingsApplyArgs) -> Result<()> {
    platform::ensure_supported_host()?;
    if !args.dry_run {
        platform::ensure_root()?;
    }

    let settings = desired_settings(args);
    if settings.is_empty() {
        bail!("No settings given; pass at least one setting flag (see --help)");
    }

    let mut store = DefaultsStore;
    let report = prefs::reconcile(&mut store, &settings, args.dry_run);

    if !ctx.quiet {
        for outcome in &report.outcomes {
            let status = match outcome.status {
                SettingStatus::InSync => "unchanged".dimmed(),
                SettingStatus::Changed => "changed".green(),
                SettingStatus::WouldChange => "would change".yellow(),
            };
            if ctx.verbose > 0 {
                let previous = outcome
                    .previous
                    .map_or_else(|| "unknown".to_string(), |v| v.to_string());
                println!(
                    "  {} {} = {} [{}] {}",
                    outcome.domain.dimmed(),
                    outcome.key.bold(),
                    outcome.desired,
                    status,
                    format!("(was {previous})").dimmed()
                );
            } else {
                println!(
                    "  {} = {} [{}]",
                    outcome.key.bold(),
                    outcome.desired,
                    status
                );
            }
        }
    }

    if let Some(error) = report.error {
        return Err(error).context("Reconciliation aborted; earlier settings stay applied");
    }

    if !ctx.quiet {
        println!();
        if report.changed {
            if args.dry_run {
                ui::warn("Settings would change (dry run, nothing written)");
            } else {
                ui::success("Automatic update settings updated");
            }
        } else {
            ui::success("Automatic update settings already in desired state");
        }
    }

    Ok(())
}

/// Map CLI flags to preference writes, in a fixed order.
///
/// The order matters: a failed write stops the run, and the operator
/// needs to know exactly which settings were already applied.
fn desired_settings(args: &SettingsApplyArgs) -> Vec<DesiredSetting> {
    let mapping = [
        (SOFTWAREUPDATE_DOMAIN, "AutomaticCheckEnabled", args.auto_check),
        (SOFTWAREUPDATE_DOMAIN, "AutomaticDownload", args.auto_download),
        (
            SOFTWAREUPDATE_DOMAIN,
            "AutomaticallyInstallMacOSUpdates",
            args.install_macos_updates,
        ),
        (SOFTWAREUPDATE_DOMAIN, "ConfigDataInstall", args.config_data),
        (
            SOFTWAREUPDATE_DOMAIN,
            "CriticalUpdateInstall",
            args.critical_updates,
        ),
        (COMMERCE_DOMAIN, "AutoUpdate", args.app_updates),
    ];

    mapping
        .into_iter()
        .filter_map(|(domain, key, value)| value.map(|v| DesiredSetting::new(domain, key, v)))
        .collect()
}

pub fn show(_ctx: &Context) -> Result<()> {
    platform::ensure_supported_host()?;

    let output = runner::run_capture("plutil", &["-p", SOFTWAREUPDATE_PLIST])
        .context("Failed to read SoftwareUpdate preferences")?;

    ui::header("SoftwareUpdate Preferences");
    println!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> SettingsApplyArgs {
        SettingsApplyArgs {
            auto_check: None,
            auto_download: None,
            install_macos_updates: None,
            config_data: None,
            critical_updates: None,
            app_updates: None,
            dry_run: false,
        }
    }

    #[test]
    fn test_unset_flags_produce_no_settings() {
        assert!(desired_settings(&args()).is_empty());
    }

    #[test]
    fn test_settings_keep_flag_order() {
        let mut all = args();
        all.auto_check = Some(true);
        all.auto_download = Some(true);
        all.install_macos_updates = Some(false);
        all.config_data = Some(true);
        all.critical_updates = Some(true);
        all.app_updates = Some(false);

        let settings = desired_settings(&all);
        let keys: Vec<&str> = settings.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "AutomaticCheckEnabled",
                "AutomaticDownload",
                "AutomaticallyInstallMacOSUpdates",
                "ConfigDataInstall",
                "CriticalUpdateInstall",
                "AutoUpdate",
            ]
        );
    }

    #[test]
    fn test_app_updates_target_the_commerce_domain() {
        let mut only_app = args();
        only_app.app_updates = Some(true);

        let settings = desired_settings(&only_app);
        assert_eq!(settings.len(), 1);
        assert_eq!(settings[0].domain, COMMERCE_DOMAIN);
        assert_eq!(settings[0].key, "AutoUpdate");
        assert!(settings[0].value);
    }
}
