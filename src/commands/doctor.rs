//! Host health checks.

use anyhow::Result;
use colored::Colorize;

use crate::Context;
use crate::platform;
use crate::runner;
use crate::ui;

pub fn run(_ctx: &Context) -> Result<()> {
    ui::header("Host Health Check");

    let mut problems = 0usize;

    ui::section("Platform");
    if cfg!(target_os = "macos") {
        println!("  {} Running on macOS", "✓".green());
        match platform::host_version() {
            Ok(version) => {
                let supported = version
                    .major()
                    .is_some_and(|m| platform::SUPPORTED_MAJORS.contains(&m));
                if supported {
                    println!("  {} macOS {} is supported", "✓".green(), version);
                } else {
                    println!(
                        "  {} macOS {} is not supported (need 13, 14 or 15)",
                        "✗".red(),
                        version
                    );
                    problems += 1;
                }
            }
            Err(e) => {
                println!("  {} Could not read the host version: {e:#}", "✗".red());
                problems += 1;
            }
        }
    } else {
        println!(
            "  {} Not running on macOS ({})",
            "✗".red(),
            std::env::consts::OS
        );
        problems += 1;
    }

    ui::section("Required Commands");
    let commands = [
        ("softwareupdate", "Update catalogs and install driver"),
        ("defaults", "Preference store access"),
        ("plutil", "Preference state reporting"),
        ("sw_vers", "Host version detection"),
    ];
    for (cmd, desc) in commands {
        if runner::command_exists(cmd) {
            println!("  {} {} - {}", "✓".green(), cmd, desc.dimmed());
        } else {
            println!("  {} {} - {} {}", "✗".red(), cmd, desc, "(missing)".red());
            problems += 1;
        }
    }

    ui::section("Privileges");
    if platform::is_root() {
        println!("  {} Running as root", "✓".green());
    } else {
        println!(
            "  {} Not running as root {}",
            "○".dimmed(),
            "(required for settings apply, install, os-install)".dimmed()
        );
    }

    println!();
    if problems == 0 {
        ui::success("Host is ready for update management");
    } else {
        ui::warn(&format!("{problems} problem(s) found"));
    }

    Ok(())
}
