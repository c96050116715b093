mod catalog;
mod cli;
mod commands;
mod launch;
mod platform;
mod prefs;
mod progress;
mod runner;
mod secret;
mod ui;
mod version;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command, ListCommand, SettingsCommand};
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    match cli.command {
        Command::Settings(cmd) => match cmd {
            SettingsCommand::Apply(args) => commands::settings::apply(&ctx, &args),
            SettingsCommand::Show => commands::settings::show(&ctx),
        },
        Command::List(cmd) => match cmd {
            ListCommand::Updates {
                product,
                version_pattern,
                json,
            } => commands::list::updates(&ctx, product, version_pattern.as_deref(), json),
            ListCommand::Installers {
                latest_only,
                version_pattern,
                json,
            } => commands::list::installers(&ctx, latest_only, version_pattern.as_deref(), json),
        },
        Command::Install(args) => commands::install::run(&ctx, &args),
        Command::OsInstall(args) => commands::osinstall::run(&ctx, &args),
        Command::Download(args) => commands::download::run(&ctx, &args),
        Command::Doctor => commands::doctor::run(&ctx),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "macup", &mut io::stdout());
            Ok(())
        }
    }
}
