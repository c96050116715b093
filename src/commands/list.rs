//! Catalog listing commands.

use anyhow::Result;
use colored::Colorize;

use crate::Context;
use crate::catalog::{self, CatalogRecord, ProductFilter, SizeField, VersionFilter};
use crate::platform;
use crate::runner;
use crate::ui;

pub fn updates(
    _ctx: &Context,
    product: ProductFilter,
    version_pattern: Option<&str>,
    json: bool,
) -> Result<()> {
    platform::ensure_supported_host()?;

    let filter = version_pattern.map(VersionFilter::new).transpose()?;
    let raw = runner::run_merged("softwareupdate", &["--list"])?;
    let records = catalog::parse_updates(&raw, product, filter.as_ref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    print_records(&records, "No matching updates available");
    Ok(())
}

pub fn installers(
    _ctx: &Context,
    latest_only: bool,
    version_pattern: Option<&str>,
    json: bool,
) -> Result<()> {
    platform::ensure_supported_host()?;

    let filter = version_pattern.map(VersionFilter::new).transpose()?;
    let raw = runner::run_merged("softwareupdate", &["--list-full-installers"])?;
    let mut records = catalog::parse_installers(&raw, filter.as_ref())?;

    if latest_only {
        records = catalog::reduce_latest(records);
    } else {
        catalog::sort_by_version_desc(&mut records);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    print_records(&records, "No matching installers available");
    Ok(())
}

fn print_records(records: &[CatalogRecord], empty_msg: &str) {
    if records.is_empty() {
        ui::dim(empty_msg);
        return;
    }

    for record in records {
        ui::section(&record.title);
        if let Some(label) = &record.label {
            ui::kv("Label", label);
        }
        ui::kv("Version", &record.version);
        match &record.size {
            SizeField::KiB(kib) => ui::kv("Size", &ui::format_kib(*kib)),
            SizeField::Raw(raw) => ui::kv("Size", raw),
        }
        if let Some(build) = &record.build {
            ui::kv("Build", build);
        }
        if let Some(deferred) = &record.deferred {
            ui::kv("Deferred", deferred);
        }
        if let Some(recommended) = record.recommended {
            ui::kv("Recommended", if recommended { "yes" } else { "no" });
        }
        if let Some(action) = &record.action {
            ui::kv("Action", action);
        }
    }

    println!();
    println!("  {}", format!("{} record(s)", records.len()).dimmed());
}
