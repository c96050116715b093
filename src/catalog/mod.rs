//! Parsing and shaping of `softwareupdate` catalog listings.
//!
//! The listing output is human-oriented text scraped with line patterns.
//! Lines that do not match are skipped; a listing where record-marker
//! lines are present but none parses is treated as a format change and
//! fails instead of returning an empty catalog.

pub mod installers;
pub mod updates;

pub use installers::parse_installers;
pub use updates::{available_labels, parse_updates};

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use anyhow::{Context, Result};
use clap::ValueEnum;
use regex::Regex;
use serde::Serialize;

use crate::version::Version;

/// Size column of a listing row: a KiB count when the tool printed one,
/// otherwise the raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SizeField {
    KiB(u64),
    Raw(String),
}

impl SizeField {
    pub fn parse(raw: &str) -> Self {
        raw.strip_suffix("KiB")
            .and_then(|n| n.trim().parse().ok())
            .map_or_else(|| Self::Raw(raw.to_string()), Self::KiB)
    }

    pub fn kib(&self) -> Option<u64> {
        match self {
            Self::KiB(kib) => Some(*kib),
            Self::Raw(_) => None,
        }
    }
}

/// One normalized row from a catalog listing.
///
/// Which fields are populated depends on the source format: `build` and
/// `deferred` come from the installer listing, `label`, `recommended`
/// and `action` from the update listing.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogRecord {
    /// Update label used to target an install.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub title: String,
    pub version: String,
    pub size: SizeField,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deferred: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// Title-based product classifier for update listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProductFilter {
    All,
    Macos,
    Xcode,
    CommandLineTools,
    Safari,
    Security,
    Firmware,
    PrinterDrivers,
}

impl ProductFilter {
    pub fn matches(self, title: &str) -> bool {
        match self {
            Self::All => true,
            Self::Macos => title.starts_with("macOS"),
            Self::Xcode => title.starts_with("Xcode ") || title.starts_with("Xcode-"),
            Self::CommandLineTools => title.starts_with("Command Line Tools"),
            Self::Safari => title.starts_with("Safari"),
            Self::Security => title.starts_with("Security Update"),
            Self::Firmware => title.contains("Firmware Update"),
            Self::PrinterDrivers => title.contains("Printer Drivers"),
        }
    }
}

/// Version filter with starts-with semantics: the pattern must match at
/// the beginning of the version string but need not cover all of it, so
/// `^14\.` and `14` both select "14.7.2".
#[derive(Debug, Clone)]
pub struct VersionFilter {
    regex: Regex,
}

impl VersionFilter {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{pattern})"))
            .with_context(|| format!("Invalid version pattern: {pattern}"))?;
        Ok(Self { regex })
    }

    pub fn matches(&self, version: &str) -> bool {
        self.regex.is_match(version)
    }
}

/// Keep only the newest record per major version, descending by major.
///
/// Records whose version has no numeric major are dropped. Within a
/// major, the greatest full version wins and ties keep the first seen.
pub fn reduce_latest(records: Vec<CatalogRecord>) -> Vec<CatalogRecord> {
    let mut latest: BTreeMap<u64, (Version, CatalogRecord)> = BTreeMap::new();

    for record in records {
        let version = Version::parse(&record.version);
        let Some(major) = version.major() else {
            continue;
        };
        match latest.entry(major) {
            Entry::Vacant(slot) => {
                slot.insert((version, record));
            }
            Entry::Occupied(mut slot) => {
                if version > slot.get().0 {
                    slot.insert((version, record));
                }
            }
        }
    }

    latest.into_values().rev().map(|(_, record)| record).collect()
}

/// Sort records newest-first by their full parsed version.
pub fn sort_by_version_desc(records: &mut [CatalogRecord]) {
    records.sort_by(|a, b| Version::parse(&b.version).cmp(&Version::parse(&a.version)));
}
