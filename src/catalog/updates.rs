//! Label-grouped update-listing parser (`softwareupdate --list`).

use std::sync::LazyLock;

use anyhow::{Result, bail};
use regex::Regex;

use super::{CatalogRecord, ProductFilter, SizeField, VersionFilter};

static LABEL_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\* Label:\s+(.*)$").expect("label line pattern"));

static DETAIL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*Title:\s+(.*?),\s*Version:\s+(.*?),\s*Size:\s+(.*?),\s*Recommended:\s+(YES|NO)(?:,\s*Action:\s*([^,\s]+))?,?$",
    )
    .expect("detail line pattern")
});

/// Parse the two-line label/detail update listing.
///
/// Each record is a `* Label:` line followed by an indented `Title:`
/// detail line. A detail line without a preceding parsed label is
/// skipped together with its record; so is a label whose detail line
/// fails the product or version filter.
pub fn parse_updates(
    raw: &str,
    product: ProductFilter,
    filter: Option<&VersionFilter>,
) -> Result<Vec<CatalogRecord>> {
    let mut records = Vec::new();
    let mut labels = 0usize;
    let mut matched = 0usize;
    let mut current_label: Option<String> = None;

    for line in raw.lines() {
        let line = line.trim();

        if line.starts_with("* Label:") {
            if let Some(caps) = LABEL_LINE.captures(line) {
                labels += 1;
                current_label = Some(caps[1].trim().to_string());
            }
            continue;
        }

        if !line.starts_with("Title:") {
            continue;
        }

        // Orphan detail line: nothing to attach it to
        let Some(label) = current_label.take() else {
            continue;
        };

        let Some(caps) = DETAIL_LINE.captures(line) else {
            log::debug!("Skipping unrecognized update detail line: {line}");
            continue;
        };
        matched += 1;

        let title = caps[1].trim().to_string();
        let version = caps[2].trim().to_string();

        if !product.matches(&title) {
            continue;
        }
        if let Some(filter) = filter
            && !filter.matches(&version)
        {
            continue;
        }

        records.push(CatalogRecord {
            label: Some(label),
            title,
            version,
            size: SizeField::parse(caps[3].trim()),
            build: None,
            deferred: None,
            recommended: Some(&caps[4] == "YES"),
            action: caps.get(5).map(|m| m.as_str().to_string()),
        });
    }

    if labels > 0 && matched == 0 {
        bail!("Unrecognized update listing format ({labels} labels, no detail lines parsed)");
    }

    Ok(records)
}

/// All labels present in a raw update listing, unfiltered.
///
/// Used to verify a requested label against a fresh catalog before an
/// install is attempted.
pub fn available_labels(raw: &str) -> Vec<String> {
    raw.lines()
        .filter_map(|line| LABEL_LINE.captures(line.trim()))
        .map(|caps| caps[1].trim().to_string())
        .collect()
}
