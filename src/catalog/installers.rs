//! Flat installer-listing parser (`softwareupdate --list-full-installers`).

use std::sync::LazyLock;

use anyhow::{Result, bail};
use regex::Regex;

use super::{CatalogRecord, SizeField, VersionFilter};

static INSTALLER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\* Title:\s+(.*?), Version:\s+(.*?), Size:\s+(.*?), Build:\s+(\S+), Deferred:\s+(.*)$",
    )
    .expect("installer line pattern")
});

/// Parse the one-record-per-line installer listing.
///
/// Lines that do not look like records are skipped. If record lines are
/// present but none parses, the listing format has drifted and the parse
/// fails rather than reporting an empty catalog.
pub fn parse_installers(
    raw: &str,
    filter: Option<&VersionFilter>,
) -> Result<Vec<CatalogRecord>> {
    let mut records = Vec::new();
    let mut candidates = 0usize;
    let mut matched = 0usize;

    for line in raw.lines() {
        let line = line.trim();
        if !line.starts_with("* Title:") {
            continue;
        }
        candidates += 1;

        let Some(caps) = INSTALLER_LINE.captures(line) else {
            log::debug!("Skipping unrecognized installer line: {line}");
            continue;
        };
        matched += 1;

        let version = caps[2].trim().to_string();
        if let Some(filter) = filter
            && !filter.matches(&version)
        {
            continue;
        }

        records.push(CatalogRecord {
            label: None,
            title: caps[1].trim().to_string(),
            version,
            size: SizeField::parse(caps[3].trim()),
            build: Some(caps[4].trim().to_string()),
            deferred: Some(caps[5].trim().to_string()),
            recommended: None,
            action: None,
        });
    }

    if candidates > 0 && matched == 0 {
        bail!("Unrecognized installer listing format ({candidates} record lines, none parsed)");
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
Finding available software
* Title: macOS Sonoma 14.7.2, Version: 14.7.2, Size: 123456KiB, Build: 23H311, Deferred: NO
* Title: macOS Sequoia 15.1, Version: 15.1, Size: 14633346KiB, Build: 24B83, Deferred: NO
* Title: macOS Ventura 13.7.1, Version: 13.7.1, Size: 11918337KiB, Build: 22H221, Deferred: YES
";

    #[test]
    fn test_parses_fixture_line() {
        let records = parse_installers(
            "* Title: macOS Sonoma 14.7.2, Version: 14.7.2, Size: 123456KiB, Build: 23H311, Deferred: NO",
            None,
        )
        .unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.title, "macOS Sonoma 14.7.2");
        assert_eq!(record.version, "14.7.2");
        assert_eq!(record.size.kib(), Some(123_456));
        assert_eq!(record.build.as_deref(), Some("23H311"));
        assert_eq!(record.deferred.as_deref(), Some("NO"));
        assert!(record.label.is_none());
    }

    #[test]
    fn test_skips_non_record_lines() {
        let records = parse_installers(LISTING, None).unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_version_filter_is_prefix_match() {
        let filter = VersionFilter::new(r"^14\.").unwrap();
        let records = parse_installers(LISTING, Some(&filter)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].version, "14.7.2");
    }

    #[test]
    fn test_empty_listing_is_ok() {
        assert!(parse_installers("", None).unwrap().is_empty());
        assert!(
            parse_installers("No new software available.\n", None)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_marker_lines_that_never_parse_fail() {
        // A renamed field means the format drifted; an empty result would
        // silently hide every installer
        let drifted = "* Title: macOS Sonoma, Release: 14.7.2, Bytes: 1\n";
        assert!(parse_installers(drifted, None).is_err());
    }

    #[test]
    fn test_filtered_out_records_do_not_trip_the_format_guard() {
        let filter = VersionFilter::new(r"^99\.").unwrap();
        let records = parse_installers(LISTING, Some(&filter)).unwrap();
        assert!(records.is_empty());
    }
}
