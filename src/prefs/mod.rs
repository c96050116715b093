//! Idempotent reconciliation of boolean preference settings.
//!
//! The preference store is treated as a key-value store: each desired
//! setting is read first and only written when the current value
//! differs, so re-running with the same desired state is always a no-op.

mod store;

pub use store::{DefaultsStore, PrefStore};

use thiserror::Error;

/// One desired boolean setting in a preference domain.
#[derive(Debug, Clone)]
pub struct DesiredSetting {
    pub domain: String,
    pub key: String,
    pub value: bool,
}

impl DesiredSetting {
    pub fn new(domain: &str, key: &str, value: bool) -> Self {
        Self {
            domain: domain.to_string(),
            key: key.to_string(),
            value,
        }
    }
}

/// How one setting compared against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingStatus {
    /// Already at the desired value.
    InSync,
    /// Differed and was written.
    Changed,
    /// Differed; the write was skipped (dry run).
    WouldChange,
}

/// Per-setting result of a reconciliation run.
#[derive(Debug)]
pub struct SettingOutcome {
    pub domain: String,
    pub key: String,
    pub desired: bool,
    /// Value found in the store; `None` means unknown or absent.
    pub previous: Option<bool>,
    pub status: SettingStatus,
}

/// A write that aborted reconciliation.
///
/// Settings applied before it stay applied; settings after it were
/// never attempted.
#[derive(Debug, Error)]
#[error("failed to set {key} in {domain}: {detail}")]
pub struct WriteError {
    pub domain: String,
    pub key: String,
    pub detail: String,
}

#[derive(Debug, Default)]
pub struct ReconcileReport {
    /// True iff at least one setting differed from its desired value,
    /// in dry-run too.
    pub changed: bool,
    pub outcomes: Vec<SettingOutcome>,
    pub error: Option<WriteError>,
}

/// Converge the store to the desired settings, strictly in order.
///
/// An unreadable or absent key counts as drift. The first write failure
/// stops the run and is carried in the report.
pub fn reconcile(
    store: &mut dyn PrefStore,
    settings: &[DesiredSetting],
    dry_run: bool,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    for setting in settings {
        let previous = store.read_bool(&setting.domain, &setting.key);

        if previous == Some(setting.value) {
            log::debug!("{} {} already {}", setting.domain, setting.key, setting.value);
            report.outcomes.push(outcome(setting, previous, SettingStatus::InSync));
            continue;
        }

        report.changed = true;

        if dry_run {
            report
                .outcomes
                .push(outcome(setting, previous, SettingStatus::WouldChange));
            continue;
        }

        match store.write_bool(&setting.domain, &setting.key, setting.value) {
            Ok(()) => {
                log::info!("Set {} {} = {}", setting.domain, setting.key, setting.value);
                report.outcomes.push(outcome(setting, previous, SettingStatus::Changed));
            }
            Err(e) => {
                report.error = Some(WriteError {
                    domain: setting.domain.clone(),
                    key: setting.key.clone(),
                    detail: format!("{e:#}"),
                });
                break;
            }
        }
    }

    report
}

fn outcome(setting: &DesiredSetting, previous: Option<bool>, status: SettingStatus) -> SettingOutcome {
    SettingOutcome {
        domain: setting.domain.clone(),
        key: setting.key.clone(),
        desired: setting.value,
        previous,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MockStore {
        values: HashMap<(String, String), bool>,
        writes: Vec<(String, String, bool)>,
        fail_key: Option<String>,
    }

    impl MockStore {
        fn with_value(mut self, domain: &str, key: &str, value: bool) -> Self {
            self.values.insert((domain.into(), key.into()), value);
            self
        }
    }

    impl PrefStore for MockStore {
        fn read_bool(&self, domain: &str, key: &str) -> Option<bool> {
            self.values.get(&(domain.into(), key.into())).copied()
        }

        fn write_bool(&mut self, domain: &str, key: &str, value: bool) -> anyhow::Result<()> {
            if self.fail_key.as_deref() == Some(key) {
                bail!("operation not permitted");
            }
            self.values.insert((domain.into(), key.into()), value);
            self.writes.push((domain.into(), key.into(), value));
            Ok(())
        }
    }

    fn settings() -> Vec<DesiredSetting> {
        vec![
            DesiredSetting::new("d", "CheckEnabled", true),
            DesiredSetting::new("d", "Download", true),
            DesiredSetting::new("d", "AutoInstall", false),
        ]
    }

    #[test]
    fn test_converges_then_is_idempotent() {
        let mut store = MockStore::default().with_value("d", "AutoInstall", false);

        let first = reconcile(&mut store, &settings(), false);
        assert!(first.changed);
        assert!(first.error.is_none());
        assert_eq!(store.writes.len(), 2);

        let second = reconcile(&mut store, &settings(), false);
        assert!(!second.changed);
        assert_eq!(store.writes.len(), 2, "second run must not write");
        assert!(second
            .outcomes
            .iter()
            .all(|o| o.status == SettingStatus::InSync));
    }

    #[test]
    fn test_dry_run_never_writes() {
        let mut store = MockStore::default();

        let report = reconcile(&mut store, &settings(), true);
        assert!(report.changed);
        assert!(store.writes.is_empty());
        assert!(report
            .outcomes
            .iter()
            .all(|o| o.status == SettingStatus::WouldChange));
    }

    #[test]
    fn test_unknown_value_counts_as_drift() {
        // Store has no value for the key; even desired=false must write
        let mut store = MockStore::default();
        let report = reconcile(
            &mut store,
            &[DesiredSetting::new("d", "AutoInstall", false)],
            false,
        );
        assert!(report.changed);
        assert_eq!(store.writes.len(), 1);
        assert_eq!(report.outcomes[0].previous, None);
    }

    #[test]
    fn test_in_sync_store_reports_unchanged() {
        let mut store = MockStore::default()
            .with_value("d", "CheckEnabled", true)
            .with_value("d", "Download", true)
            .with_value("d", "AutoInstall", false);

        let report = reconcile(&mut store, &settings(), false);
        assert!(!report.changed);
        assert!(store.writes.is_empty());
    }

    #[test]
    fn test_write_failure_stops_the_run() {
        let mut store = MockStore {
            fail_key: Some("Download".to_string()),
            ..Default::default()
        };

        let report = reconcile(&mut store, &settings(), false);

        let error = report.error.expect("failure must be reported");
        assert_eq!(error.key, "Download");

        // First setting applied and stays applied; third never attempted
        assert_eq!(store.writes.len(), 1);
        assert_eq!(store.writes[0].1, "CheckEnabled");
        assert_eq!(report.outcomes.len(), 1);
        assert!(!store.values.contains_key(&("d".into(), "AutoInstall".into())));
    }

    #[test]
    fn test_entries_applied_in_caller_order() {
        let mut store = MockStore::default();
        reconcile(&mut store, &settings(), false);
        let keys: Vec<&str> = store.writes.iter().map(|(_, k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["CheckEnabled", "Download", "AutoInstall"]);
    }
}
