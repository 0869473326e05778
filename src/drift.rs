//! Drift between a preference table and a profile's live prefs.js
//!
//! Firefox rewrites `prefs.js` on exit with every preference that differs
//! from its built-in default. A setting from the table that is missing there
//! is therefore either equal to the default or not applied yet; this module
//! only reports what it sees and makes no guess between the two.

use crate::table::SettingsTable;
use crate::types::{PrefValue, Setting};
use serde::Serialize;
use std::collections::HashMap;

/// How one setting compares with the live profile
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DriftStatus {
    /// prefs.js holds the same value
    Applied,
    /// prefs.js holds a different value
    Differs { live: PrefValue },
    /// prefs.js does not mention the key
    NotPersisted,
}

#[derive(Debug, Clone, Serialize)]
pub struct DriftEntry {
    pub key: String,
    pub expected: PrefValue,
    #[serde(flatten)]
    pub status: DriftStatus,
}

/// Per-setting comparison, in table order
#[derive(Debug, Clone, Default, Serialize)]
pub struct DriftReport {
    pub applied: usize,
    pub differs: usize,
    pub not_persisted: usize,
    pub entries: Vec<DriftEntry>,
}

impl DriftReport {
    /// True when no setting holds a different live value
    pub fn is_in_sync(&self) -> bool {
        self.differs == 0
    }

    pub fn differing(&self) -> impl Iterator<Item = &DriftEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.status, DriftStatus::Differs { .. }))
    }
}

/// Compare every setting of `table` with the parsed live preferences
///
/// When prefs.js repeats a key, the last occurrence wins, as it does in
/// Firefox.
pub fn compute_drift(table: &SettingsTable, live: &[Setting]) -> DriftReport {
    let live: HashMap<&str, &PrefValue> = live
        .iter()
        .map(|s| (s.key.as_str(), &s.value))
        .collect();

    let mut report = DriftReport::default();
    for setting in table {
        let status = match live.get(setting.key.as_str()) {
            Some(&value) if value == &setting.value => {
                report.applied += 1;
                DriftStatus::Applied
            }
            Some(&value) => {
                report.differs += 1;
                DriftStatus::Differs {
                    live: value.clone(),
                }
            }
            None => {
                report.not_persisted += 1;
                DriftStatus::NotPersisted
            }
        };
        report.entries.push(DriftEntry {
            key: setting.key.clone(),
            expected: setting.value.clone(),
            status,
        });
    }

    tracing::debug!(
        applied = report.applied,
        differs = report.differs,
        not_persisted = report.not_persisted,
        "computed drift"
    );
    report
}
