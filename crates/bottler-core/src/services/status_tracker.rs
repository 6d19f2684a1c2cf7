//! Process-wide per-environment progress store.
//!
//! Records are created on first reference. The outer map lock is only held
//! long enough to find or insert an entry; each record has its own mutex so
//! workflows on different environments never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use chrono::Local;
use tracing::info;

use crate::domain::{EnvStatus, ExeCandidate, StatusRecord, StatusSnapshot};

/// Status tracker keyed by environment name.
#[derive(Debug, Default)]
pub struct StatusTracker {
    records: RwLock<HashMap<String, Arc<Mutex<StatusRecord>>>>,
}

fn lock(record: &Mutex<StatusRecord>) -> MutexGuard<'_, StatusRecord> {
    record.lock().unwrap_or_else(PoisonError::into_inner)
}

impl StatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or default-construct the record for an environment.
    fn entry(&self, name: &str) -> Arc<Mutex<StatusRecord>> {
        {
            let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(record) = records.get(name) {
                return Arc::clone(record);
            }
        }
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(records.entry(name.to_string()).or_default())
    }

    /// Append one timestamped line and mark the environment running.
    pub fn log(&self, name: &str, message: impl AsRef<str>) {
        let message = message.as_ref();
        let line = format!("[{}] {}", Local::now().format("%H:%M:%S"), message);
        info!(target: "bottler.status", environment = %name, "{message}");

        let record = self.entry(name);
        let mut record = lock(&record);
        record.log.push(line);
        record.status = EnvStatus::Running;
    }

    /// Replace the candidate list wholesale.
    pub fn set_candidates(&self, name: &str, candidates: Vec<ExeCandidate>) {
        let record = self.entry(name);
        let mut record = lock(&record);
        record.candidates = candidates;
        record.scanned = true;
    }

    /// Cached candidates, `None` until an enumeration has been stored.
    pub fn cached_candidates(&self, name: &str) -> Option<Vec<ExeCandidate>> {
        let record = self.entry(name);
        let record = lock(&record);
        record.scanned.then(|| record.candidates.clone())
    }

    /// Record the sub-directory that scopes candidate searches.
    pub fn set_subpath(&self, name: &str, subpath: Option<String>) {
        let record = self.entry(name);
        lock(&record).subpath = subpath;
    }

    pub fn subpath(&self, name: &str) -> Option<String> {
        let record = self.entry(name);
        let subpath = lock(&record).subpath.clone();
        subpath
    }

    /// Full copy of the record.
    pub fn record(&self, name: &str) -> StatusRecord {
        let record = self.entry(name);
        let copy = lock(&record).clone();
        copy
    }

    /// Snapshot for external consumers with trimmed candidates.
    pub fn snapshot(&self, name: &str) -> StatusSnapshot {
        let record = self.entry(name);
        let snapshot = StatusSnapshot::from_record(name, &lock(&record));
        snapshot
    }

    /// Names of every environment referenced so far.
    pub fn names(&self) -> Vec<String> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = records.keys().cloned().collect();
        names.sort();
        names
    }
}
