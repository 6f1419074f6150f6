use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Mutex;

use crate::error::ItemError;

/// A page URL paired with the error that stopped it.
#[derive(Debug, Serialize)]
pub struct FailureRecord {
    pub url: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: ItemError,
}

fn serialize_display<T: fmt::Display, S: Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(value)
}

impl fmt::Display for FailureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to process link '{}': {}", self.url, self.error)
    }
}

/// Append-only log of per-item failures, shared by every worker of a batch.
///
/// Records keep completion order and are only ever appended. The list is
/// read once, after all writers have joined.
#[derive(Debug, Default)]
pub struct FailureCollector {
    records: Mutex<Vec<FailureRecord>>,
}

impl FailureCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, url: impl Into<String>, error: ItemError) {
        let url = url.into();
        tracing::warn!(%url, %error, "item failed");
        // push is the only write under this lock; poisoning leaves the Vec intact
        let mut records = self
            .records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        records.push(FailureRecord { url, error });
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empties the log. Meant for after every writer has finished.
    pub fn take(&self) -> Vec<FailureRecord> {
        std::mem::take(
            &mut *self
                .records
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }

    pub fn into_records(self) -> Vec<FailureRecord> {
        self.records
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
