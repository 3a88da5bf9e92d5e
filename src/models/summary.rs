//! Per-run result accounting.

use serde::{Deserialize, Serialize};

/// What happened for a single configured source during one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceReport {
    pub source: String,
    /// Raw items returned by the vendor endpoint.
    pub fetched: usize,
    /// Items dropped because no usable timestamp could be extracted.
    pub skipped_no_timestamp: usize,
    /// Set when the fetch itself failed; the source contributed zero records.
    pub error: Option<String>,
}

impl SourceReport {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Aggregate outcome of one batch run. Per-record and per-source failures
/// are contained here rather than aborting the batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub sources: Vec<SourceReport>,
    pub total_records: usize,
    pub rows_written: usize,
    /// Access metrics skipped because their email matched no known user.
    pub unresolved_users: usize,
}

impl RunSummary {
    pub fn failed_sources(&self) -> usize {
        self.sources.iter().filter(|s| s.failed()).count()
    }

    pub fn skipped_records(&self) -> usize {
        self.sources.iter().map(|s| s.skipped_no_timestamp).sum()
    }
}
