use crate::core::{BatchOutcome, ExtractionReport, SkipReason};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SkippedBatch {
    pub batch: usize,
    pub record_count: usize,
    pub reason: SkipReason,
}

/// JSON 執行摘要，記錄哪些批次被略過以及原因
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub model: String,
    pub batch_size: usize,
    pub total_records: usize,
    pub total_batches: usize,
    pub processed_batches: usize,
    pub skipped_batches: Vec<SkippedBatch>,
    pub artifacts: Vec<String>,
}

impl RunSummary {
    pub fn from_report(
        report: &ExtractionReport,
        model: &str,
        batch_size: usize,
        artifacts: Vec<String>,
    ) -> Self {
        let skipped_batches = report
            .batches
            .iter()
            .filter_map(|b| match &b.outcome {
                BatchOutcome::Skipped(reason) => Some(SkippedBatch {
                    batch: b.index,
                    record_count: b.record_count,
                    reason: reason.clone(),
                }),
                BatchOutcome::Processed(_) => None,
            })
            .collect();

        Self {
            started_at: report.started_at,
            finished_at: Utc::now(),
            model: model.to_string(),
            batch_size,
            total_records: report.total_records,
            total_batches: report.batches.len(),
            processed_batches: report.processed_count(),
            skipped_batches,
            artifacts,
        }
    }
}
