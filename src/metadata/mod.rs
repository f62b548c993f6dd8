pub mod csv;
pub mod jsonl;

use std::path::Path;

use thiserror::Error;

use crate::analysis::VisitRecord;
use crate::cli::MetadataBackend;

/// Machine-readable counters for one analysis run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RunSummary {
    pub rows_read: u64,
    pub rows_classified: u64,
    pub rows_skipped: u64,
    pub work_hours_visits: u64,
    pub inappropriate_visits: u64,
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Machine-readable output sink alongside the HTML report. Every record is
/// stamped with the tool version, the rules hash, and the input path so a
/// run can be reproduced from its own output.
pub trait MetadataSink: Send + Sync {
    fn record_visit(&self, visit: &VisitRecord) -> Result<(), MetadataError>;
    fn record_run_summary(&self, summary: &RunSummary) -> Result<(), MetadataError>;
    fn flush(&self) -> Result<(), MetadataError>;
}

pub fn build_sink(
    backend: MetadataBackend,
    tool_version: &str,
    rules_hash: &str,
    source_path: &Path,
    run_output_dir: &Path,
) -> Result<Box<dyn MetadataSink>, MetadataError> {
    match backend {
        MetadataBackend::Jsonl => Ok(Box::new(jsonl::JsonlSink::new(
            tool_version,
            rules_hash,
            source_path,
            run_output_dir,
        )?)),
        MetadataBackend::Csv => Ok(Box::new(csv::CsvSink::new(
            tool_version,
            rules_hash,
            source_path,
            run_output_dir,
        )?)),
    }
}
