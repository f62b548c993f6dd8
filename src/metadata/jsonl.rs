use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;

use crate::analysis::VisitRecord;
use crate::metadata::{MetadataError, MetadataSink, RunSummary};

pub struct JsonlSink {
    tool_version: String,
    rules_hash: String,
    source_path: String,
    run_output_dir: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

#[derive(Serialize)]
struct VisitJsonl<'a> {
    #[serde(flatten)]
    visit: &'a VisitRecord,
    tool_version: &'a str,
    rules_hash: &'a str,
    source_path: &'a str,
}

#[derive(Serialize)]
struct RunSummaryJson<'a> {
    #[serde(flatten)]
    summary: &'a RunSummary,
    tool_version: &'a str,
    rules_hash: &'a str,
    source_path: &'a str,
}

impl JsonlSink {
    pub fn new(
        tool_version: &str,
        rules_hash: &str,
        source_path: &Path,
        run_output_dir: &Path,
    ) -> Result<Self, MetadataError> {
        std::fs::create_dir_all(run_output_dir)?;
        let file = File::create(run_output_dir.join("visits.jsonl"))?;
        Ok(Self {
            tool_version: tool_version.to_string(),
            rules_hash: rules_hash.to_string(),
            source_path: source_path.to_string_lossy().to_string(),
            run_output_dir: run_output_dir.to_path_buf(),
            writer: Mutex::new(BufWriter::new(file)),
        })
    }
}

impl MetadataSink for JsonlSink {
    fn record_visit(&self, visit: &VisitRecord) -> Result<(), MetadataError> {
        let record = VisitJsonl {
            visit,
            tool_version: &self.tool_version,
            rules_hash: &self.rules_hash,
            source_path: &self.source_path,
        };
        let mut guard = self.writer.lock().unwrap();
        serde_json::to_writer(&mut *guard, &record)?;
        guard.write_all(b"\n")?;
        Ok(())
    }

    fn record_run_summary(&self, summary: &RunSummary) -> Result<(), MetadataError> {
        let record = RunSummaryJson {
            summary,
            tool_version: &self.tool_version,
            rules_hash: &self.rules_hash,
            source_path: &self.source_path,
        };
        let file = File::create(self.run_output_dir.join("run_summary.json"))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &record)?;
        writer.flush()?;
        Ok(())
    }

    fn flush(&self) -> Result<(), MetadataError> {
        let mut guard = self.writer.lock().unwrap();
        guard.flush()?;
        Ok(())
    }
}
