use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use serde::Serialize;

use crate::analysis::VisitRecord;
use crate::metadata::{MetadataError, MetadataSink, RunSummary};

pub struct CsvSink {
    tool_version: String,
    rules_hash: String,
    source_path: String,
    visits_writer: Mutex<csv::Writer<File>>,
    run_writer: Mutex<csv::Writer<File>>,
}

#[derive(Serialize)]
struct VisitCsv<'a> {
    visit_id: i64,
    url: &'a str,
    domain: &'a str,
    visit_count: u64,
    typed_count: u64,
    visited_at: String,
    hour: u32,
    weekday: &'a str,
    date: String,
    category: &'a str,
    inappropriate: bool,
    inappropriate_reason: Option<&'a str>,
    work_hours: bool,
    tool_version: &'a str,
    rules_hash: &'a str,
    source_path: &'a str,
}

#[derive(Serialize)]
struct RunSummaryCsv<'a> {
    rows_read: u64,
    rows_classified: u64,
    rows_skipped: u64,
    work_hours_visits: u64,
    inappropriate_visits: u64,
    tool_version: &'a str,
    rules_hash: &'a str,
    source_path: &'a str,
}

impl CsvSink {
    pub fn new(
        tool_version: &str,
        rules_hash: &str,
        source_path: &Path,
        run_output_dir: &Path,
    ) -> Result<Self, MetadataError> {
        std::fs::create_dir_all(run_output_dir)?;

        let visits_file = File::create(run_output_dir.join("visits.csv"))?;
        let run_file = File::create(run_output_dir.join("run_summary.csv"))?;

        let mut visits_writer = csv::WriterBuilder::new().has_headers(false).from_writer(visits_file);
        let mut run_writer = csv::WriterBuilder::new().has_headers(false).from_writer(run_file);

        visits_writer.write_record([
            "visit_id",
            "url",
            "domain",
            "visit_count",
            "typed_count",
            "visited_at",
            "hour",
            "weekday",
            "date",
            "category",
            "inappropriate",
            "inappropriate_reason",
            "work_hours",
            "tool_version",
            "rules_hash",
            "source_path",
        ])?;

        run_writer.write_record([
            "rows_read",
            "rows_classified",
            "rows_skipped",
            "work_hours_visits",
            "inappropriate_visits",
            "tool_version",
            "rules_hash",
            "source_path",
        ])?;

        Ok(Self {
            tool_version: tool_version.to_string(),
            rules_hash: rules_hash.to_string(),
            source_path: source_path.to_string_lossy().to_string(),
            visits_writer: Mutex::new(visits_writer),
            run_writer: Mutex::new(run_writer),
        })
    }
}

impl MetadataSink for CsvSink {
    fn record_visit(&self, visit: &VisitRecord) -> Result<(), MetadataError> {
        let record = VisitCsv {
            visit_id: visit.visit_id,
            url: &visit.url,
            domain: &visit.domain,
            visit_count: visit.visit_count,
            typed_count: visit.typed_count,
            visited_at: visit.visited_at.to_rfc3339(),
            hour: visit.hour,
            weekday: &visit.weekday,
            date: visit.date.to_string(),
            category: visit.category.label(),
            inappropriate: visit.inappropriate,
            inappropriate_reason: visit.inappropriate_reason.as_deref(),
            work_hours: visit.work_hours,
            tool_version: &self.tool_version,
            rules_hash: &self.rules_hash,
            source_path: &self.source_path,
        };
        let mut guard = self.visits_writer.lock().unwrap();
        guard.serialize(record)?;
        Ok(())
    }

    fn record_run_summary(&self, summary: &RunSummary) -> Result<(), MetadataError> {
        let record = RunSummaryCsv {
            rows_read: summary.rows_read,
            rows_classified: summary.rows_classified,
            rows_skipped: summary.rows_skipped,
            work_hours_visits: summary.work_hours_visits,
            inappropriate_visits: summary.inappropriate_visits,
            tool_version: &self.tool_version,
            rules_hash: &self.rules_hash,
            source_path: &self.source_path,
        };
        let mut guard = self.run_writer.lock().unwrap();
        guard.serialize(record)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), MetadataError> {
        let mut visits = self.visits_writer.lock().unwrap();
        let mut run = self.run_writer.lock().unwrap();
        visits.flush()?;
        run.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Category;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn sample_visit() -> VisitRecord {
        let visited_at = chrono_tz::Australia::Sydney
            .with_ymd_and_hms(2022, 10, 14, 11, 0, 0)
            .single()
            .expect("timestamp");
        VisitRecord {
            visit_id: 1,
            url: "https://www.youtube.com/watch?v=abc".to_string(),
            domain: "www.youtube.com".to_string(),
            visit_count: 3,
            typed_count: 1,
            hour: 11,
            weekday: "Friday".to_string(),
            date: visited_at.date_naive(),
            visited_at,
            category: Category::Streaming,
            inappropriate: false,
            inappropriate_reason: None,
            work_hours: true,
        }
    }

    #[test]
    fn writes_csv_files() {
        let dir = tempdir().expect("tempdir");
        let sink = CsvSink::new("0.2.0", "hash", Path::new("/History"), dir.path())
            .expect("csv sink");

        sink.record_visit(&sample_visit()).expect("record visit");
        sink.record_run_summary(&RunSummary {
            rows_read: 2,
            rows_classified: 1,
            rows_skipped: 1,
            work_hours_visits: 1,
            inappropriate_visits: 0,
        })
        .expect("record summary");
        sink.flush().expect("flush");

        let visits = std::fs::read_to_string(dir.path().join("visits.csv")).expect("read");
        assert!(visits.starts_with("visit_id,url,domain"));
        assert!(visits.contains("streaming"));
        assert!(visits.contains("www.youtube.com"));

        let run = std::fs::read_to_string(dir.path().join("run_summary.csv")).expect("read");
        assert!(run.contains("rows_read"));
        assert!(run.contains("0.2.0"));
    }
}
