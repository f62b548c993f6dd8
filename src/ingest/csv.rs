//! CSV history export reader. Requires `url` and `last_visit_time` columns;
//! `id`, `visit_count`, and `typed_count` are optional. Malformed rows are
//! skipped with a warning, never fatal.

use std::path::Path;

use tracing::warn;

use super::{IngestError, RawVisit};

pub fn read_csv(path: &Path) -> Result<Vec<RawVisit>, IngestError> {
    let mut reader = ::csv::ReaderBuilder::new()
        .flexible(true)
        .trim(::csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let url_idx = column("url").ok_or(IngestError::MissingColumn("url"))?;
    let time_idx = column("last_visit_time").ok_or(IngestError::MissingColumn("last_visit_time"))?;
    let id_idx = column("id");
    let visit_idx = column("visit_count");
    let typed_idx = column("typed_count");

    let field = |record: &::csv::StringRecord, idx: Option<usize>| -> String {
        idx.and_then(|i| record.get(i)).unwrap_or("").to_string()
    };

    let mut visits = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                warn!("skipping malformed csv row {}: {err}", row + 1);
                continue;
            }
        };
        visits.push(RawVisit {
            id: field(&record, id_idx).parse().ok(),
            url: field(&record, Some(url_idx)),
            last_visit_time: field(&record, Some(time_idx)),
            visit_count: field(&record, visit_idx).parse().unwrap_or(0),
            typed_count: field(&record, typed_idx).parse().unwrap_or(0),
        });
    }
    Ok(visits)
}
