//! # Ingestion
//!
//! Raw visit rows from either a CSV export or a Chromium-family `History`
//! SQLite database. Ingestion is the only place the tool does file I/O on
//! the input; the engine itself never touches the disk.

pub mod csv;
pub mod sqlite;

use std::path::Path;

use thiserror::Error;

use crate::cli::InputFormat;

/// One raw history row as stored by the browser. Only `url` and the vendor
/// timestamp matter to the engine; the counters are carried through to the
/// report.
#[derive(Debug, Clone, Default)]
pub struct RawVisit {
    pub id: Option<i64>,
    pub url: String,
    /// Vendor timestamp, kept as text: the normalizer owns all parsing.
    pub last_visit_time: String,
    pub visit_count: u64,
    pub typed_count: u64,
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("input must contain '{0}' column")]
    MissingColumn(&'static str),
}

const SQLITE_MAGIC: &[u8] = b"SQLite format 3\0";

/// Resolve `Auto` by extension, falling back to the SQLite header magic.
pub fn detect_format(path: &Path, requested: InputFormat) -> InputFormat {
    if requested != InputFormat::Auto {
        return requested;
    }
    if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
    {
        return InputFormat::Csv;
    }
    let mut magic = [0u8; 16];
    let looks_sqlite = std::fs::File::open(path)
        .and_then(|mut f| std::io::Read::read_exact(&mut f, &mut magic))
        .map(|()| magic == *SQLITE_MAGIC)
        .unwrap_or(false);
    if looks_sqlite {
        InputFormat::Sqlite
    } else {
        InputFormat::Csv
    }
}

/// Read all raw visits from `path` in the given (or detected) format.
pub fn read_visits(path: &Path, format: InputFormat) -> Result<Vec<RawVisit>, IngestError> {
    match detect_format(path, format) {
        InputFormat::Csv | InputFormat::Auto => csv::read_csv(path),
        InputFormat::Sqlite => sqlite::read_history_db(path),
    }
}

#[cfg(test)]
mod tests {
    use super::detect_format;
    use crate::cli::InputFormat;
    use std::io::Write;

    #[test]
    fn detects_csv_by_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("history.csv");
        std::fs::write(&path, "url,last_visit_time\n").expect("write");
        assert_eq!(detect_format(&path, InputFormat::Auto), InputFormat::Csv);
    }

    #[test]
    fn detects_sqlite_by_magic() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("History");
        let mut file = std::fs::File::create(&path).expect("create");
        file.write_all(b"SQLite format 3\0").expect("write");
        file.write_all(&[0u8; 84]).expect("pad");
        drop(file);
        assert_eq!(detect_format(&path, InputFormat::Auto), InputFormat::Sqlite);
    }

    #[test]
    fn explicit_format_wins() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("history.csv");
        std::fs::write(&path, "url,last_visit_time\n").expect("write");
        assert_eq!(detect_format(&path, InputFormat::Sqlite), InputFormat::Sqlite);
    }
}
