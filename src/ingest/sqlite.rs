//! Chromium-family `History` database reader. Opens the store read-only and
//! pulls the `urls` table; the vendor timestamps stay raw for the engine's
//! normalizer to interpret.

use std::path::Path;

use rusqlite::{Connection, OpenFlags};

use super::{IngestError, RawVisit};

const HISTORY_QUERY: &str =
    "SELECT id, url, last_visit_time, visit_count, typed_count FROM urls ORDER BY id";

pub fn read_history_db(path: &Path) -> Result<Vec<RawVisit>, IngestError> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;

    let mut stmt = conn.prepare(HISTORY_QUERY)?;
    let rows = stmt.query_map([], |row| {
        Ok(RawVisit {
            id: row.get::<_, Option<i64>>(0)?,
            url: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            last_visit_time: row
                .get::<_, Option<i64>>(2)?
                .map(|t| t.to_string())
                .unwrap_or_default(),
            visit_count: row.get::<_, Option<i64>>(3)?.unwrap_or(0).max(0) as u64,
            typed_count: row.get::<_, Option<i64>>(4)?.unwrap_or(0).max(0) as u64,
        })
    })?;

    let mut visits = Vec::new();
    for row in rows {
        visits.push(row?);
    }
    Ok(visits)
}
