//! The assembler: turns raw history rows into classified visit records and
//! aggregates run-level numbers for the report.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Timelike};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, info};

use crate::engine::{Category, EngineConfig};
use crate::ingest::RawVisit;

/// Sentinel for rows whose `url` field was empty or missing.
pub const UNKNOWN_URL: &str = "Unknown_URL";
pub const UNKNOWN_DOMAIN: &str = "Unknown_Domain";

/// One fully classified visit.
#[derive(Debug, Clone, Serialize)]
pub struct VisitRecord {
    pub visit_id: i64,
    pub url: String,
    pub domain: String,
    pub visit_count: u64,
    pub typed_count: u64,
    pub visited_at: DateTime<Tz>,
    pub hour: u32,
    pub weekday: String,
    pub date: NaiveDate,
    pub category: Category,
    pub inappropriate: bool,
    pub inappropriate_reason: Option<String>,
    pub work_hours: bool,
}

/// Result of assembling a whole input.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub records: Vec<VisitRecord>,
    pub rows_read: u64,
    /// Rows dropped for an absent/unparseable timestamp.
    pub rows_skipped: u64,
}

/// Classify every raw visit. Rows whose timestamp normalizes to absent are
/// dropped here (the engine itself classifies any URL it is given); nothing
/// in this path can fail on a malformed row.
pub fn analyze(engine: &EngineConfig, visits: Vec<RawVisit>) -> AnalysisOutcome {
    let rows_read = visits.len() as u64;
    let mut records = Vec::with_capacity(visits.len());

    for (index, visit) in visits.into_iter().enumerate() {
        let Some(visited_at) = engine.normalize_timestamp(&visit.last_visit_time) else {
            debug!("row {index}: absent or unparseable timestamp, dropped");
            continue;
        };

        let (url, domain) = if visit.url.is_empty() {
            (UNKNOWN_URL.to_string(), UNKNOWN_DOMAIN.to_string())
        } else {
            let parts = crate::engine::domain::split_url(&visit.url);
            (visit.url, parts.full_host)
        };

        let result = engine.classify_visit(&url, Some(&visited_at));
        records.push(VisitRecord {
            visit_id: visit.id.unwrap_or(index as i64),
            url,
            domain,
            visit_count: visit.visit_count,
            typed_count: visit.typed_count,
            hour: visited_at.hour(),
            weekday: visited_at.format("%A").to_string(),
            date: visited_at.date_naive(),
            visited_at,
            category: result.category,
            inappropriate: result.inappropriate,
            inappropriate_reason: result.inappropriate_reason,
            work_hours: result.work_hours,
        });
    }

    let rows_skipped = rows_read - records.len() as u64;
    info!(
        "classified {} of {} rows ({} dropped for absent timestamps)",
        records.len(),
        rows_read,
        rows_skipped
    );
    AnalysisOutcome {
        records,
        rows_read,
        rows_skipped,
    }
}

/// Run-level aggregation consumed by the report.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub total: u64,
    pub work_hours_visits: u64,
    pub work_hours_pct: f64,
    pub non_work_hours_visits: u64,
    pub non_work_hours_pct: f64,
    pub inappropriate_visits: u64,
    pub inappropriate_during_work: u64,
    /// Work-hours visits to sites outside work/infrastructure categories.
    pub non_work_during_work: u64,
    pub non_work_during_work_pct: f64,
    pub category_counts: Vec<(String, u64)>,
    pub top_domains: Vec<(String, u64)>,
    pub busiest_days: Vec<String>,
    pub peak_hours: Vec<u32>,
    pub first_visit: Option<DateTime<Tz>>,
    pub last_visit: Option<DateTime<Tz>>,
}

fn sorted_counts<K: Ord + Clone>(map: HashMap<K, u64>) -> Vec<(K, u64)> {
    let mut counts: Vec<(K, u64)> = map.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

impl AnalysisSummary {
    pub fn from_records(records: &[VisitRecord]) -> Self {
        let total = records.len() as u64;
        let work_hours_visits = records.iter().filter(|r| r.work_hours).count() as u64;
        let inappropriate_visits = records.iter().filter(|r| r.inappropriate).count() as u64;
        let inappropriate_during_work = records
            .iter()
            .filter(|r| r.inappropriate && r.work_hours)
            .count() as u64;
        let non_work_during_work = records
            .iter()
            .filter(|r| {
                r.work_hours
                    && !matches!(
                        r.category,
                        Category::Work | Category::InfrastructureInternal
                    )
            })
            .count() as u64;

        let mut categories: HashMap<String, u64> = HashMap::new();
        let mut domains: HashMap<String, u64> = HashMap::new();
        let mut days: HashMap<String, u64> = HashMap::new();
        let mut hours: HashMap<u32, u64> = HashMap::new();
        for record in records {
            *categories.entry(record.category.label().to_string()).or_default() += 1;
            if !record.domain.eq_ignore_ascii_case(UNKNOWN_DOMAIN) && !record.domain.is_empty() {
                *domains.entry(record.domain.clone()).or_default() += 1;
            }
            *days.entry(record.weekday.clone()).or_default() += 1;
            *hours.entry(record.hour).or_default() += 1;
        }

        let pct = |part: u64, whole: u64| {
            if whole > 0 {
                part as f64 / whole as f64 * 100.0
            } else {
                0.0
            }
        };

        let mut top_domains = sorted_counts(domains);
        top_domains.truncate(10);

        Self {
            total,
            work_hours_visits,
            work_hours_pct: pct(work_hours_visits, total),
            non_work_hours_visits: total - work_hours_visits,
            non_work_hours_pct: pct(total - work_hours_visits, total),
            inappropriate_visits,
            inappropriate_during_work,
            non_work_during_work,
            non_work_during_work_pct: pct(non_work_during_work, work_hours_visits),
            category_counts: sorted_counts(categories),
            top_domains,
            busiest_days: sorted_counts(days).into_iter().take(3).map(|(d, _)| d).collect(),
            peak_hours: sorted_counts(hours).into_iter().take(3).map(|(h, _)| h).collect(),
            first_visit: records.iter().map(|r| r.visited_at.clone()).min(),
            last_visit: records.iter().map(|r| r.visited_at.clone()).max(),
        }
    }

    /// Count for one built-in category label, 0 when absent.
    pub fn category_count(&self, label: &str) -> u64 {
        self.category_counts
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::{AnalysisSummary, UNKNOWN_DOMAIN, UNKNOWN_URL, analyze};
    use crate::config::load_rules;
    use crate::engine::{EngineConfig, EngineOptions, schedule::WorkDay};
    use crate::ingest::RawVisit;
    use std::collections::BTreeMap;

    fn engine() -> EngineConfig {
        let rules = load_rules(None).expect("rules").rules;
        let options = EngineOptions {
            start_time: "09:00".to_string(),
            end_time: "17:00".to_string(),
            work_days: vec![WorkDay::Mon, WorkDay::Tue, WorkDay::Wed, WorkDay::Thu, WorkDay::Fri],
            work_keywords: vec!["jira".to_string()],
            custom_categories: BTreeMap::new(),
        };
        EngineConfig::new(&rules, options).expect("engine")
    }

    fn raw(url: &str, ts: &str) -> RawVisit {
        RawVisit {
            id: None,
            url: url.to_string(),
            last_visit_time: ts.to_string(),
            visit_count: 1,
            typed_count: 0,
        }
    }

    // 2022-10-14 is a Friday; 00:00 UTC is 11:00 AEDT.
    const FRIDAY_11AM_LOCAL: &str = "13310179200000000";

    #[test]
    fn drops_rows_with_absent_timestamps() {
        let outcome = analyze(
            &engine(),
            vec![
                raw("https://example.com/", FRIDAY_11AM_LOCAL),
                raw("https://never.example/", "0"),
                raw("https://bad.example/", "not a number"),
            ],
        );
        assert_eq!(outcome.rows_read, 3);
        assert_eq!(outcome.rows_skipped, 2);
        assert_eq!(outcome.records.len(), 1);
    }

    #[test]
    fn empty_url_becomes_sentinel_row() {
        let outcome = analyze(&engine(), vec![raw("", FRIDAY_11AM_LOCAL)]);
        let record = &outcome.records[0];
        assert_eq!(record.url, UNKNOWN_URL);
        assert_eq!(record.domain, UNKNOWN_DOMAIN);
        assert_eq!(record.category.label(), "other");
    }

    #[test]
    fn records_carry_localized_calendar_fields() {
        let outcome = analyze(&engine(), vec![raw("https://example.com/", FRIDAY_11AM_LOCAL)]);
        let record = &outcome.records[0];
        assert_eq!(record.hour, 11);
        assert_eq!(record.weekday, "Friday");
        assert!(record.work_hours);
    }

    #[test]
    fn missing_id_falls_back_to_row_index() {
        let mut first = raw("https://example.com/", FRIDAY_11AM_LOCAL);
        first.id = Some(42);
        let outcome = analyze(
            &engine(),
            vec![first, raw("https://example.org/", FRIDAY_11AM_LOCAL)],
        );
        assert_eq!(outcome.records[0].visit_id, 42);
        assert_eq!(outcome.records[1].visit_id, 1);
    }

    #[test]
    fn summary_counts_line_up() {
        let outcome = analyze(
            &engine(),
            vec![
                raw("https://tools.example.com/jira/browse/OPS-1", FRIDAY_11AM_LOCAL),
                raw("https://www.youtube.com/watch?v=abc", FRIDAY_11AM_LOCAL),
                raw("https://www.sportsbet.com.au/racing", FRIDAY_11AM_LOCAL),
            ],
        );
        let summary = AnalysisSummary::from_records(&outcome.records);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.work_hours_visits, 3);
        assert_eq!(summary.category_count("work"), 1);
        assert_eq!(summary.category_count("streaming"), 1);
        assert_eq!(summary.inappropriate_visits, 1);
        assert_eq!(summary.inappropriate_during_work, 1);
        // youtube + sportsbet are non-work browsing during work hours.
        assert_eq!(summary.non_work_during_work, 2);
        assert_eq!(summary.busiest_days, vec!["Friday"]);
        assert_eq!(summary.peak_hours, vec![11]);
    }

    #[test]
    fn empty_input_yields_zeroed_summary() {
        let summary = AnalysisSummary::from_records(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.work_hours_pct, 0.0);
        assert!(summary.first_visit.is_none());
    }
}
