use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use histoscan::{analysis, cli, config, engine, ingest, logging, metadata, report};

fn main() -> Result<()> {
    logging::init_logging();

    let opts = cli::parse();
    let loaded = config::load_rules(opts.rules_path.as_deref())?;

    let work_days = config::normalize_work_days(&opts.days);
    if work_days.is_empty() {
        bail!("no valid work days in --days '{}'", opts.days);
    }
    let work_keywords = config::normalize_keywords(&opts.work_keywords);
    let custom_categories = opts
        .custom_categories
        .as_deref()
        .map(config::parse_custom_categories)
        .unwrap_or_default();

    let day_labels: Vec<String> = work_days.iter().map(|d| d.abbrev().to_string()).collect();
    let engine = engine::EngineConfig::new(
        &loaded.rules,
        engine::EngineOptions {
            start_time: opts.starttime.clone(),
            end_time: opts.endtime.clone(),
            work_days,
            work_keywords,
            custom_categories,
        },
    )?;
    if !engine.schedule_is_valid() {
        warn!(
            "could not parse work hours '{}'-'{}'; all activity will be treated as outside work hours",
            opts.starttime, opts.endtime
        );
    }

    let tool_version = env!("CARGO_PKG_VERSION");
    info!(
        "starting input={} output={} rules_hash={}",
        opts.input.display(),
        opts.output.display(),
        loaded.rules_hash
    );

    let visits = ingest::read_visits(&opts.input, opts.format)
        .with_context(|| format!("reading history from {}", opts.input.display()))?;
    info!("read {} raw visits", visits.len());

    if opts.diagnose {
        diagnose(&engine, &visits, opts.diagnose_rows);
        return Ok(());
    }

    let outcome = analysis::analyze(&engine, visits);
    let summary = analysis::AnalysisSummary::from_records(&outcome.records);

    std::fs::create_dir_all(&opts.output)
        .with_context(|| format!("creating output directory {}", opts.output.display()))?;

    let sink = metadata::build_sink(
        opts.metadata_backend,
        tool_version,
        &loaded.rules_hash,
        &opts.input,
        &opts.output,
    )?;
    for record in &outcome.records {
        sink.record_visit(record)?;
    }
    sink.record_run_summary(&metadata::RunSummary {
        rows_read: outcome.rows_read,
        rows_classified: outcome.records.len() as u64,
        rows_skipped: outcome.rows_skipped,
        work_hours_visits: summary.work_hours_visits,
        inappropriate_visits: summary.inappropriate_visits,
    })?;
    sink.flush()?;

    let report_path = opts.output.join(&opts.report_name);
    report::write_report(
        &report_path,
        &outcome.records,
        &summary,
        &opts.starttime,
        &opts.endtime,
        &day_labels,
    )
    .with_context(|| format!("writing report to {}", report_path.display()))?;

    info!(
        "histoscan run finished: {} visits classified, {} inappropriate, report at {}",
        summary.total,
        summary.inappropriate_visits,
        report_path.display()
    );
    Ok(())
}

/// Print the full classification trace for the first rows and exit. Meant
/// for tuning rules against an unfamiliar history file.
fn diagnose(engine: &engine::EngineConfig, visits: &[ingest::RawVisit], rows: usize) {
    println!("--- diagnosing first {} rows ---", rows.min(visits.len()));
    for visit in visits.iter().take(rows) {
        let parts = engine::domain::split_url(&visit.url);
        let main = engine::domain::main_domain(&parts.full_host);
        let when = engine.normalize_timestamp(&visit.last_visit_time);
        let result = engine.classify_visit(&visit.url, when.as_ref());
        println!("url:           {}", visit.url);
        println!("  host:        {}", parts.full_host);
        println!("  main domain: {}", main);
        println!(
            "  timestamp:   {}",
            when.map(|t| t.to_rfc3339()).unwrap_or_else(|| "absent".to_string())
        );
        println!("  category:    {}", result.category);
        println!(
            "  flagged:     {}{}",
            result.inappropriate,
            result
                .inappropriate_reason
                .map(|r| format!(" (keyword '{r}')"))
                .unwrap_or_default()
        );
        println!("  work hours:  {}", result.work_hours);
        println!();
    }
}
