//! Static HTML report writer. One self-contained file, no external assets,
//! so the report can be attached to a case file as-is.

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Local};
use chrono_tz::Tz;

use crate::analysis::{AnalysisSummary, VisitRecord};
use crate::engine::Category;

const URL_DISPLAY_CHARS: usize = 80;

pub fn write_report(
    path: &Path,
    records: &[VisitRecord],
    summary: &AnalysisSummary,
    start_time: &str,
    end_time: &str,
    day_labels: &[String],
) -> std::io::Result<()> {
    let html = render(records, summary, start_time, end_time, day_labels);
    std::fs::write(path, html)
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Character-safe prefix, never splitting inside a multi-byte sequence.
fn truncate_chars(value: &str, limit: usize) -> &str {
    match value.char_indices().nth(limit) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

fn url_cell(url: &str) -> String {
    let escaped = escape_html(url);
    let shown = if url.chars().count() > URL_DISPLAY_CHARS {
        format!("{}...", escape_html(truncate_chars(url, URL_DISPLAY_CHARS)))
    } else {
        escaped.clone()
    };
    format!(r#"<a href="{escaped}" target="_blank" title="{escaped}">{shown}</a>"#)
}

fn format_when(when: &DateTime<Tz>) -> String {
    when.format("%Y-%m-%d %H:%M:%S %Z").to_string()
}

fn title_case(label: &str) -> String {
    label
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Newest first within every table.
fn sorted_desc<'a>(records: impl Iterator<Item = &'a VisitRecord>) -> Vec<&'a VisitRecord> {
    let mut rows: Vec<&VisitRecord> = records.collect();
    rows.sort_by(|a, b| b.visited_at.cmp(&a.visited_at));
    rows
}

fn empty_row(columns: usize) -> String {
    format!(
        "<tr><td colspan='{columns}' style='text-align:center; padding:10px;'>No data for this section.</td></tr>\n"
    )
}

fn activity_rows(rows: &[&VisitRecord]) -> String {
    if rows.is_empty() {
        return empty_row(4);
    }
    let mut out = String::new();
    for row in rows {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            format_when(&row.visited_at),
            url_cell(&row.url),
            row.visit_count,
            if row.work_hours { "Yes" } else { "No" },
        );
    }
    out
}

fn inappropriate_rows(rows: &[&VisitRecord]) -> String {
    if rows.is_empty() {
        return empty_row(5);
    }
    let mut out = String::new();
    for row in rows {
        let hours_attrs = if row.work_hours && row.inappropriate {
            " class=\"warning-text\""
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td{}>{}</td></tr>",
            format_when(&row.visited_at),
            url_cell(&row.url),
            escape_html(row.category.label()),
            escape_html(row.inappropriate_reason.as_deref().unwrap_or("N/A")),
            hours_attrs,
            if row.work_hours { "Yes" } else { "No" },
        );
    }
    out
}

fn non_work_rows(rows: &[&VisitRecord]) -> String {
    if rows.is_empty() {
        return empty_row(3);
    }
    let mut out = String::new();
    for row in rows {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            format_when(&row.visited_at),
            url_cell(&row.url),
            row.visit_count,
        );
    }
    out
}

/// Categories that get their own non-work-during-work-hours table, in data
/// order with `other` forced last.
fn non_work_categories(records: &[VisitRecord]) -> Vec<String> {
    let mut seen = Vec::new();
    let mut has_other = false;
    for record in records {
        match &record.category {
            Category::Work | Category::InfrastructureInternal => {}
            Category::Other => has_other = true,
            category => {
                let label = category.label().to_string();
                if !seen.contains(&label) {
                    seen.push(label);
                }
            }
        }
    }
    if has_other {
        seen.push("other".to_string());
    }
    seen
}

fn render(
    records: &[VisitRecord],
    summary: &AnalysisSummary,
    start_time: &str,
    end_time: &str,
    day_labels: &[String],
) -> String {
    let period = match (&summary.first_visit, &summary.last_visit) {
        (Some(first), Some(last)) => format!("{} to {}", format_when(first), format_when(last)),
        _ => "N/A".to_string(),
    };
    let generated = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let work_rows = activity_rows(&sorted_desc(
        records.iter().filter(|r| r.category == Category::Work),
    ));
    let inapp_rows = inappropriate_rows(&sorted_desc(
        records.iter().filter(|r| r.inappropriate),
    ));

    let mut non_work_sections = String::new();
    for label in non_work_categories(records) {
        let rows = non_work_rows(&sorted_desc(
            records
                .iter()
                .filter(|r| r.work_hours && r.category.label() == label),
        ));
        let _ = write!(
            non_work_sections,
            "<h3>{} During Work Hours</h3><table>\
             <thead><tr><th>DateTime</th><th>URL</th><th>Visit Count</th></tr></thead>\
             <tbody>\n{rows}</tbody></table>\n",
            title_case(&label),
        );
    }
    if non_work_sections.is_empty() {
        non_work_sections.push_str("<p><em>No non-work activity recorded.</em></p>\n");
    }

    let busiest_days = if summary.busiest_days.is_empty() {
        "N/A".to_string()
    } else {
        summary.busiest_days.join(", ")
    };
    let peak_hours = if summary.peak_hours.is_empty() {
        "N/A".to_string()
    } else {
        summary
            .peak_hours
            .iter()
            .map(|h| format!("{h:02}:00"))
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        r#"<!DOCTYPE html><html lang="en"><head><meta charset="UTF-8"><title>Browser History Report</title>
<style>
    body {{ font-family: sans-serif; margin: 0; background: #f4f6f8; color: #333; }}
    .report-container {{ max-width: 90%; margin: 20px auto; background: #fff; padding: 25px; box-shadow: 0 2px 10px rgba(0,0,0,0.08); border-radius: 8px; }}
    .header {{ border-bottom: 2px solid #2c3e50; padding-bottom: 10px; margin-bottom: 20px; }}
    .summary-box {{ background: #eef3f7; border-left: 4px solid #2c3e50; padding: 12px 18px; margin-bottom: 20px; }}
    table {{ border-collapse: collapse; width: 100%; margin-bottom: 25px; font-size: 0.9em; }}
    th, td {{ border: 1px solid #d8dee4; padding: 6px 9px; text-align: left; }}
    th {{ background: #2c3e50; color: #fff; }}
    tr:nth-child(even) {{ background: #f8fafb; }}
    .warning-text {{ color: #c0392b; font-weight: bold; }}
    .footer {{ margin-top: 30px; font-size: 0.85em; color: #777; text-align: center; }}
</style>
</head><body><div class="report-container">
<div class="header"><h1>Workplace Browser History Analysis</h1>
    <p>Generated: {generated} | Analysis Period: {period}</p>
    <p>Work Hours: {start} - {end} ({days})</p>
</div>

<div class="summary-box"><h2>Executive Summary</h2><ul>
    <li>Total browsing sessions analyzed: {total}</li>
    <li>Activity during work hours: {work_h} ({work_h_pct:.1}%)</li>
    <li>Activity outside work hours: {non_work_h} ({non_work_h_pct:.1}%)</li>
    <li>Potentially inappropriate content detected (post-filtering): {inapp} instances</li>
    <li>Streaming service usage (all hours): {streaming} instances</li>
    <li>Gaming site access (all hours): {gaming} instances</li>
    <li>Shopping site access (all hours): {shopping} instances</li>
</ul></div>
<p>This report provides an automated analysis of browser history. All findings, especially those flagged as 'inappropriate', require careful manual review and contextual understanding before any conclusions are drawn. The tool uses keyword matching and categorization rules which may produce false positives or misclassifications.</p>

<h2>Work-Related Activity</h2>
<p>Browsing sessions categorized as 'work' based on provided keywords or custom rules.</p>
<table><thead><tr><th>DateTime</th><th>URL</th><th>Visit Count</th><th>During Work Hours</th></tr></thead>
<tbody>
{work_rows}</tbody></table>

<h2>Potentially Inappropriate Content</h2>
<p>URLs flagged based on keywords, after excluding 'work', 'infrastructure_internal', whitelisted domains, and common government/education domains. <strong>Manual verification is essential.</strong></p>
<table><thead><tr><th>DateTime</th><th>URL</th><th>Assigned Category</th><th>Reason (Keyword)</th><th>During Work Hours</th></tr></thead>
<tbody>
{inapp_rows}</tbody></table>

<h2>Non-Work Activity During Work Hours</h2>
{non_work_sections}
<div class="summary-box"><h2>Productivity Indicators</h2><ul>
    <li>During work hours, approx. {non_work_wh} of {work_h} browsing sessions ({non_work_wh_pct:.1}%) were to sites categorized as non-work related.</li>
    <li>{inapp_wh} instances of potentially inappropriate content (post-filtering) were accessed during work hours.</li>
    <li>Most active browsing days: {busiest_days}</li>
    <li>Peak browsing hours (approx.): {peak_hours}</li>
</ul></div>
<h3>Recommendations</h3><ol>
    <li>Review findings with relevant stakeholders, emphasizing manual verification of flagged content.</li>
    <li>Reinforce company's Acceptable Use Policy (AUP).</li>
    <li>If clear misuse (post-verification) is confirmed, consider actions as per company policy.</li>
    <li>Regularly review and update categorization keywords, work-keywords, and domain whitelists.</li>
</ol>
<div class="footer"><p><em>Confidential Report. All automated flags require manual verification.</em></p></div>
</div></body></html>
"#,
        generated = generated,
        period = period,
        start = escape_html(start_time),
        end = escape_html(end_time),
        days = escape_html(&day_labels.join(", ")),
        total = summary.total,
        work_h = summary.work_hours_visits,
        work_h_pct = summary.work_hours_pct,
        non_work_h = summary.non_work_hours_visits,
        non_work_h_pct = summary.non_work_hours_pct,
        inapp = summary.inappropriate_visits,
        streaming = summary.category_count("streaming"),
        gaming = summary.category_count("gaming"),
        shopping = summary.category_count("shopping"),
        work_rows = work_rows,
        inapp_rows = inapp_rows,
        non_work_sections = non_work_sections,
        non_work_wh = summary.non_work_during_work,
        non_work_wh_pct = summary.non_work_during_work_pct,
        inapp_wh = summary.inappropriate_during_work,
        busiest_days = busiest_days,
        peak_hours = peak_hours,
    )
}
