//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline and views stay free of presentation concerns
//! - output changes are localized

use chrono::NaiveDate;

use crate::domain::{DerivedSeries, RankEntry};
use crate::io::ingest::LoadReport;
use crate::views::{Comparison, CountryProfile, GlobalSummary, LatestValue, RaceFrame};

pub fn format_load_report(report: &LoadReport) -> String {
    let mut out = format!(
        "Rows: read={} kept={} | dropped: bad_dates={} empty_location={} malformed={} | duplicates replaced={}\n",
        report.rows_read,
        report.rows_kept,
        report.bad_dates,
        report.empty_locations,
        report.malformed_rows,
        report.duplicates_replaced,
    );
    for err in &report.row_errors {
        out.push_str(&format!(
            "  line {}{}: {}\n",
            err.line,
            err.location.as_deref().map(|l| format!(" ({l})")).unwrap_or_default(),
            err.message
        ));
    }
    out
}

pub fn format_summary(summary: &GlobalSummary) -> String {
    let mut out = String::new();
    out.push_str("=== owid - Global summary (countries only) ===\n");
    out.push_str(&format!(
        "As of: {}\n",
        summary.as_of.map(|d| d.to_string()).unwrap_or_else(|| "n/a".to_string())
    ));
    out.push_str(&format!("Countries: {}\n", summary.countries));
    out.push_str(&format!("Total cases: {}\n", fmt_count(summary.total_cases)));
    out.push_str(&format!("Total deaths: {}\n", fmt_count(summary.total_deaths)));
    out.push_str(&format!("Total vaccinations: {}\n", fmt_count(summary.total_vaccinations)));
    out
}

/// Format a ranking table. `at_date` is `None` when there was nothing to rank.
pub fn format_ranking(metric: &str, at_date: Option<NaiveDate>, entries: &[RankEntry]) -> String {
    let Some(at_date) = at_date else {
        return format!("No locations to rank by {metric}.\n");
    };
    let mut out = format!("Top {} by {metric} on {at_date}:\n", entries.len());
    out.push_str(format!("{:>4} {:<32} {:>16}", "#", "location", "value").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<4} {:-<32} {:-<16}", "", "", "").trim_end());
    out.push('\n');

    for (i, entry) in entries.iter().enumerate() {
        out.push_str(
            format!(
                "{:>4} {:<32} {:>16}",
                i + 1,
                truncate(&entry.location, 32),
                fmt_value(Some(entry.value))
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// Format last reported values, one row per country, extras as extra columns.
pub fn format_latest(metric: &str, rows: &[LatestValue]) -> String {
    if rows.is_empty() {
        return format!("No country reports {metric}.\n");
    }
    let mut out = format!("Latest {metric} by country:\n");
    let mut header = format!("{:>4} {:<32} {:<10} {:>16}", "#", "location", "date", "value");
    for extra in &rows[0].extras {
        header.push_str(&format!(" {:>16}", truncate(&extra.metric, 16)));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    for (i, row) in rows.iter().enumerate() {
        let mut line = format!(
            "{:>4} {:<32} {:<10} {:>16}",
            i + 1,
            truncate(&row.location, 32),
            row.date,
            fmt_value(Some(row.value))
        );
        for extra in &row.extras {
            line.push_str(&format!(" {:>16}", fmt_value(extra.value)));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

pub fn format_race(metric: &str, frames: &[RaceFrame]) -> String {
    if frames.is_empty() {
        return format!("No frames for {metric}.\n");
    }
    let mut out = String::new();
    for frame in frames {
        out.push_str(&format!("== {} ({metric}) ==\n", frame.period_end));
        for (i, entry) in frame.entries.iter().enumerate() {
            out.push_str(
                format!(
                    "{:>4} {:<32} {:>16}",
                    i + 1,
                    truncate(&entry.location, 32),
                    fmt_value(Some(entry.value))
                )
                .trim_end(),
            );
            out.push('\n');
        }
    }
    out
}

/// Format a comparison as one column per location, one row per period.
pub fn format_comparison(comparison: &Comparison) -> String {
    let mut out = String::new();
    let Some(first) = comparison.series.values().next() else {
        out.push_str("No locations to compare.\n");
        push_omissions(&mut out, comparison);
        return out;
    };

    out.push_str(&format!(
        "{} ({:?}, window={})\n",
        comparison.metric, first.cadence, first.window
    ));

    let names: Vec<&String> = comparison.series.keys().collect();
    let mut header = format!("{:<10}", "date");
    for name in &names {
        header.push_str(&format!(" {:>14}", truncate(name, 14)));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    for date in all_dates(comparison.series.values()) {
        let mut row = format!("{date:<10}");
        for series in comparison.series.values() {
            let value = series
                .points
                .binary_search_by_key(&date, |p| p.date)
                .ok()
                .and_then(|i| series.points[i].value);
            row.push_str(&format!(" {:>14}", fmt_value(value)));
        }
        out.push_str(row.trim_end());
        out.push('\n');
    }

    push_omissions(&mut out, comparison);
    out
}

pub fn format_profile(profile: &CountryProfile) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {} ===\n", profile.location));
    if !profile.iso_code.is_empty() {
        out.push_str(&format!("ISO code: {}\n", profile.iso_code));
    }
    if !profile.continent.is_empty() {
        out.push_str(&format!("Continent: {}\n", profile.continent));
    }
    if profile.is_aggregate {
        out.push_str("(aggregate location)\n");
    }
    out.push_str(&format!("Last record: {}\n\n", profile.last_date));
    for metric in &profile.metrics {
        out.push_str(&format!("{:<40} {:>16}\n", metric.metric, fmt_value(metric.value)));
    }
    out
}

fn push_omissions(out: &mut String, comparison: &Comparison) {
    for omission in &comparison.omitted {
        out.push_str(&format!("note: {omission}\n"));
    }
}

fn all_dates<'a>(series: impl Iterator<Item = &'a DerivedSeries>) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = series.flat_map(|s| s.points.iter().map(|p| p.date)).collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}

fn fmt_count(v: Option<f64>) -> String {
    match v {
        Some(v) => group_thousands(v.round() as i64),
        None => "n/a".to_string(),
    }
}

fn fmt_value(v: Option<f64>) -> String {
    match v {
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => group_thousands(v as i64),
        Some(v) => format!("{v:.2}"),
        None => "-".to_string(),
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if n < 0 {
        out.insert(0, '-');
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
