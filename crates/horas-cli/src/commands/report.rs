//! Report command: grouped hour totals over a period.
//!
//! Default grouping is per worker and day (the monthly summary the
//! back office works from); `--by-task` adds the task to each day line
//! and `--by-site` switches to a site/task breakdown.

use std::collections::BTreeMap;
use std::fmt::Write;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use horas_core::{GroupBy, GroupKey, GroupTotals, WorkerId, aggregate};
use horas_db::{Database, EntryFilter};
use serde::Serialize;

use super::util::{format_hours, parse_date};

#[allow(clippy::too_many_arguments, clippy::fn_params_excessive_bools)]
pub fn run(
    db: &Database,
    month: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
    worker: Option<&str>,
    by_task: bool,
    by_site: bool,
    json: bool,
) -> Result<()> {
    let (from, to) = resolve_period(month, from, to)?;
    let filter = EntryFilter {
        worker: worker.map(WorkerId::new).transpose()?,
        from,
        to,
        ..EntryFilter::default()
    };
    let entries = db
        .list_entries(&filter)
        .context("failed to list entries")?;

    let group_by = if by_site {
        GroupBy::SITE_TASK
    } else if by_task {
        GroupBy::DAILY_BY_TASK
    } else {
        GroupBy::DAILY
    };
    let groups = aggregate(&entries, group_by);

    if json {
        println!("{}", format_report_json(&groups)?);
    } else if by_site {
        print!("{}", format_site_report(&groups));
    } else {
        print!("{}", format_daily_report(&groups));
    }
    Ok(())
}

/// Resolves `--month` or `--from`/`--to` into an inclusive date range.
fn resolve_period(
    month: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>)> {
    if let Some(month) = month {
        let (year, month) = parse_month(month)?;
        let (first, last) = month_range(year, month)?;
        return Ok((Some(first), Some(last)));
    }
    Ok((
        from.map(parse_date).transpose()?,
        to.map(parse_date).transpose()?,
    ))
}

/// Parses `YYYY-MM`.
fn parse_month(text: &str) -> Result<(i32, u32)> {
    let parsed = text
        .split_once('-')
        .and_then(|(year, month)| Some((year.parse().ok()?, month.parse().ok()?)));
    match parsed {
        Some((year, month)) if (1..=12).contains(&month) => Ok((year, month)),
        _ => bail!("invalid month '{text}', expected YYYY-MM"),
    }
}

/// First and last day of a month.
fn month_range(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (first, next_month.and_then(|d| d.pred_opt())) {
        (Some(first), Some(last)) => Ok((first, last)),
        _ => bail!("invalid month {year}-{month:02}"),
    }
}

/// Formats the per-worker daily summary.
fn format_daily_report(groups: &[(GroupKey, GroupTotals)]) -> String {
    let mut output = String::new();
    if groups.is_empty() {
        writeln!(output, "no entries in the period").unwrap();
        return output;
    }

    // Bucket per worker; each worker's day lines stay chronological
    // because the groups arrive sorted by date first.
    let mut by_worker: BTreeMap<&WorkerId, Vec<(&GroupKey, &GroupTotals)>> = BTreeMap::new();
    for (key, totals) in groups {
        if let Some(worker) = &key.worker {
            by_worker.entry(worker).or_default().push((key, totals));
        }
    }

    for (worker, days) in by_worker {
        writeln!(output, "{worker}").unwrap();
        let mut total = 0;
        let mut extra_total = 0;
        for (key, totals) in days {
            let date = key
                .date
                .map_or_else(|| "-".to_string(), |d| d.to_string());
            let task = key
                .task
                .map_or_else(String::new, |task| format!("  task {task}"));
            let extra = if totals.extra_minutes > 0 {
                format!("  ({} h extra)", format_hours(totals.extra_minutes))
            } else {
                String::new()
            };
            writeln!(
                output,
                "  {date}{task}  {:>6} h{extra}",
                format_hours(totals.minutes)
            )
            .unwrap();
            total += totals.minutes;
            extra_total += totals.extra_minutes;
        }
        let extra = if extra_total > 0 {
            format!("  ({} h extra)", format_hours(extra_total))
        } else {
            String::new()
        };
        writeln!(output, "  total       {:>6} h{extra}", format_hours(total)).unwrap();
        writeln!(output).unwrap();
    }
    output
}

/// Formats the site/task breakdown.
fn format_site_report(groups: &[(GroupKey, GroupTotals)]) -> String {
    let mut output = String::new();
    if groups.is_empty() {
        writeln!(output, "no entries in the period").unwrap();
        return output;
    }
    let mut total = 0;
    for (key, totals) in groups {
        let site = key
            .site
            .map_or_else(|| "-".to_string(), |site| site.to_string());
        let task = key
            .task
            .map_or_else(|| "-".to_string(), |task| task.to_string());
        writeln!(
            output,
            "site {site:>4}  task {task:>4}  {:>6} h  (normal {} / extra {}, {} entries)",
            format_hours(totals.minutes),
            format_hours(totals.normal_minutes),
            format_hours(totals.extra_minutes),
            totals.count
        )
        .unwrap();
        total += totals.minutes;
    }
    writeln!(output, "total {:>21} h", format_hours(total)).unwrap();
    output
}

/// JSON group shape; omits the grouped entries themselves.
#[derive(Debug, Serialize)]
struct JsonGroup<'a> {
    #[serde(flatten)]
    key: &'a GroupKey,
    minutes: i64,
    hours: f64,
    normal_minutes: i64,
    extra_minutes: i64,
    count: usize,
}

fn format_report_json(groups: &[(GroupKey, GroupTotals)]) -> Result<String> {
    let rows: Vec<JsonGroup<'_>> = groups
        .iter()
        .map(|(key, totals)| JsonGroup {
            key,
            minutes: totals.minutes,
            hours: totals.hours(),
            normal_minutes: totals.normal_minutes,
            extra_minutes: totals.extra_minutes,
            count: totals.count,
        })
        .collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}
