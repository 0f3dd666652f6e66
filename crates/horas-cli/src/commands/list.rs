//! List command: filtered listing of stored entries.

use std::fmt::Write;

use anyhow::{Context, Result};
use horas_core::{SiteId, TaskId, TimeEntry, WorkerId};
use horas_db::{Database, EntryFilter};

use super::util::{describe, format_hours, parse_date};

#[allow(clippy::too_many_arguments)]
pub fn run(
    db: &Database,
    worker: Option<&str>,
    date: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
    site: Option<i64>,
    task: Option<i64>,
    json: bool,
) -> Result<()> {
    let filter = EntryFilter {
        worker: worker.map(WorkerId::new).transpose()?,
        date: date.map(parse_date).transpose()?,
        from: from.map(parse_date).transpose()?,
        to: to.map(parse_date).transpose()?,
        site: site.map(SiteId::new),
        task: task.map(TaskId::new),
    };
    let entries = db
        .list_entries(&filter)
        .context("failed to list entries")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        print!("{}", format_entries(&entries));
    }
    Ok(())
}

/// Formats the human-readable listing.
fn format_entries(entries: &[TimeEntry]) -> String {
    let mut output = String::new();
    if entries.is_empty() {
        writeln!(output, "no entries").unwrap();
        return output;
    }
    for entry in entries {
        let id = entry
            .id
            .map_or_else(|| "-".to_string(), |id| id.to_string());
        writeln!(
            output,
            "{id:>5}  {}  {:<12}  site {:>3}  {}",
            entry.date,
            entry.worker,
            entry.site,
            describe(entry)
        )
        .unwrap();
    }
    let total: i64 = entries.iter().map(|e| e.minutes).sum();
    writeln!(
        output,
        "{} entries, {} h total",
        entries.len(),
        format_hours(total)
    )
    .unwrap();
    output
}
