//! Edit command: replace one stored entry wholesale.
//!
//! Flags not given keep the entry's current value, but the result is
//! always validated and written as a complete replacement; a rejected
//! edit leaves the stored entry exactly as it was.

use anyhow::{Context, Result, anyhow};
use horas_core::{
    DraftKind, EntryDraft, EntryId, Replacement, SiteId, TaskId, TimeSegment,
    validate_and_replace_entry,
};
use horas_db::Database;

use super::util::{describe, parse_date, parse_extra, parse_hours_to_minutes};

#[allow(clippy::too_many_arguments)]
pub fn run(
    db: &mut Database,
    id: i64,
    segment: Option<&str>,
    regularize: Option<&str>,
    date: Option<&str>,
    site: Option<i64>,
    task: Option<i64>,
    extra: Option<&str>,
    extra_description: Option<&str>,
    clear_extra: bool,
) -> Result<()> {
    let entry_id = EntryId::new(id);
    let current = db
        .get_entry(entry_id)
        .context("failed to load the entry")?
        .ok_or_else(|| anyhow!("entry {id} not found"))?;

    let date = match date {
        Some(text) => parse_date(text)?,
        None => current.date,
    };
    let site = site.map_or(current.site, SiteId::new);
    let task = task.map_or(current.task, TaskId::new);

    // An extra -> non-extra transition clears kind and description
    // together; there is no partial patch of the overtime fields.
    let extra = if clear_extra {
        None
    } else if extra.is_some() {
        parse_extra(extra, extra_description)?
    } else {
        current.extra.clone()
    };

    let kind = if let Some(hours) = regularize {
        DraftKind::Regularization {
            minutes: parse_hours_to_minutes(hours)?,
        }
    } else if let Some(text) = segment {
        let segment: TimeSegment = text.parse()?;
        DraftKind::Segment {
            start_minute: segment.start_minute(),
            end_minute: segment.end_minute(),
        }
    } else if let Some(segment) = current.segment() {
        DraftKind::Segment {
            start_minute: segment.start_minute(),
            end_minute: segment.end_minute(),
        }
    } else {
        DraftKind::Regularization {
            minutes: current.minutes,
        }
    };

    let existing = db
        .entries_for_worker_date(&current.worker, date)
        .context("failed to load the worker's entries for that day")?;
    let replacement = Replacement {
        worker: current.worker.clone(),
        date,
        site,
        draft: EntryDraft { task, kind, extra },
    };
    let entry = validate_and_replace_entry(entry_id, &replacement, &existing)?;

    db.replace_entry(&entry)
        .context("failed to store the replacement")?;
    println!("updated entry {entry_id}: {}", describe(&entry));
    Ok(())
}
