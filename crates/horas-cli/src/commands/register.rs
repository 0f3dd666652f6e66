//! Register command: create entries for one worker's day.
//!
//! All segments of one invocation form a single batch: they are
//! checked against each other and against the worker's stored same-day
//! entries, and either every entry is persisted or none are.

use anyhow::{Context, Result, bail};
use horas_core::{
    DraftKind, EntryDraft, SiteId, Submission, TaskId, WorkerId, parse_schedule,
    validate_and_build_entries,
};
use horas_db::Database;

use super::util::{describe, parse_date, parse_extra, parse_hours_to_minutes};

#[allow(clippy::too_many_arguments)]
pub fn run(
    db: &mut Database,
    worker: &str,
    date: &str,
    site: i64,
    task: i64,
    segments: &[String],
    regularize: Option<&str>,
    extra: Option<&str>,
    extra_description: Option<&str>,
) -> Result<()> {
    let worker = WorkerId::new(worker)?;
    let date = parse_date(date)?;
    let extra = parse_extra(extra, extra_description)?;
    let task = TaskId::new(task);

    let drafts = if let Some(hours) = regularize {
        let minutes = parse_hours_to_minutes(hours)?;
        vec![EntryDraft {
            task,
            kind: DraftKind::Regularization { minutes },
            extra,
        }]
    } else {
        if segments.is_empty() {
            bail!("provide at least one --segment, or --regularize");
        }
        let mut drafts = Vec::new();
        for text in segments {
            for segment in parse_schedule(text)? {
                drafts.push(EntryDraft {
                    task,
                    kind: DraftKind::Segment {
                        start_minute: segment.start_minute(),
                        end_minute: segment.end_minute(),
                    },
                    extra: extra.clone(),
                });
            }
        }
        drafts
    };

    let existing = db
        .entries_for_worker_date(&worker, date)
        .context("failed to load the worker's entries for that day")?;
    tracing::debug!(
        worker = %worker,
        %date,
        existing = existing.len(),
        drafts = drafts.len(),
        "validating submission"
    );

    let submission = Submission {
        worker,
        date,
        site: SiteId::new(site),
        drafts,
    };
    let entries = validate_and_build_entries(&submission, &existing)?;

    let ids = db
        .insert_entries(&entries)
        .context("failed to store entries")?;
    for (id, entry) in ids.iter().zip(&entries) {
        println!("created entry {id}: {}", describe(entry));
    }
    Ok(())
}
