//! Time entries and the validation that guards their creation and
//! replacement.
//!
//! An entry records either one clock segment (with its duration derived
//! from the segment) or a regularization (a fixed duration with no
//! clock range). Entries are built from untyped drafts through
//! [`validate_and_build_entries`] / [`validate_and_replace_entry`],
//! which are the only paths that produce them; loosely-shaped input is
//! rejected rather than coerced.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::overlap::{Conflict, OverlapOutcome, check_overlap, check_self_overlap};
use crate::segment::{SegmentError, TimeSegment};
use crate::types::{EntryId, ExtraKind, SiteId, TaskId, WorkerId};

/// Overtime metadata. Present only on entries flagged as extra; the
/// description is mandatory whenever the flag is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extra {
    pub kind: ExtraKind,
    pub description: String,
}

/// What a time entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "segment", rename_all = "snake_case")]
pub enum EntryKind {
    /// One clock segment; the entry's duration derives from it.
    Segment(TimeSegment),
    /// A fixed hour count with no clock range.
    Regularization,
}

/// One persisted record of worked time.
///
/// `minutes` is derived from the segment for [`EntryKind::Segment`] and
/// supplied directly for [`EntryKind::Regularization`]; consumers (the
/// aggregator included) trust the stored value and never re-derive it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    /// Persistence-assigned id; `None` until the entry is stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntryId>,
    pub worker: WorkerId,
    pub date: NaiveDate,
    pub site: SiteId,
    pub task: TaskId,
    #[serde(flatten)]
    pub kind: EntryKind,
    pub minutes: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Extra>,
}

impl TimeEntry {
    /// The entry's clock segment, if it has one.
    #[must_use]
    pub const fn segment(&self) -> Option<TimeSegment> {
        match self.kind {
            EntryKind::Segment(segment) => Some(segment),
            EntryKind::Regularization => None,
        }
    }

    /// Duration in hours, for display.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hours(&self) -> f64 {
        self.minutes as f64 / 60.0
    }

    /// Whether the entry is flagged as overtime.
    #[must_use]
    pub const fn is_extra(&self) -> bool {
        self.extra.is_some()
    }

    /// Whether the entry is a regularization.
    #[must_use]
    pub const fn is_regularization(&self) -> bool {
        matches!(self.kind, EntryKind::Regularization)
    }
}

/// The duration part of a not-yet-validated entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftKind {
    /// Raw minute bounds, validated into a [`TimeSegment`].
    Segment { start_minute: u16, end_minute: u16 },
    /// A directly supplied duration.
    Regularization { minutes: i64 },
}

/// One prospective entry within a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    pub task: TaskId,
    pub kind: DraftKind,
    pub extra: Option<Extra>,
}

/// A batch of prospective entries for one worker, date and site.
///
/// Each draft becomes an independent [`TimeEntry`]; validation is
/// all-or-nothing across the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub worker: WorkerId,
    pub date: NaiveDate,
    pub site: SiteId,
    pub drafts: Vec<EntryDraft>,
}

/// The full replacement state for editing one stored entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub worker: WorkerId,
    pub date: NaiveDate,
    pub site: SiteId,
    pub draft: EntryDraft,
}

/// Why a submission or replacement was rejected.
///
/// Every variant is a terminal outcome reported before any state
/// mutation; a rejected operation leaves previously stored entries
/// untouched.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Malformed or non-positive-duration segment.
    #[error(transparent)]
    InvalidSegment(#[from] SegmentError),

    /// A required field was absent or empty.
    #[error("{field} is required")]
    MissingRequiredField { field: &'static str },

    /// Regularization hours must be strictly positive.
    #[error("regularization hours must be positive, got {minutes} minutes")]
    NonPositiveMinutes { minutes: i64 },

    /// A candidate segment overlaps a stored same-day entry.
    #[error("{0}")]
    Overlap(Conflict),

    /// Two segments within the same submission overlap.
    #[error("segments {first} and {second} in the same submission overlap")]
    SelfOverlap {
        first: TimeSegment,
        second: TimeSegment,
    },
}

fn build_entry(
    worker: &WorkerId,
    date: NaiveDate,
    site: SiteId,
    draft: &EntryDraft,
) -> Result<TimeEntry, ValidationError> {
    if let Some(extra) = &draft.extra {
        if extra.description.trim().is_empty() {
            return Err(ValidationError::MissingRequiredField {
                field: "extra description",
            });
        }
    }
    let (kind, minutes) = match draft.kind {
        DraftKind::Segment {
            start_minute,
            end_minute,
        } => {
            let segment = TimeSegment::new(start_minute, end_minute)?;
            (EntryKind::Segment(segment), segment.minutes())
        }
        DraftKind::Regularization { minutes } => {
            if minutes <= 0 {
                return Err(ValidationError::NonPositiveMinutes { minutes });
            }
            (EntryKind::Regularization, minutes)
        }
    };
    Ok(TimeEntry {
        id: None,
        worker: worker.clone(),
        date,
        site,
        task: draft.task,
        kind,
        minutes,
        extra: draft.extra.clone(),
    })
}

/// Validates a submission and builds one entry per draft.
///
/// `existing` must hold the worker's stored entries for the submission
/// date (the caller fetches them; see [`check_overlap`]). Any failure
/// rejects the whole batch: either every returned entry is safe to
/// persist or none are. Returned entries carry no id yet.
pub fn validate_and_build_entries(
    submission: &Submission,
    existing: &[TimeEntry],
) -> Result<Vec<TimeEntry>, ValidationError> {
    if submission.drafts.is_empty() {
        return Err(ValidationError::MissingRequiredField { field: "entries" });
    }

    let mut entries = Vec::with_capacity(submission.drafts.len());
    for draft in &submission.drafts {
        entries.push(build_entry(
            &submission.worker,
            submission.date,
            submission.site,
            draft,
        )?);
    }

    let candidates: Vec<TimeSegment> = entries.iter().filter_map(TimeEntry::segment).collect();
    if let Some((first, second)) = check_self_overlap(&candidates) {
        return Err(ValidationError::SelfOverlap { first, second });
    }
    if let OverlapOutcome::Conflict(conflict) = check_overlap(&candidates, existing, None) {
        return Err(ValidationError::Overlap(conflict));
    }

    Ok(entries)
}

/// Validates a full replacement for the stored entry `id`.
///
/// The replacement's segment is checked against every same-day entry
/// except the one being replaced, so an unchanged range validates
/// against itself. On success the returned entry carries `id` and
/// completely supersedes the prior state, extra flags included; a
/// failure must leave the stored entry untouched (the caller only
/// writes on `Ok`).
pub fn validate_and_replace_entry(
    id: EntryId,
    replacement: &Replacement,
    existing: &[TimeEntry],
) -> Result<TimeEntry, ValidationError> {
    let mut entry = build_entry(
        &replacement.worker,
        replacement.date,
        replacement.site,
        &replacement.draft,
    )?;
    if let Some(segment) = entry.segment() {
        if let OverlapOutcome::Conflict(conflict) = check_overlap(&[segment], existing, Some(id)) {
            return Err(ValidationError::Overlap(conflict));
        }
    }
    entry.id = Some(id);
    Ok(entry)
}
