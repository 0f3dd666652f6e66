//! Overlap detection between candidate segments and a worker's stored
//! same-day entries.
//!
//! The checker is a pure decision function: it never mutates anything
//! and a conflict is a normal result value, not an error. Callers are
//! responsible for pre-filtering `existing` to the same worker and
//! date; only minute ranges are compared here.

use std::fmt;

use serde::Serialize;

use crate::entry::TimeEntry;
use crate::segment::TimeSegment;
use crate::types::EntryId;

/// Details of a detected overlap, surfaced verbatim for user-facing
/// messages naming the conflicting time range and task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conflict {
    /// The candidate segment that caused the conflict.
    pub candidate: TimeSegment,
    /// The stored segment it intersects.
    pub segment: TimeSegment,
    /// The existing entry that segment belongs to.
    pub entry: TimeEntry,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "segment {} overlaps existing segment {} (task {})",
            self.candidate, self.segment, self.entry.task
        )
    }
}

/// Result of an overlap check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum OverlapOutcome {
    /// No conflict across all candidate/existing pairs.
    Clear,
    /// The first conflicting pair found.
    Conflict(Conflict),
}

impl OverlapOutcome {
    /// Returns `true` when no conflict was found.
    #[must_use]
    pub const fn is_clear(&self) -> bool {
        matches!(self, Self::Clear)
    }
}

/// Checks candidate segments against a worker's existing same-day
/// entries.
///
/// `exclude` skips one stored entry by id, so an edit can validate a
/// replacement against every entry except the one being replaced.
/// Regularization entries carry no time range and never conflict.
///
/// Per-day segment counts are single digits, so this is a plain
/// pairwise scan with no index structure; the first conflict found
/// terminates the search.
#[must_use]
pub fn check_overlap(
    candidates: &[TimeSegment],
    existing: &[TimeEntry],
    exclude: Option<EntryId>,
) -> OverlapOutcome {
    for candidate in candidates {
        for entry in existing {
            if let Some(excluded) = exclude {
                if entry.id == Some(excluded) {
                    continue;
                }
            }
            let Some(segment) = entry.segment() else {
                continue;
            };
            if candidate.overlaps(segment) {
                return OverlapOutcome::Conflict(Conflict {
                    candidate: *candidate,
                    segment,
                    entry: entry.clone(),
                });
            }
        }
    }
    OverlapOutcome::Clear
}

/// Checks a batch of candidate segments against each other.
///
/// Returns the first conflicting pair, using the same half-open rule
/// as [`check_overlap`].
#[must_use]
pub fn check_self_overlap(candidates: &[TimeSegment]) -> Option<(TimeSegment, TimeSegment)> {
    for (index, first) in candidates.iter().enumerate() {
        for second in &candidates[index + 1..] {
            if first.overlaps(*second) {
                return Some((*first, *second));
            }
        }
    }
    None
}
