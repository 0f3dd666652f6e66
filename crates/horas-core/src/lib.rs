//! Core domain logic for worker time entries.
//!
//! This crate contains the fundamental types and logic for:
//! - Segments: minute-resolution clock ranges and their durations
//! - Overlap checking: rejecting conflicting ranges within a worker's day
//! - Entries: segment and regularization records with construction/edit
//!   validation
//! - Aggregation: grouping stored entries for reports
//!
//! Everything here is a pure, synchronous computation over data the
//! caller supplies; fetching a worker's existing entries and persisting
//! the results belong to the storage layer.

pub mod aggregate;
pub mod entry;
pub mod overlap;
pub mod segment;
pub mod types;

pub use aggregate::{GroupBy, GroupKey, GroupTotals, aggregate};
pub use entry::{
    DraftKind, EntryDraft, EntryKind, Extra, Replacement, Submission, TimeEntry, ValidationError,
    validate_and_build_entries, validate_and_replace_entry,
};
pub use overlap::{Conflict, OverlapOutcome, check_overlap, check_self_overlap};
pub use segment::{MINUTES_PER_DAY, SegmentError, TimeSegment, parse_schedule, total_minutes};
pub use types::{EntryId, ExtraKind, SiteId, TaskId, TypeError, WorkerId};
