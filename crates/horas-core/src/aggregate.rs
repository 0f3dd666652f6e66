//! Grouping and summation of stored entries for reporting.
//!
//! Aggregation is a read-only projection: it buckets entries by a
//! requested key set and sums the durations they already carry. It
//! never re-derives a duration from a segment; validation owns that.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::entry::TimeEntry;
use crate::types::{SiteId, TaskId, WorkerId};

/// Which entry fields participate in the group key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupBy {
    pub date: bool,
    pub worker: bool,
    pub site: bool,
    pub task: bool,
}

impl GroupBy {
    /// Daily totals per worker: the `(date, worker)` key.
    pub const DAILY: Self = Self {
        date: true,
        worker: true,
        site: false,
        task: false,
    };

    /// Daily per-task totals per worker: `(date, worker, task)`.
    pub const DAILY_BY_TASK: Self = Self {
        date: true,
        worker: true,
        site: false,
        task: true,
    };

    /// Site report breakdown: `(site, task)`.
    pub const SITE_TASK: Self = Self {
        date: false,
        worker: false,
        site: true,
        task: true,
    };
}

/// The tuple of key fields a group was bucketed by.
///
/// Fields not requested in the [`GroupBy`] stay `None`. Ordering is the
/// tuple order `(date, worker, site, task)`, so grouped output is
/// chronological whenever dates participate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct GroupKey {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker: Option<WorkerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<SiteId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<TaskId>,
}

/// Sums for one group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupTotals {
    /// Total minutes across all entries in the group.
    pub minutes: i64,
    /// Minutes from entries not flagged as extra.
    pub normal_minutes: i64,
    /// Minutes from entries flagged as extra.
    pub extra_minutes: i64,
    /// Number of entries in the group.
    pub count: usize,
    /// The grouped entries themselves, in input order.
    pub entries: Vec<TimeEntry>,
}

impl GroupTotals {
    /// Total hours, for display.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hours(&self) -> f64 {
        self.minutes as f64 / 60.0
    }
}

/// Buckets entries by the requested key set and sums their stored
/// durations.
///
/// Segment-derived and regularization durations participate
/// identically, and the normal/extra split follows each entry's extra
/// flag. Output is sorted ascending by [`GroupKey`], so group totals do
/// not depend on input order.
#[must_use]
pub fn aggregate(entries: &[TimeEntry], group_by: GroupBy) -> Vec<(GroupKey, GroupTotals)> {
    let mut groups: BTreeMap<GroupKey, GroupTotals> = BTreeMap::new();

    for entry in entries {
        let key = GroupKey {
            date: group_by.date.then_some(entry.date),
            worker: group_by.worker.then(|| entry.worker.clone()),
            site: group_by.site.then_some(entry.site),
            task: group_by.task.then_some(entry.task),
        };
        let totals = groups.entry(key).or_default();
        totals.minutes += entry.minutes;
        if entry.is_extra() {
            totals.extra_minutes += entry.minutes;
        } else {
            totals.normal_minutes += entry.minutes;
        }
        totals.count += 1;
        totals.entries.push(entry.clone());
    }

    groups.into_iter().collect()
}
