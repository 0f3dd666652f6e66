//! Storage layer for worker time entries.
//!
//! Provides persistence for [`TimeEntry`] records using `rusqlite`.
//! This crate is the collaborator the core assumes: it fetches a
//! worker's same-day entries before validation and persists validated
//! entries afterwards. It performs no validation of its own beyond
//! refusing rows it cannot map back to the typed model.
//!
//! # Thread Safety
//!
//! [`Database`] wraps a `rusqlite::Connection`, which is `Send` but not
//! `Sync`: an instance can move between threads but cannot be shared
//! without external synchronization.
//!
//! # Schema
//!
//! Dates are stored as TEXT in ISO 8601 (`YYYY-MM-DD`), so
//! lexicographic ordering matches chronological ordering. Clock bounds
//! are stored as minutes since midnight and are NULL for
//! regularization rows, mirroring how the surrounding systems keep no
//! schedule text on those records.
//!
//! Batch inserts run in one transaction: either every entry of a
//! submission lands or none do, and because reads and the insert go
//! through the same connection, a validated batch cannot interleave
//! with another write on this handle.

use std::path::Path;

use chrono::{NaiveDate, SecondsFormat, Utc};
use horas_core::{
    EntryId, EntryKind, Extra, ExtraKind, SiteId, TaskId, TimeEntry, TimeSegment, WorkerId,
};
use rusqlite::types::Value;
use rusqlite::{Connection, params};
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// No entry with the given id.
    #[error("entry {id} not found")]
    EntryNotFound { id: EntryId },

    /// The operation needs a persisted entry but got one without an id.
    #[error("entry has no id")]
    MissingId,

    /// Failed to parse a stored date.
    #[error("invalid date for entry {id}: {date}")]
    DateParse {
        id: i64,
        date: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A stored row does not map back to a valid entry.
    #[error("invalid row for entry {id}: {message}")]
    InvalidRow { id: i64, message: String },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety and schema
/// notes.
pub struct Database {
    conn: Connection,
}

/// Filters for [`Database::list_entries`].
///
/// All fields are optional and combine with AND. An exact `date`
/// takes precedence over the `from`/`to` range, matching how the
/// surrounding systems expose their listing filters.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub worker: Option<WorkerId>,
    pub date: Option<NaiveDate>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub site: Option<SiteId>,
    pub task: Option<TaskId>,
}

/// Raw row shape, converted to [`TimeEntry`] after reading.
struct EntryRow {
    id: i64,
    worker: String,
    date: String,
    site: i64,
    task: i64,
    start_minute: Option<i64>,
    end_minute: Option<i64>,
    minutes: i64,
    is_extra: bool,
    extra_kind: Option<String>,
    extra_description: Option<String>,
    is_regularization: bool,
}

const ENTRY_COLUMNS: &str = "id, worker, date, site, task, start_minute, end_minute, \
     minutes, is_extra, extra_kind, extra_description, is_regularization";

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<EntryRow> {
    Ok(EntryRow {
        id: row.get(0)?,
        worker: row.get(1)?,
        date: row.get(2)?,
        site: row.get(3)?,
        task: row.get(4)?,
        start_minute: row.get(5)?,
        end_minute: row.get(6)?,
        minutes: row.get(7)?,
        is_extra: row.get(8)?,
        extra_kind: row.get(9)?,
        extra_description: row.get(10)?,
        is_regularization: row.get(11)?,
    })
}

fn minute_in_day(row_id: i64, value: i64) -> Result<u16, DbError> {
    u16::try_from(value).map_err(|_| DbError::InvalidRow {
        id: row_id,
        message: format!("minute {value} out of range"),
    })
}

impl EntryRow {
    fn into_entry(self) -> Result<TimeEntry, DbError> {
        let id = self.id;
        let invalid = |message: String| DbError::InvalidRow { id, message };

        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").map_err(|source| {
            DbError::DateParse {
                id,
                date: self.date.clone(),
                source,
            }
        })?;
        let worker =
            WorkerId::new(self.worker).map_err(|err| invalid(err.to_string()))?;

        let kind = if self.is_regularization {
            if self.start_minute.is_some() || self.end_minute.is_some() {
                return Err(invalid("regularization with a clock range".to_string()));
            }
            EntryKind::Regularization
        } else {
            let (Some(start), Some(end)) = (self.start_minute, self.end_minute) else {
                return Err(invalid("segment entry without clock bounds".to_string()));
            };
            let segment =
                TimeSegment::new(minute_in_day(id, start)?, minute_in_day(id, end)?)
                    .map_err(|err| invalid(err.to_string()))?;
            EntryKind::Segment(segment)
        };

        let extra = if self.is_extra {
            let kind_text = self
                .extra_kind
                .ok_or_else(|| invalid("extra entry without kind".to_string()))?;
            let description = self
                .extra_description
                .ok_or_else(|| invalid("extra entry without description".to_string()))?;
            let kind: ExtraKind = kind_text
                .parse()
                .map_err(|_| invalid(format!("unknown extra kind '{kind_text}'")))?;
            Some(Extra { kind, description })
        } else {
            None
        };

        Ok(TimeEntry {
            id: Some(EntryId::new(id)),
            worker,
            date,
            site: SiteId::new(self.site),
            task: TaskId::new(self.task),
            kind,
            minutes: self.minutes,
            extra,
        })
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the
    /// connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the schema. Idempotent.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                worker TEXT NOT NULL,
                date TEXT NOT NULL,
                site INTEGER NOT NULL,
                task INTEGER NOT NULL,
                start_minute INTEGER,
                end_minute INTEGER,
                minutes INTEGER NOT NULL,
                is_extra INTEGER NOT NULL DEFAULT 0,
                extra_kind TEXT,
                extra_description TEXT,
                is_regularization INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_entries_worker_date ON entries(worker, date);
            CREATE INDEX IF NOT EXISTS idx_entries_date ON entries(date);
            CREATE INDEX IF NOT EXISTS idx_entries_site ON entries(site);
            CREATE INDEX IF NOT EXISTS idx_entries_task ON entries(task);
            ",
        )?;
        Ok(())
    }

    /// Inserts a batch of validated entries in one transaction.
    ///
    /// Returns the assigned ids, in input order. A failure rolls the
    /// whole batch back, so a submission is persisted all-or-nothing.
    pub fn insert_entries(&mut self, entries: &[TimeEntry]) -> Result<Vec<EntryId>, DbError> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let tx = self.conn.transaction()?;
        let mut ids = Vec::with_capacity(entries.len());
        {
            let mut stmt = tx.prepare(
                "
                INSERT INTO entries
                (worker, date, site, task, start_minute, end_minute, minutes,
                 is_extra, extra_kind, extra_description, is_regularization, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ",
            )?;
            for entry in entries {
                let segment = entry.segment();
                stmt.execute(params![
                    entry.worker.as_str(),
                    format_date(entry.date),
                    entry.site.value(),
                    entry.task.value(),
                    segment.map(|s| i64::from(s.start_minute())),
                    segment.map(|s| i64::from(s.end_minute())),
                    entry.minutes,
                    entry.extra.is_some(),
                    entry.extra.as_ref().map(|e| e.kind.as_str()),
                    entry.extra.as_ref().map(|e| e.description.as_str()),
                    entry.is_regularization(),
                    created_at,
                ])?;
                ids.push(EntryId::new(tx.last_insert_rowid()));
            }
        }
        tx.commit()?;
        tracing::debug!(count = entries.len(), "inserted entries");
        Ok(ids)
    }

    /// Replaces a stored entry wholesale with the given state.
    ///
    /// The entry must carry the id of the row to replace.
    pub fn replace_entry(&self, entry: &TimeEntry) -> Result<(), DbError> {
        let id = entry.id.ok_or(DbError::MissingId)?;
        let segment = entry.segment();
        let updated = self.conn.execute(
            "
            UPDATE entries
            SET worker = ?, date = ?, site = ?, task = ?,
                start_minute = ?, end_minute = ?, minutes = ?,
                is_extra = ?, extra_kind = ?, extra_description = ?,
                is_regularization = ?
            WHERE id = ?
            ",
            params![
                entry.worker.as_str(),
                format_date(entry.date),
                entry.site.value(),
                entry.task.value(),
                segment.map(|s| i64::from(s.start_minute())),
                segment.map(|s| i64::from(s.end_minute())),
                entry.minutes,
                entry.extra.is_some(),
                entry.extra.as_ref().map(|e| e.kind.as_str()),
                entry.extra.as_ref().map(|e| e.description.as_str()),
                entry.is_regularization(),
                id.value(),
            ],
        )?;
        if updated == 0 {
            return Err(DbError::EntryNotFound { id });
        }
        tracing::debug!(%id, "replaced entry");
        Ok(())
    }

    /// Deletes one entry by id.
    pub fn delete_entry(&self, id: EntryId) -> Result<(), DbError> {
        let deleted = self
            .conn
            .execute("DELETE FROM entries WHERE id = ?", params![id.value()])?;
        if deleted == 0 {
            return Err(DbError::EntryNotFound { id });
        }
        tracing::debug!(%id, "deleted entry");
        Ok(())
    }

    /// Fetches one entry by id.
    pub fn get_entry(&self, id: EntryId) -> Result<Option<TimeEntry>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?"
        ))?;
        let mut rows = stmt.query_map(params![id.value()], row_to_record)?;
        match rows.next() {
            Some(row) => Ok(Some(row?.into_entry()?)),
            None => Ok(None),
        }
    }

    /// All of a worker's entries for one date, the `existing` set the
    /// overlap check runs against.
    pub fn entries_for_worker_date(
        &self,
        worker: &WorkerId,
        date: NaiveDate,
    ) -> Result<Vec<TimeEntry>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "
            SELECT {ENTRY_COLUMNS}
            FROM entries
            WHERE worker = ? AND date = ?
            ORDER BY start_minute ASC, id ASC
            "
        ))?;
        let rows = stmt.query_map(params![worker.as_str(), format_date(date)], row_to_record)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.into_entry()?);
        }
        Ok(entries)
    }

    /// Lists entries matching a filter, ordered by date then id.
    pub fn list_entries(&self, filter: &EntryFilter) -> Result<Vec<TimeEntry>, DbError> {
        let mut conditions: Vec<&str> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        if let Some(worker) = &filter.worker {
            conditions.push("worker = ?");
            params.push(Value::Text(worker.as_str().to_string()));
        }
        if let Some(date) = filter.date {
            conditions.push("date = ?");
            params.push(Value::Text(format_date(date)));
        } else {
            if let Some(from) = filter.from {
                conditions.push("date >= ?");
                params.push(Value::Text(format_date(from)));
            }
            if let Some(to) = filter.to {
                conditions.push("date <= ?");
                params.push(Value::Text(format_date(to)));
            }
        }
        if let Some(site) = filter.site {
            conditions.push("site = ?");
            params.push(Value::Integer(site.value()));
        }
        if let Some(task) = filter.task {
            conditions.push("task = ?");
            params.push(Value::Integer(task.value()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM entries {where_clause} ORDER BY date ASC, id ASC"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params), row_to_record)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.into_entry()?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horas_core::{DraftKind, EntryDraft, Submission, validate_and_build_entries};

    fn worker(name: &str) -> WorkerId {
        WorkerId::new(name).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn segment_draft(text: &str, task: i64) -> EntryDraft {
        let segment: TimeSegment = text.parse().unwrap();
        EntryDraft {
            task: TaskId::new(task),
            kind: DraftKind::Segment {
                start_minute: segment.start_minute(),
                end_minute: segment.end_minute(),
            },
            extra: None,
        }
    }

    fn build(worker_name: &str, on: NaiveDate, site: i64, drafts: Vec<EntryDraft>) -> Vec<TimeEntry> {
        let submission = Submission {
            worker: worker(worker_name),
            date: on,
            site: SiteId::new(site),
            drafts,
        };
        validate_and_build_entries(&submission, &[]).unwrap()
    }

    #[test]
    fn insert_assigns_sequential_ids_and_roundtrips() {
        let mut db = Database::open_in_memory().unwrap();
        let entries = build(
            "ana",
            date(2025, 3, 10),
            1,
            vec![segment_draft("08:00-12:00", 3), segment_draft("14:00-18:00", 4)],
        );

        let ids = db.insert_entries(&entries).unwrap();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);

        let stored = db.get_entry(ids[0]).unwrap().unwrap();
        assert_eq!(stored.worker.as_str(), "ana");
        assert_eq!(stored.segment().unwrap().to_string(), "08:00-12:00");
        assert_eq!(stored.minutes, 240);
        assert_eq!(stored.task, TaskId::new(3));
    }

    #[test]
    fn regularization_roundtrips_without_clock_bounds() {
        let mut db = Database::open_in_memory().unwrap();
        let entries = build(
            "ana",
            date(2025, 3, 10),
            1,
            vec![EntryDraft {
                task: TaskId::new(3),
                kind: DraftKind::Regularization { minutes: 150 },
                extra: None,
            }],
        );
        let ids = db.insert_entries(&entries).unwrap();

        let stored = db.get_entry(ids[0]).unwrap().unwrap();
        assert!(stored.is_regularization());
        assert_eq!(stored.segment(), None);
        assert_eq!(stored.minutes, 150);
    }

    #[test]
    fn extra_metadata_roundtrips() {
        let mut db = Database::open_in_memory().unwrap();
        let mut draft = segment_draft("18:00-20:00", 3);
        draft.extra = Some(Extra {
            kind: ExtraKind::External,
            description: "urgent pour".to_string(),
        });
        let entries = build("ana", date(2025, 3, 10), 1, vec![draft]);
        let ids = db.insert_entries(&entries).unwrap();

        let stored = db.get_entry(ids[0]).unwrap().unwrap();
        let extra = stored.extra.unwrap();
        assert_eq!(extra.kind, ExtraKind::External);
        assert_eq!(extra.description, "urgent pour");
    }

    #[test]
    fn worker_date_lookup_is_scoped() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_entries(&build(
            "ana",
            date(2025, 3, 10),
            1,
            vec![segment_draft("08:00-12:00", 3)],
        ))
        .unwrap();
        db.insert_entries(&build(
            "ana",
            date(2025, 3, 11),
            1,
            vec![segment_draft("08:00-12:00", 3)],
        ))
        .unwrap();
        db.insert_entries(&build(
            "bea",
            date(2025, 3, 10),
            1,
            vec![segment_draft("08:00-12:00", 3)],
        ))
        .unwrap();

        let same_day = db
            .entries_for_worker_date(&worker("ana"), date(2025, 3, 10))
            .unwrap();
        assert_eq!(same_day.len(), 1);
        assert_eq!(same_day[0].worker.as_str(), "ana");
        assert_eq!(same_day[0].date, date(2025, 3, 10));
    }

    #[test]
    fn replace_updates_in_place() {
        let mut db = Database::open_in_memory().unwrap();
        let ids = db
            .insert_entries(&build(
                "ana",
                date(2025, 3, 10),
                1,
                vec![segment_draft("08:00-12:00", 3)],
            ))
            .unwrap();

        let mut replacement = build(
            "ana",
            date(2025, 3, 10),
            1,
            vec![segment_draft("09:00-13:00", 4)],
        )
        .remove(0);
        replacement.id = Some(ids[0]);
        db.replace_entry(&replacement).unwrap();

        let stored = db.get_entry(ids[0]).unwrap().unwrap();
        assert_eq!(stored.segment().unwrap().to_string(), "09:00-13:00");
        assert_eq!(stored.task, TaskId::new(4));
    }

    #[test]
    fn replace_clears_extra_fields() {
        let mut db = Database::open_in_memory().unwrap();
        let mut draft = segment_draft("18:00-20:00", 3);
        draft.extra = Some(Extra {
            kind: ExtraKind::Internal,
            description: "deadline".to_string(),
        });
        let ids = db
            .insert_entries(&build("ana", date(2025, 3, 10), 1, vec![draft]))
            .unwrap();

        let mut replacement = build(
            "ana",
            date(2025, 3, 10),
            1,
            vec![segment_draft("18:00-20:00", 3)],
        )
        .remove(0);
        replacement.id = Some(ids[0]);
        db.replace_entry(&replacement).unwrap();

        let stored = db.get_entry(ids[0]).unwrap().unwrap();
        assert_eq!(stored.extra, None);
    }

    #[test]
    fn replace_missing_entry_fails() {
        let db = Database::open_in_memory().unwrap();
        let mut entry = build(
            "ana",
            date(2025, 3, 10),
            1,
            vec![segment_draft("08:00-12:00", 3)],
        )
        .remove(0);
        entry.id = Some(EntryId::new(99));
        assert!(matches!(
            db.replace_entry(&entry),
            Err(DbError::EntryNotFound { .. })
        ));
    }

    #[test]
    fn replace_without_id_fails() {
        let db = Database::open_in_memory().unwrap();
        let entry = build(
            "ana",
            date(2025, 3, 10),
            1,
            vec![segment_draft("08:00-12:00", 3)],
        )
        .remove(0);
        assert!(matches!(db.replace_entry(&entry), Err(DbError::MissingId)));
    }

    #[test]
    fn delete_removes_entry() {
        let mut db = Database::open_in_memory().unwrap();
        let ids = db
            .insert_entries(&build(
                "ana",
                date(2025, 3, 10),
                1,
                vec![segment_draft("08:00-12:00", 3)],
            ))
            .unwrap();

        db.delete_entry(ids[0]).unwrap();
        assert!(db.get_entry(ids[0]).unwrap().is_none());
        assert!(matches!(
            db.delete_entry(ids[0]),
            Err(DbError::EntryNotFound { .. })
        ));
    }

    #[test]
    fn list_filters_combine() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_entries(&build(
            "ana",
            date(2025, 3, 10),
            1,
            vec![segment_draft("08:00-12:00", 3)],
        ))
        .unwrap();
        db.insert_entries(&build(
            "ana",
            date(2025, 3, 20),
            2,
            vec![segment_draft("08:00-12:00", 4)],
        ))
        .unwrap();
        db.insert_entries(&build(
            "bea",
            date(2025, 3, 15),
            1,
            vec![segment_draft("08:00-12:00", 3)],
        ))
        .unwrap();

        let all = db.list_entries(&EntryFilter::default()).unwrap();
        assert_eq!(all.len(), 3);

        let ana_only = db
            .list_entries(&EntryFilter {
                worker: Some(worker("ana")),
                ..EntryFilter::default()
            })
            .unwrap();
        assert_eq!(ana_only.len(), 2);

        let march_first_half = db
            .list_entries(&EntryFilter {
                from: Some(date(2025, 3, 1)),
                to: Some(date(2025, 3, 15)),
                ..EntryFilter::default()
            })
            .unwrap();
        assert_eq!(march_first_half.len(), 2);

        let site_one_task_three = db
            .list_entries(&EntryFilter {
                site: Some(SiteId::new(1)),
                task: Some(TaskId::new(3)),
                ..EntryFilter::default()
            })
            .unwrap();
        assert_eq!(site_one_task_three.len(), 2);
    }

    #[test]
    fn exact_date_filter_wins_over_range() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_entries(&build(
            "ana",
            date(2025, 3, 10),
            1,
            vec![segment_draft("08:00-12:00", 3)],
        ))
        .unwrap();
        db.insert_entries(&build(
            "ana",
            date(2025, 3, 11),
            1,
            vec![segment_draft("08:00-12:00", 3)],
        ))
        .unwrap();

        let listed = db
            .list_entries(&EntryFilter {
                date: Some(date(2025, 3, 10)),
                from: Some(date(2025, 1, 1)),
                to: Some(date(2025, 12, 31)),
                ..EntryFilter::default()
            })
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].date, date(2025, 3, 10));
    }

    #[test]
    fn list_orders_by_date() {
        let mut db = Database::open_in_memory().unwrap();
        for day in [12, 10, 11] {
            db.insert_entries(&build(
                "ana",
                date(2025, 3, day),
                1,
                vec![segment_draft("08:00-12:00", 3)],
            ))
            .unwrap();
        }
        let listed = db.list_entries(&EntryFilter::default()).unwrap();
        let days: Vec<u32> = listed.iter().map(|e| chrono::Datelike::day(&e.date)).collect();
        assert_eq!(days, vec![10, 11, 12]);
    }

    #[test]
    fn open_creates_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("horas.db");
        {
            let mut db = Database::open(&path).unwrap();
            db.insert_entries(&build(
                "ana",
                date(2025, 3, 10),
                1,
                vec![segment_draft("08:00-12:00", 3)],
            ))
            .unwrap();
        }
        // Reopen and read back.
        let db = Database::open(&path).unwrap();
        let listed = db.list_entries(&EntryFilter::default()).unwrap();
        assert_eq!(listed.len(), 1);
    }
}
