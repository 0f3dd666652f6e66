//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Worker time entry administration.
///
/// Records worked time as clock segments or fixed-hour regularizations,
/// rejects overlapping ranges within a worker's day, and reports
/// grouped totals.
#[derive(Debug, Parser)]
#[command(name = "horas", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record entries for one worker's day.
    Register {
        /// Worker the hours belong to.
        #[arg(long)]
        worker: String,

        /// Date of the entries (YYYY-MM-DD).
        #[arg(long)]
        date: String,

        /// Site ("obra") the hours are attributed to.
        #[arg(long)]
        site: i64,

        /// Task ("partida") the hours are attributed to.
        #[arg(long)]
        task: i64,

        /// Clock segment as HH:MM-HH:MM. Repeatable; also accepts a
        /// comma-separated list. All segments of one invocation are
        /// validated and stored as a single batch.
        #[arg(long = "segment")]
        segments: Vec<String>,

        /// Record a fixed hour count with no clock range instead of
        /// segments.
        #[arg(long, conflicts_with = "segments")]
        regularize: Option<String>,

        /// Flag the entries as overtime (internal or external).
        #[arg(long)]
        extra: Option<String>,

        /// Overtime description; required with --extra.
        #[arg(long, requires = "extra")]
        extra_description: Option<String>,
    },

    /// Replace one stored entry wholesale.
    Edit {
        /// Id of the entry to replace.
        id: i64,

        /// New clock segment as HH:MM-HH:MM.
        #[arg(long)]
        segment: Option<String>,

        /// Turn the entry into a regularization of this many hours.
        #[arg(long, conflicts_with = "segment")]
        regularize: Option<String>,

        /// Move the entry to another date (YYYY-MM-DD).
        #[arg(long)]
        date: Option<String>,

        /// Reattribute to another site.
        #[arg(long)]
        site: Option<i64>,

        /// Reattribute to another task.
        #[arg(long)]
        task: Option<i64>,

        /// Flag as overtime (internal or external).
        #[arg(long, conflicts_with = "clear_extra")]
        extra: Option<String>,

        /// Overtime description; required with --extra.
        #[arg(long, requires = "extra")]
        extra_description: Option<String>,

        /// Drop the overtime flag and its description.
        #[arg(long)]
        clear_extra: bool,
    },

    /// Delete one stored entry.
    Delete {
        /// Id of the entry to delete.
        id: i64,
    },

    /// List stored entries.
    List {
        /// Only this worker's entries.
        #[arg(long)]
        worker: Option<String>,

        /// Only entries on this exact date (YYYY-MM-DD).
        #[arg(long)]
        date: Option<String>,

        /// Start of a date range (inclusive).
        #[arg(long)]
        from: Option<String>,

        /// End of a date range (inclusive).
        #[arg(long)]
        to: Option<String>,

        /// Only entries attributed to this site.
        #[arg(long)]
        site: Option<i64>,

        /// Only entries attributed to this task.
        #[arg(long)]
        task: Option<i64>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Grouped hour totals.
    Report {
        /// Month to report (YYYY-MM).
        #[arg(long, conflicts_with_all = ["from", "to"])]
        month: Option<String>,

        /// Start of a date range (inclusive).
        #[arg(long)]
        from: Option<String>,

        /// End of a date range (inclusive).
        #[arg(long)]
        to: Option<String>,

        /// Only this worker's entries.
        #[arg(long)]
        worker: Option<String>,

        /// Break each worker's days down per task.
        #[arg(long, conflicts_with = "by_site")]
        by_task: bool,

        /// Group by site and task instead of worker and day.
        #[arg(long)]
        by_site: bool,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}
