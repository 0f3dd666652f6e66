//! Delete command: remove one stored entry.

use anyhow::{Context, Result};
use horas_core::EntryId;
use horas_db::Database;

pub fn run(db: &Database, id: i64) -> Result<()> {
    let entry_id = EntryId::new(id);
    db.delete_entry(entry_id)
        .with_context(|| format!("failed to delete entry {id}"))?;
    println!("deleted entry {entry_id}");
    Ok(())
}
