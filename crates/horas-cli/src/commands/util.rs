//! Shared parsing and formatting helpers for the subcommands.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use horas_core::{Extra, ExtraKind, TimeEntry};

/// Parses a `YYYY-MM-DD` date argument.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{text}', expected YYYY-MM-DD"))
}

/// Builds the overtime metadata from the `--extra` flags.
///
/// An empty description passes through; the core rejects it so the
/// rule lives in one place.
pub fn parse_extra(kind: Option<&str>, description: Option<&str>) -> Result<Option<Extra>> {
    let Some(kind) = kind else {
        return Ok(None);
    };
    let kind: ExtraKind = kind.parse()?;
    Ok(Some(Extra {
        kind,
        description: description.unwrap_or_default().to_string(),
    }))
}

/// Parses a decimal hour count (e.g. `2.5`) into whole minutes.
///
/// Durations are carried as whole minutes throughout; anything finer
/// is rejected rather than rounded.
#[allow(clippy::cast_possible_truncation)]
pub fn parse_hours_to_minutes(text: &str) -> Result<i64> {
    let hours: f64 = text
        .parse()
        .with_context(|| format!("invalid hours '{text}'"))?;
    if !hours.is_finite() {
        bail!("invalid hours '{text}'");
    }
    let minutes = hours * 60.0;
    let rounded = minutes.round();
    if (minutes - rounded).abs() > 1e-6 {
        bail!("hours '{text}' is finer than one minute");
    }
    Ok(rounded as i64)
}

/// Formats whole minutes as decimal hours with two decimals.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_hours(minutes: i64) -> String {
    format!("{:.2}", minutes as f64 / 60.0)
}

/// One-line description of an entry for command output.
#[must_use]
pub fn describe(entry: &TimeEntry) -> String {
    let range = entry
        .segment()
        .map_or_else(|| "regularization".to_string(), |s| s.to_string());
    let mut text = format!(
        "{range} ({} h, task {})",
        format_hours(entry.minutes),
        entry.task
    );
    if let Some(extra) = &entry.extra {
        text.push_str(&format!(" [extra/{}]", extra.kind));
    }
    text
}
