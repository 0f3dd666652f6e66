//! Wall-clock time segments ("tramos") at minute resolution.
//!
//! A segment is a half-open interval `[start, end)` of minutes since
//! midnight within one calendar day. Durations are carried as whole
//! minutes everywhere; decimal hours are a display concern.
//!
//! Segments never cross midnight. The source systems this replaces
//! disagreed on what a backwards range meant (wrap by 24h, clamp to
//! zero, or store a negative total), so construction rejects any
//! segment whose end is not strictly after its start.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of minutes in a calendar day; valid minutes are `0..MINUTES_PER_DAY`.
pub const MINUTES_PER_DAY: u16 = 1440;

/// Errors raised when constructing or parsing a [`TimeSegment`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SegmentError {
    /// A minute value outside `[0, 1439]`.
    #[error("minute {minute} is outside the day (0-1439)")]
    OutOfRange { minute: u16 },

    /// The segment is empty or runs backwards (`end <= start`).
    #[error("segment end (minute {end}) must be after its start (minute {start})")]
    Inverted { start: u16, end: u16 },

    /// Malformed `HH:MM-HH:MM` text.
    #[error("invalid time range '{text}', expected HH:MM-HH:MM")]
    Parse { text: String },
}

/// One contiguous start/end time range worked within a single day.
///
/// Immutable once constructed; the constructor guarantees both bounds
/// are in range and the interval is non-empty.
///
/// Serializes as `"HH:MM-HH:MM"`, the schedule text format used by the
/// surrounding systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSegment {
    start_minute: u16,
    end_minute: u16,
}

impl TimeSegment {
    /// Creates a segment from minutes since midnight.
    ///
    /// Fails if either bound is outside the day or if `end <= start`.
    pub fn new(start_minute: u16, end_minute: u16) -> Result<Self, SegmentError> {
        for minute in [start_minute, end_minute] {
            if minute >= MINUTES_PER_DAY {
                return Err(SegmentError::OutOfRange { minute });
            }
        }
        if end_minute <= start_minute {
            return Err(SegmentError::Inverted {
                start: start_minute,
                end: end_minute,
            });
        }
        Ok(Self {
            start_minute,
            end_minute,
        })
    }

    /// Minutes since midnight at which the segment starts (inclusive).
    #[must_use]
    pub const fn start_minute(self) -> u16 {
        self.start_minute
    }

    /// Minutes since midnight at which the segment ends (exclusive).
    #[must_use]
    pub const fn end_minute(self) -> u16 {
        self.end_minute
    }

    /// Duration in whole minutes. Always positive.
    #[must_use]
    pub const fn minutes(self) -> i64 {
        self.end_minute as i64 - self.start_minute as i64
    }

    /// Duration in hours, for display.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hours(self) -> f64 {
        self.minutes() as f64 / 60.0
    }

    /// Whether two half-open intervals intersect.
    ///
    /// Touching endpoints (one segment ending exactly where another
    /// starts) do not count as overlap.
    #[must_use]
    pub const fn overlaps(self, other: Self) -> bool {
        self.start_minute < other.end_minute && self.end_minute > other.start_minute
    }
}

/// Sums the durations of a batch of segments, in whole minutes.
#[must_use]
pub fn total_minutes(segments: &[TimeSegment]) -> i64 {
    segments.iter().map(|s| s.minutes()).sum()
}

/// Parses a comma-separated schedule like `"08:00-12:00,14:00-18:00"`.
pub fn parse_schedule(text: &str) -> Result<Vec<TimeSegment>, SegmentError> {
    text.split(',').map(|part| part.trim().parse()).collect()
}

/// Parses `"HH:MM"` into minutes since midnight.
fn parse_minute_of_day(text: &str) -> Option<u16> {
    let (hours, minutes) = text.split_once(':')?;
    let hours: u16 = hours.parse().ok()?;
    let minutes: u16 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

impl FromStr for TimeSegment {
    type Err = SegmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_err = || SegmentError::Parse {
            text: s.to_string(),
        };
        let (start, end) = s.split_once('-').ok_or_else(parse_err)?;
        let start_minute = parse_minute_of_day(start.trim()).ok_or_else(parse_err)?;
        let end_minute = parse_minute_of_day(end.trim()).ok_or_else(parse_err)?;
        Self::new(start_minute, end_minute)
    }
}

impl TryFrom<String> for TimeSegment {
    type Error = SegmentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeSegment> for String {
    fn from(segment: TimeSegment) -> Self {
        segment.to_string()
    }
}

impl fmt::Display for TimeSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start_minute / 60,
            self.start_minute % 60,
            self.end_minute / 60,
            self.end_minute % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: u16, end: u16) -> TimeSegment {
        TimeSegment::new(start, end).unwrap()
    }

    #[test]
    fn minutes_is_end_minus_start() {
        assert_eq!(seg(480, 720).minutes(), 240); // 08:00-12:00
        assert_eq!(seg(0, 1439).minutes(), 1439);
        assert_eq!(seg(690, 780).minutes(), 90); // 11:30-13:00
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn hours_divides_by_sixty() {
        assert_eq!(seg(480, 720).hours(), 4.0);
        assert_eq!(seg(480, 510).hours(), 0.5);
    }

    #[test]
    fn zero_length_segment_is_invalid() {
        // 09:00-09:00
        assert_eq!(
            TimeSegment::new(540, 540),
            Err(SegmentError::Inverted { start: 540, end: 540 })
        );
    }

    #[test]
    fn backwards_segment_is_invalid() {
        // 22:00-02:00 is not treated as crossing midnight
        assert_eq!(
            TimeSegment::new(1320, 120),
            Err(SegmentError::Inverted { start: 1320, end: 120 })
        );
    }

    #[test]
    fn out_of_range_minute_is_invalid() {
        assert_eq!(
            TimeSegment::new(0, 1440),
            Err(SegmentError::OutOfRange { minute: 1440 })
        );
        assert_eq!(
            TimeSegment::new(2000, 2001),
            Err(SegmentError::OutOfRange { minute: 2000 })
        );
    }

    #[test]
    fn total_minutes_sums_batch() {
        let segments = [seg(480, 720), seg(840, 1080)]; // 4h + 4h
        assert_eq!(total_minutes(&segments), 480);
        assert_eq!(total_minutes(&[]), 0);
    }

    #[test]
    fn overlap_is_half_open() {
        let morning = seg(480, 720); // 08:00-12:00
        assert!(morning.overlaps(seg(690, 780))); // 11:30-13:00
        assert!(!morning.overlaps(seg(720, 780))); // 12:00-13:00 touches
        assert!(!morning.overlaps(seg(420, 480))); // 07:00-08:00 touches
        assert!(morning.overlaps(seg(0, 1439))); // containment
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = seg(480, 720);
        let b = seg(690, 780);
        assert_eq!(a.overlaps(b), b.overlaps(a));

        let c = seg(720, 780);
        assert_eq!(a.overlaps(c), c.overlaps(a));
    }

    #[test]
    fn parses_schedule_text() {
        let segment: TimeSegment = "08:00-12:00".parse().unwrap();
        assert_eq!(segment, seg(480, 720));

        let segment: TimeSegment = "8:05-9:00".parse().unwrap();
        assert_eq!(segment, seg(485, 540));
    }

    #[test]
    fn parse_rejects_malformed_text() {
        for text in ["", "08:00", "08:00/12:00", "8h-12h", "25:00-26:00", "08:61-09:00"] {
            let result: Result<TimeSegment, _> = text.parse();
            assert!(
                matches!(result, Err(SegmentError::Parse { .. })),
                "expected parse error for {text:?}"
            );
        }
    }

    #[test]
    fn parse_rejects_backwards_range_as_inverted() {
        let result: Result<TimeSegment, _> = "12:00-08:00".parse();
        assert_eq!(
            result,
            Err(SegmentError::Inverted { start: 720, end: 480 })
        );
    }

    #[test]
    fn parses_comma_separated_schedule() {
        let segments = parse_schedule("08:00-12:00,14:00-18:00").unwrap();
        assert_eq!(segments, vec![seg(480, 720), seg(840, 1080)]);
    }

    #[test]
    fn schedule_with_bad_part_fails() {
        assert!(parse_schedule("08:00-12:00,bogus").is_err());
    }

    #[test]
    fn displays_zero_padded() {
        assert_eq!(seg(480, 720).to_string(), "08:00-12:00");
        assert_eq!(seg(485, 540).to_string(), "08:05-09:00");
    }

    #[test]
    fn serde_uses_schedule_text() {
        let segment = seg(480, 720);
        let json = serde_json::to_string(&segment).unwrap();
        assert_eq!(json, "\"08:00-12:00\"");
        let parsed: TimeSegment = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, segment);
    }

    #[test]
    fn serde_rejects_invalid_text() {
        let result: Result<TimeSegment, _> = serde_json::from_str("\"12:00-08:00\"");
        assert!(result.is_err());
    }
}
