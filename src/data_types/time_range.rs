use std::{fmt, str::FromStr};

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::{
    constants::TIME_FORMAT,
    errors::{CatalogError, Result},
};

/// A wall-clock window with minute resolution. `end` is always after `start`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TimeRangeText", into = "TimeRangeText")]
pub struct TimeRange {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self> {
        let (start, end) = (truncate_to_minute(start), truncate_to_minute(end));
        if end <= start {
            return Err(CatalogError::InvalidRange {
                start: start.format(TIME_FORMAT).to_string(),
                end: end.format(TIME_FORMAT).to_string(),
            });
        }
        Ok(TimeRange { start, end })
    }

    pub fn from_hm(start: (u32, u32), end: (u32, u32)) -> Result<Self> {
        TimeRange::new(hm_time(start)?, hm_time(end)?)
    }

    /// Parses a `"HH:MM"` pair.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        TimeRange::new(parse_time(start)?, parse_time(end)?)
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    pub fn start_text(&self) -> String {
        self.start.format(TIME_FORMAT).to_string()
    }

    pub fn end_text(&self) -> String {
        self.end.format(TIME_FORMAT).to_string()
    }

    /// Half-open: a store closing at 16:00 is closed at 16:00.
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time < self.end
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_text(), self.end_text())
    }
}

/// `"07:00-16:00"`
impl FromStr for TimeRange {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| CatalogError::InvalidTime(s.to_string()))?;
        TimeRange::parse(start.trim(), end.trim())
    }
}

pub fn parse_time(text: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(text, TIME_FORMAT)
        .map_err(|_| CatalogError::InvalidTime(text.to_string()))
}

fn hm_time((hour, minute): (u32, u32)) -> Result<NaiveTime> {
    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| CatalogError::InvalidTime(format!("{hour:02}:{minute:02}")))
}

fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

/// Serialized shape shared by the canonical model and the export.
#[derive(Serialize, Deserialize)]
struct TimeRangeText {
    start: String,
    end: String,
}

impl TryFrom<TimeRangeText> for TimeRange {
    type Error = CatalogError;

    fn try_from(text: TimeRangeText) -> Result<Self> {
        TimeRange::parse(&text.start, &text.end)
    }
}

impl From<TimeRange> for TimeRangeText {
    fn from(range: TimeRange) -> Self {
        TimeRangeText {
            start: range.start_text(),
            end: range.end_text(),
        }
    }
}
