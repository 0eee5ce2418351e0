//! Canonical weekday and frequency identifiers together with the two display
//! label sets (Thai, English) seen in stored documents.
//!
//! Labels are only ever used at the edges: parsing a stored key or rendering
//! one. Comparisons and lookups go through [`Day`] and [`Frequency`].

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    /// Days covered by the normalized schema's "every day" form.
    pub const WORKWEEK: [Day; 5] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn label(self, labels: LabelSet) -> &'static str {
        match labels {
            LabelSet::Thai => THAI_DAYS[self.index()],
            LabelSet::English => ENGLISH_DAYS[self.index()],
        }
    }

    /// Upper-case identifier used by the normalized collections (`MONDAY`).
    pub fn enum_value(self) -> &'static str {
        ENUM_DAYS[self.index()]
    }

    pub fn parse(label: &str) -> Option<Day> {
        match DayKey::parse(label)? {
            DayKey::Day(day) => Some(day),
            DayKey::Everyday => None,
        }
    }
}

impl From<chrono::Weekday> for Day {
    fn from(weekday: chrono::Weekday) -> Self {
        Day::ALL[weekday.num_days_from_monday() as usize]
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label(LabelSet::English))
    }
}

/// Key of a legacy `days` mapping: a weekday or the "every day" sentinel.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DayKey {
    Day(Day),
    Everyday,
}

impl DayKey {
    pub fn parse(label: &str) -> Option<DayKey> {
        if label == THAI_EVERYDAY || label.eq_ignore_ascii_case(ENGLISH_EVERYDAY) {
            return Some(DayKey::Everyday);
        }
        if let Some(pos) = THAI_DAYS.iter().position(|d| *d == label) {
            return Some(DayKey::Day(Day::ALL[pos]));
        }
        ENGLISH_DAYS
            .iter()
            .zip(ENGLISH_SHORT_DAYS)
            .position(|(long, short)| {
                label.eq_ignore_ascii_case(long) || label.eq_ignore_ascii_case(short)
            })
            .map(|pos| DayKey::Day(Day::ALL[pos]))
    }

    pub fn label(self, labels: LabelSet) -> &'static str {
        match (self, labels) {
            (DayKey::Day(day), _) => day.label(labels),
            (DayKey::Everyday, LabelSet::Thai) => THAI_EVERYDAY,
            (DayKey::Everyday, LabelSet::English) => ENGLISH_EVERYDAY,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Everyday,
    EveryOtherDay,
    SpecificDays,
    DateRange,
}

impl Frequency {
    const ALL: [Frequency; 4] = [
        Frequency::Everyday,
        Frequency::EveryOtherDay,
        Frequency::SpecificDays,
        Frequency::DateRange,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn label(self, labels: LabelSet) -> &'static str {
        match labels {
            LabelSet::Thai => THAI_FREQUENCIES[self.index()],
            LabelSet::English => ENGLISH_FREQUENCIES[self.index()],
        }
    }

    pub fn parse(label: &str) -> Option<Frequency> {
        let pos = THAI_FREQUENCIES
            .iter()
            .position(|f| *f == label)
            .or_else(|| {
                ENGLISH_FREQUENCIES
                    .iter()
                    .position(|f| label.eq_ignore_ascii_case(f))
            })?;
        Some(Frequency::ALL[pos])
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label(LabelSet::English))
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum LabelSet {
    #[default]
    Thai,
    English,
}

const THAI_DAYS: [&str; 7] = [
    "จันทร์",
    "อังคาร",
    "พุธ",
    "พฤหัสบดี",
    "ศุกร์",
    "เสาร์",
    "อาทิตย์",
];
const ENGLISH_DAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];
const ENGLISH_SHORT_DAYS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];
const ENUM_DAYS: [&str; 7] = [
    "MONDAY",
    "TUESDAY",
    "WEDNESDAY",
    "THURSDAY",
    "FRIDAY",
    "SATURDAY",
    "SUNDAY",
];

const THAI_EVERYDAY: &str = "ทุกวัน";
const ENGLISH_EVERYDAY: &str = "everyday";

const THAI_FREQUENCIES: [&str; 4] = ["ทุกวัน", "วันเว้นวัน", "เฉพาะบางวัน", "ช่วงวันที่"];
const ENGLISH_FREQUENCIES: [&str; 4] = ["everyday", "every_other_day", "specific_days", "date_range"];
