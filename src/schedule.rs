//! Opening hours of a store.
//!
//! A [`Schedule`] wraps one [`RecurrenceRule`] and resolves it to the set of
//! weekdays the store opens on. It can be read from and written to both stored
//! representations: the legacy frequency form (`frequency` + `days` object)
//! and the normalized flat list of `{dayOfWeek, start, end}` records.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
    constants::{hm, DATE_FORMAT, DEFAULT_CLOSING, DEFAULT_OPENING},
    data_types::{
        legacy_data_types::{LegacyDays, LegacyOpeningHours, LegacyTimeRange},
        normalized_data_types::NormalizedHours,
        time_range::TimeRange,
        vocabulary::{Day, DayKey, Frequency, LabelSet},
    },
    errors::{CatalogError, Result},
};

/// Weekday -> hours. A missing day means closed.
pub type ResolvedHours = BTreeMap<Day, TimeRange>;

/// Which days an "every day" rule covers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DaySpan {
    /// Monday to Sunday, as written by the embedded schema.
    Week,
    /// Monday to Friday, as written by the normalized schema.
    Workweek,
}

impl DaySpan {
    pub fn days(self) -> &'static [Day] {
        match self {
            DaySpan::Week => &Day::ALL,
            DaySpan::Workweek => &Day::WORKWEEK,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "frequency", rename_all = "snake_case")]
pub enum RecurrenceRule {
    Everyday {
        hours: TimeRange,
        span: DaySpan,
    },
    /// Resolves exactly like `Everyday`. The flag is kept so it survives a
    /// round trip; no alternating-day logic is applied.
    EveryOtherDay {
        hours: TimeRange,
        span: DaySpan,
    },
    SpecificDays {
        days: ResolvedHours,
    },
    /// Hours for every weekday, valid between two dates (inclusive).
    DateRange {
        start_date: NaiveDate,
        end_date: NaiveDate,
        days: ResolvedHours,
    },
}

impl RecurrenceRule {
    pub fn frequency(&self) -> Frequency {
        match self {
            RecurrenceRule::Everyday { .. } => Frequency::Everyday,
            RecurrenceRule::EveryOtherDay { .. } => Frequency::EveryOtherDay,
            RecurrenceRule::SpecificDays { .. } => Frequency::SpecificDays,
            RecurrenceRule::DateRange { .. } => Frequency::DateRange,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RecurrenceRule", into = "RecurrenceRule")]
pub struct Schedule {
    rule: RecurrenceRule,
}

impl Schedule {
    pub fn new(rule: RecurrenceRule) -> Result<Self> {
        if let RecurrenceRule::DateRange {
            start_date,
            end_date,
            days,
        } = &rule
        {
            if let Some(missing) = Day::ALL.iter().find(|day| !days.contains_key(*day)) {
                return Err(CatalogError::Schema(format!(
                    "date range schedule has no hours for {missing}"
                )));
            }
            if end_date < start_date {
                // accepted, the form only warns about it
                log::warn!("Date range {start_date} - {end_date} ends before it starts");
            }
        }
        Ok(Schedule { rule })
    }

    pub fn everyday(hours: TimeRange) -> Self {
        Schedule {
            rule: RecurrenceRule::Everyday {
                hours,
                span: DaySpan::Week,
            },
        }
    }

    pub fn specific_days(days: ResolvedHours) -> Self {
        Schedule {
            rule: RecurrenceRule::SpecificDays { days },
        }
    }

    pub fn rule(&self) -> &RecurrenceRule {
        &self.rule
    }

    pub fn frequency(&self) -> Frequency {
        self.rule.frequency()
    }

    pub fn resolve(&self) -> ResolvedHours {
        match &self.rule {
            RecurrenceRule::Everyday { hours, span }
            | RecurrenceRule::EveryOtherDay { hours, span } => {
                span.days().iter().map(|day| (*day, *hours)).collect()
            }
            RecurrenceRule::SpecificDays { days } | RecurrenceRule::DateRange { days, .. } => {
                days.clone()
            }
        }
    }

    pub fn hours_for(&self, day: Day) -> Option<TimeRange> {
        self.resolve().get(&day).copied()
    }

    /// Hours on a calendar date. Outside a date range's window the store is closed.
    pub fn hours_on(&self, date: NaiveDate) -> Option<TimeRange> {
        if let Some((start, end)) = self.validity_window() {
            if date < start || date > end {
                return None;
            }
        }
        self.hours_for(Day::from(date.weekday()))
    }

    pub fn validity_window(&self) -> Option<(NaiveDate, NaiveDate)> {
        match &self.rule {
            RecurrenceRule::DateRange {
                start_date,
                end_date,
                ..
            } => Some((*start_date, *end_date)),
            _ => None,
        }
    }

    pub fn from_legacy(legacy: &LegacyOpeningHours) -> Result<Self> {
        let frequency = Frequency::parse(&legacy.frequency).ok_or_else(|| {
            CatalogError::Schema(format!("unknown frequency '{}'", legacy.frequency))
        })?;

        let mut everyday_hours = None;
        let mut days = ResolvedHours::new();
        for (label, range) in &legacy.days.0 {
            let hours = TimeRange::parse(&range.start_time, &range.end_time)?;
            match DayKey::parse(label) {
                Some(DayKey::Everyday) => everyday_hours = Some(hours),
                Some(DayKey::Day(day)) => insert_unique(&mut days, day, hours)?,
                None => {
                    return Err(CatalogError::Schema(format!("unknown day '{label}'")));
                }
            }
        }

        let rule = match frequency {
            Frequency::Everyday | Frequency::EveryOtherDay => {
                let hours = everyday_hours.ok_or_else(|| {
                    CatalogError::Schema(format!(
                        "'{}' opening hours without an every-day entry",
                        legacy.frequency
                    ))
                })?;
                let span = DaySpan::Week;
                if frequency == Frequency::Everyday {
                    RecurrenceRule::Everyday { hours, span }
                } else {
                    RecurrenceRule::EveryOtherDay { hours, span }
                }
            }
            Frequency::SpecificDays => RecurrenceRule::SpecificDays { days },
            Frequency::DateRange => RecurrenceRule::DateRange {
                start_date: parse_date(legacy.start_date.as_deref(), "start_date")?,
                end_date: parse_date(legacy.end_date.as_deref(), "end_date")?,
                days,
            },
        };

        Schedule::new(rule)
    }

    pub fn to_legacy(&self, labels: LabelSet) -> LegacyOpeningHours {
        let everyday = |frequency: Frequency, hours: &TimeRange| LegacyOpeningHours {
            frequency: frequency.label(labels).to_string(),
            days: LegacyDays(vec![(
                DayKey::Everyday.label(labels).to_string(),
                legacy_range(hours),
            )]),
            start_date: None,
            end_date: None,
        };

        match &self.rule {
            RecurrenceRule::Everyday {
                hours,
                span: DaySpan::Week,
            } => everyday(Frequency::Everyday, hours),
            RecurrenceRule::EveryOtherDay {
                hours,
                span: DaySpan::Week,
            } => everyday(Frequency::EveryOtherDay, hours),
            // the embedded schema's "every day" means all seven days
            RecurrenceRule::Everyday { .. }
            | RecurrenceRule::EveryOtherDay { .. }
            | RecurrenceRule::SpecificDays { .. } => LegacyOpeningHours {
                frequency: Frequency::SpecificDays.label(labels).to_string(),
                days: legacy_days(&self.resolve(), labels),
                start_date: None,
                end_date: None,
            },
            RecurrenceRule::DateRange {
                start_date,
                end_date,
                days,
            } => LegacyOpeningHours {
                frequency: Frequency::DateRange.label(labels).to_string(),
                days: legacy_days(days, labels),
                start_date: Some(start_date.format(DATE_FORMAT).to_string()),
                end_date: Some(end_date.format(DATE_FORMAT).to_string()),
            },
        }
    }

    /// Flat per-day records, Monday first, closed days omitted.
    ///
    /// A date range's validity window has no place in this form and is dropped.
    pub fn to_normalized(&self) -> Vec<NormalizedHours> {
        if let Some((start, end)) = self.validity_window() {
            log::warn!("Dropping validity window {start} - {end} when flattening opening hours");
        }
        self.resolve()
            .into_iter()
            .map(|(day, hours)| NormalizedHours {
                day_of_week: day.enum_value().to_string(),
                start: hours.start_text(),
                end: hours.end_text(),
            })
            .collect()
    }

    pub fn from_normalized(records: &[NormalizedHours]) -> Result<Self> {
        let mut days = ResolvedHours::new();
        for record in records {
            let day = Day::parse(&record.day_of_week).ok_or_else(|| {
                CatalogError::Schema(format!("unknown day '{}'", record.day_of_week))
            })?;
            insert_unique(&mut days, day, TimeRange::parse(&record.start, &record.end)?)?;
        }

        for span in [DaySpan::Week, DaySpan::Workweek] {
            if let Some(hours) = uniform_hours(&days, span) {
                return Ok(Schedule {
                    rule: RecurrenceRule::Everyday { hours, span },
                });
            }
        }
        Ok(Schedule::specific_days(days))
    }

    /// Frequency the flat records cannot express, stored beside them.
    pub fn normalized_tag(&self) -> Option<Frequency> {
        matches!(self.rule, RecurrenceRule::EveryOtherDay { .. }).then_some(Frequency::EveryOtherDay)
    }

    /// Re-applies a tag written from [`Schedule::normalized_tag`].
    pub fn with_normalized_tag(self, tag: Option<Frequency>) -> Self {
        match (tag, self.rule) {
            (Some(Frequency::EveryOtherDay), RecurrenceRule::Everyday { hours, span }) => Schedule {
                rule: RecurrenceRule::EveryOtherDay { hours, span },
            },
            (Some(tag), rule) if tag != rule.frequency() => {
                log::warn!("Ignoring '{tag}' tag on opening hours that read as '{}'", rule.frequency());
                Schedule { rule }
            }
            (_, rule) => Schedule { rule },
        }
    }
}

impl Default for Schedule {
    fn default() -> Self {
        // DEFAULT_OPENING is before DEFAULT_CLOSING
        let hours = TimeRange::new(hm(DEFAULT_OPENING), hm(DEFAULT_CLOSING))
            .unwrap_or_else(|_| unreachable!());
        Schedule::everyday(hours)
    }
}

impl TryFrom<RecurrenceRule> for Schedule {
    type Error = CatalogError;

    fn try_from(rule: RecurrenceRule) -> Result<Self> {
        Schedule::new(rule)
    }
}

impl From<Schedule> for RecurrenceRule {
    fn from(schedule: Schedule) -> Self {
        schedule.rule
    }
}

/// The shared hours if `days` covers exactly the span's days with one range.
fn uniform_hours(days: &ResolvedHours, span: DaySpan) -> Option<TimeRange> {
    let expected = span.days();
    if days.len() != expected.len() || !expected.iter().all(|day| days.contains_key(day)) {
        return None;
    }
    let first = *days.values().next()?;
    days.values().all(|hours| *hours == first).then_some(first)
}

fn insert_unique(days: &mut ResolvedHours, day: Day, hours: TimeRange) -> Result<()> {
    match days.insert(day, hours) {
        Some(previous) if previous != hours => Err(CatalogError::Schema(format!(
            "conflicting hours for {day}: {previous} and {hours}"
        ))),
        _ => Ok(()),
    }
}

fn parse_date(text: Option<&str>, field: &str) -> Result<NaiveDate> {
    let text =
        text.ok_or_else(|| CatalogError::Schema(format!("date range without '{field}'")))?;
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map_err(|_| CatalogError::InvalidTime(text.to_string()))
}

fn legacy_range(hours: &TimeRange) -> LegacyTimeRange {
    LegacyTimeRange {
        start_time: hours.start_text(),
        end_time: hours.end_text(),
    }
}

fn legacy_days(days: &ResolvedHours, labels: LabelSet) -> LegacyDays {
    LegacyDays(
        days.iter()
            .map(|(day, hours)| (day.label(labels).to_string(), legacy_range(hours)))
            .collect(),
    )
}
