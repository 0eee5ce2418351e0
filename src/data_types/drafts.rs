//! Values collected by a form before they are accepted into the catalog.
//!
//! A draft is created fresh (`Default`) or from an existing record
//! (`for_edit`), filled in by the caller and handed to a catalog operation,
//! which consumes it.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::{
    constants::{hm, DEFAULT_BUSY_END, DEFAULT_BUSY_START, DEFAULT_CLOSING, DEFAULT_OPENING},
    data_types::{
        time_range::TimeRange,
        vocabulary::{Day, Frequency},
        Canteen, Category, FoodItem, Prices, Store,
    },
    errors::{CatalogError, Result},
    schedule::{DaySpan, RecurrenceRule, Schedule},
};

#[derive(Debug, Clone, PartialEq)]
pub struct CanteenDraft {
    pub name: String,
    pub busy_periods: Vec<TimeRange>,
    pub with_air_conditioning: bool,
}

impl Default for CanteenDraft {
    fn default() -> Self {
        CanteenDraft {
            name: String::new(),
            busy_periods: TimeRange::new(hm(DEFAULT_BUSY_START), hm(DEFAULT_BUSY_END))
                .into_iter()
                .collect(),
            with_air_conditioning: false,
        }
    }
}

impl CanteenDraft {
    pub fn for_edit(canteen: &Canteen) -> Self {
        CanteenDraft {
            name: canteen.name.clone(),
            busy_periods: canteen.busy_periods.clone(),
            with_air_conditioning: canteen.with_air_conditioning,
        }
    }
}

/// Raw form input for a store. Hours are kept as plain `(start, end)` pairs so
/// an inverted pair is reported when the draft is submitted, not while typing.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreDraft {
    pub name: String,
    pub description: Option<String>,
    pub frequency: Frequency,
    /// Used by `Everyday` and `EveryOtherDay`.
    pub everyday_hours: (chrono::NaiveTime, chrono::NaiveTime),
    /// Selected days for `SpecificDays`; every day for `DateRange`.
    pub day_hours: BTreeMap<Day, (chrono::NaiveTime, chrono::NaiveTime)>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Default for StoreDraft {
    fn default() -> Self {
        StoreDraft {
            name: String::new(),
            description: None,
            frequency: Frequency::Everyday,
            everyday_hours: (hm(DEFAULT_OPENING), hm(DEFAULT_CLOSING)),
            day_hours: BTreeMap::new(),
            start_date: None,
            end_date: None,
        }
    }
}

impl StoreDraft {
    pub fn for_edit(store: &Store) -> Self {
        let mut draft = StoreDraft {
            name: store.name.clone(),
            description: store.description.clone(),
            frequency: store.opening_hours.frequency(),
            ..StoreDraft::default()
        };
        match store.opening_hours.rule() {
            // a form only knows seven-day "every day"; Monday to Friday has to be spelled out
            RecurrenceRule::Everyday {
                hours,
                span: DaySpan::Workweek,
            } => {
                draft.frequency = Frequency::SpecificDays;
                draft.day_hours = Day::WORKWEEK
                    .iter()
                    .map(|day| (*day, (hours.start(), hours.end())))
                    .collect();
            }
            RecurrenceRule::Everyday { hours, .. } | RecurrenceRule::EveryOtherDay { hours, .. } => {
                draft.everyday_hours = (hours.start(), hours.end());
            }
            RecurrenceRule::SpecificDays { days } => {
                draft.day_hours = pairs(days);
            }
            RecurrenceRule::DateRange {
                start_date,
                end_date,
                days,
            } => {
                draft.day_hours = pairs(days);
                draft.start_date = Some(*start_date);
                draft.end_date = Some(*end_date);
            }
        }
        draft
    }

    /// Sets the hours of one day, selecting it if needed.
    pub fn with_day(mut self, day: Day, hours: TimeRange) -> Self {
        self.day_hours.insert(day, (hours.start(), hours.end()));
        self
    }

    /// Validates every time pair and builds the schedule the draft describes.
    pub fn schedule(&self) -> Result<Schedule> {
        let day_ranges = || -> Result<BTreeMap<Day, TimeRange>> {
            self.day_hours
                .iter()
                .map(|(day, (start, end))| Ok((*day, TimeRange::new(*start, *end)?)))
                .collect()
        };

        let rule = match self.frequency {
            Frequency::Everyday => RecurrenceRule::Everyday {
                hours: TimeRange::new(self.everyday_hours.0, self.everyday_hours.1)?,
                span: DaySpan::Week,
            },
            Frequency::EveryOtherDay => RecurrenceRule::EveryOtherDay {
                hours: TimeRange::new(self.everyday_hours.0, self.everyday_hours.1)?,
                span: DaySpan::Week,
            },
            Frequency::SpecificDays => RecurrenceRule::SpecificDays { days: day_ranges()? },
            Frequency::DateRange => {
                let missing_date = || CatalogError::Schema("date range needs both dates".into());
                RecurrenceRule::DateRange {
                    start_date: self.start_date.ok_or_else(missing_date)?,
                    end_date: self.end_date.ok_or_else(missing_date)?,
                    days: day_ranges()?,
                }
            }
        };
        Schedule::new(rule)
    }
}

fn pairs(
    days: &BTreeMap<Day, TimeRange>,
) -> BTreeMap<Day, (chrono::NaiveTime, chrono::NaiveTime)> {
    days.iter()
        .map(|(day, hours)| (*day, (hours.start(), hours.end())))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct FoodItemDraft {
    pub name: String,
    pub normal_price: f64,
    pub special_price: Option<f64>,
    pub description: Option<String>,
    pub category: Option<Category>,
}

impl Default for FoodItemDraft {
    fn default() -> Self {
        FoodItemDraft {
            name: String::new(),
            normal_price: 0.0,
            special_price: None,
            description: None,
            category: None,
        }
    }
}

impl FoodItemDraft {
    pub fn for_edit(item: &FoodItem) -> Self {
        FoodItemDraft {
            name: item.name.clone(),
            normal_price: item.prices.normal,
            special_price: item.prices.special,
            description: item.description.clone(),
            category: item.category,
        }
    }

    pub fn into_food_item(self) -> Result<FoodItem> {
        if self.name.is_empty() {
            return Err(CatalogError::EmptyName("food item"));
        }
        Ok(FoodItem {
            prices: Prices::new(self.normal_price, self.special_price)?,
            name: self.name,
            description: self.description,
            category: self.category,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canteen_draft_defaults_to_lunch_rush() {
        let draft = CanteenDraft::default();
        assert_eq!(draft.busy_periods, vec![TimeRange::from_hm((11, 0), (13, 0)).unwrap()]);
        assert!(!draft.with_air_conditioning);
    }

    #[test]
    fn store_draft_defaults_to_everyday_seven_to_four() {
        let schedule = StoreDraft::default().schedule().unwrap();
        assert_eq!(schedule, Schedule::everyday(TimeRange::from_hm((7, 0), (16, 0)).unwrap()));
    }

    #[test]
    fn inverted_day_hours_are_rejected_on_submit() {
        let mut draft = StoreDraft {
            frequency: Frequency::SpecificDays,
            ..StoreDraft::default()
        };
        draft
            .day_hours
            .insert(Day::Monday, (hm((16, 0)), hm((7, 0))));
        assert!(matches!(draft.schedule(), Err(CatalogError::InvalidRange { .. })));
    }

    #[test]
    fn date_range_draft_needs_dates() {
        let mut draft = StoreDraft {
            frequency: Frequency::DateRange,
            ..StoreDraft::default()
        };
        let hours = TimeRange::from_hm((8, 0), (14, 0)).unwrap();
        for day in Day::ALL {
            draft = draft.with_day(day, hours);
        }
        assert!(matches!(draft.schedule(), Err(CatalogError::Schema(_))));

        draft.start_date = NaiveDate::from_ymd_opt(2024, 6, 1);
        draft.end_date = NaiveDate::from_ymd_opt(2024, 6, 30);
        assert_eq!(draft.schedule().unwrap().resolve().len(), 7);
    }

    #[test]
    fn food_item_draft_validates() {
        assert!(matches!(
            FoodItemDraft::default().into_food_item(),
            Err(CatalogError::EmptyName(_))
        ));
        let draft = FoodItemDraft {
            name: "Pad Thai".to_string(),
            normal_price: -5.0,
            ..FoodItemDraft::default()
        };
        assert!(matches!(draft.into_food_item(), Err(CatalogError::InvalidPrice(_))));
    }

    #[test]
    fn edit_draft_round_trips_store_schedule() {
        let mut days = BTreeMap::new();
        days.insert(Day::Tuesday, TimeRange::from_hm((9, 0), (11, 0)).unwrap());
        let store = Store {
            id: "s1".into(),
            canteen_id: "c1".into(),
            name: "Noodle Shop".to_string(),
            description: None,
            opening_hours: Schedule::specific_days(days),
            food_items: Vec::new(),
        };
        let draft = StoreDraft::for_edit(&store);
        assert_eq!(draft.schedule().unwrap(), store.opening_hours);
    }

    #[test]
    fn workweek_everyday_is_edited_as_weekdays() {
        let hours = TimeRange::from_hm((7, 0), (15, 0)).unwrap();
        let store = Store {
            id: "s2".into(),
            canteen_id: "c1".into(),
            name: "Coffee Bar".to_string(),
            description: None,
            opening_hours: Schedule::new(RecurrenceRule::Everyday {
                hours,
                span: DaySpan::Workweek,
            })
            .unwrap(),
            food_items: Vec::new(),
        };
        let draft = StoreDraft::for_edit(&store);
        assert_eq!(draft.frequency, Frequency::SpecificDays);

        let resolved = draft.schedule().unwrap().resolve();
        assert_eq!(resolved.len(), 5);
        assert!(!resolved.contains_key(&Day::Saturday));
        assert_eq!(resolved[&Day::Friday], hours);
    }
}
