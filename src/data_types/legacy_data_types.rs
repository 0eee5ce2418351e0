//! Documents of the embedded schema: one JSON array of canteens, each holding
//! its stores, each store holding its food items.

use std::fmt;

use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LegacyCanteen {
    pub id: LegacyId,
    pub canteen_name: String,
    /// Oldest revisions carry exactly one busy window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub busy_hours: Option<LegacyTimeRange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub busy_periods: Vec<LegacyTimeRange>,
    #[serde(default)]
    pub with_airconditioning: bool,
    #[serde(default)]
    pub stores: Vec<LegacyStore>,
}

/// Integer ids come from the file era, text ids from anything written later.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum LegacyId {
    Number(u64),
    Text(String),
}

impl LegacyId {
    /// Numbers only when they print back to the same text, so "007" stays text.
    pub fn from_text(id: &str) -> Self {
        match id.parse::<u64>() {
            Ok(number) if number.to_string() == id => LegacyId::Number(number),
            _ => LegacyId::Text(id.to_string()),
        }
    }
}

impl fmt::Display for LegacyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegacyId::Number(n) => write!(f, "{n}"),
            LegacyId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LegacyTimeRange {
    pub start_time: String,
    pub end_time: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LegacyStore {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<LegacyOpeningHours>,
    #[serde(default)]
    pub food_items: Vec<LegacyFoodItem>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LegacyOpeningHours {
    pub frequency: String,
    #[serde(default)]
    pub days: LegacyDays,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// The `days` object, kept in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyDays(pub Vec<(String, LegacyTimeRange)>);

impl Serialize for LegacyDays {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (day, hours) in &self.0 {
            map.serialize_entry(day, hours)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LegacyDays {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DaysVisitor;

        impl<'de> Visitor<'de> for DaysVisitor {
            type Value = LegacyDays;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of day names to opening hours")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<LegacyDays, A::Error> {
                let mut days = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, LegacyTimeRange>()? {
                    days.push(entry);
                }
                Ok(LegacyDays(days))
            }
        }

        deserializer.deserialize_map(DaysVisitor)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LegacyFoodItem {
    pub name: String,
    pub prices: LegacyPrices,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LegacyPrices {
    pub normal: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special: Option<f64>,
}
