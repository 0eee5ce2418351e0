//! Documents of the normalized schema: separate canteen and store collections,
//! stores pointing back at their canteen, English enum values.

use serde::{Deserialize, Serialize};

use crate::data_types::vocabulary::Frequency;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedCanteen {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub busy_periods: Vec<NormalizedTimeRange>,
    #[serde(default)]
    pub with_air_conditioning: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NormalizedTimeRange {
    pub start: String,
    pub end: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedStore {
    #[serde(rename = "_id")]
    pub id: String,
    pub canteen_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub opening_hours: Vec<NormalizedHours>,
    /// Only present when the records alone would lose the rule's kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
    #[serde(default)]
    pub menu: Vec<NormalizedFoodItem>,
}

/// One weekday on which a store opens.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedHours {
    pub day_of_week: String,
    pub start: String,
    pub end: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedFoodItem {
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}
