//! JSON download of the catalog, without internal ids.

use serde::Serialize;

use crate::{
    data_backend::to_pretty_json,
    data_types::{time_range::TimeRange, Canteen, Category, FoodItem, Store},
    schedule::Schedule,
};

#[derive(Serialize)]
struct ExportCanteen<'a> {
    name: &'a str,
    busy_periods: &'a [TimeRange],
    with_air_conditioning: bool,
    stores: Vec<ExportStore<'a>>,
}

#[derive(Serialize)]
struct ExportStore<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    opening_hours: &'a Schedule,
    food_items: Vec<ExportFoodItem<'a>>,
}

#[derive(Serialize)]
struct ExportFoodItem<'a> {
    name: &'a str,
    normal_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    special_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<Category>,
}

impl<'a> From<&'a Canteen> for ExportCanteen<'a> {
    fn from(canteen: &'a Canteen) -> Self {
        ExportCanteen {
            name: &canteen.name,
            busy_periods: &canteen.busy_periods,
            with_air_conditioning: canteen.with_air_conditioning,
            stores: canteen.stores.iter().map(ExportStore::from).collect(),
        }
    }
}

impl<'a> From<&'a Store> for ExportStore<'a> {
    fn from(store: &'a Store) -> Self {
        ExportStore {
            name: &store.name,
            description: store.description.as_deref(),
            opening_hours: &store.opening_hours,
            food_items: store.food_items.iter().map(ExportFoodItem::from).collect(),
        }
    }
}

impl<'a> From<&'a FoodItem> for ExportFoodItem<'a> {
    fn from(item: &'a FoodItem) -> Self {
        ExportFoodItem {
            name: &item.name,
            normal_price: item.prices.normal,
            special_price: item.prices.special,
            description: item.description.as_deref(),
            category: item.category,
        }
    }
}

pub fn export_json(canteens: &[Canteen]) -> serde_json::Result<String> {
    let export: Vec<ExportCanteen> = canteens.iter().map(ExportCanteen::from).collect();
    to_pretty_json(&export)
}
