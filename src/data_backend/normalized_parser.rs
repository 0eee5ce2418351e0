use crate::data_backend::{in_context, legacy_parser::parse_category};
use crate::data_types::{
    normalized_data_types::{NormalizedCanteen, NormalizedFoodItem, NormalizedStore, NormalizedTimeRange},
    time_range::TimeRange,
    Canteen, EntityId, FoodItem, Prices, Store,
};
use crate::errors::Result;
use crate::schedule::Schedule;

/// Stores are attached later from the store collection.
pub fn canteen_from_normalized(doc: NormalizedCanteen) -> Result<Canteen> {
    let busy_periods = doc
        .busy_periods
        .iter()
        .map(|range| TimeRange::parse(&range.start, &range.end))
        .collect::<Result<Vec<_>>>()
        .map_err(|e| in_context("canteen", &doc.name, e))?;

    Ok(Canteen {
        id: EntityId::from(doc.id),
        name: doc.name,
        busy_periods,
        with_air_conditioning: doc.with_air_conditioning,
        stores: Vec::new(),
    })
}

pub fn store_from_normalized(doc: NormalizedStore) -> Result<Store> {
    let opening_hours = Schedule::from_normalized(&doc.opening_hours)
        .map_err(|e| in_context("store", &doc.name, e))?
        .with_normalized_tag(doc.frequency);

    let food_items = doc
        .menu
        .into_iter()
        .map(|item| {
            Ok(FoodItem {
                prices: Prices::new(item.price, item.special_price)?,
                category: parse_category(item.category.as_deref(), &item.name),
                name: item.name,
                description: item.description,
            })
        })
        .collect::<Result<Vec<_>>>()
        .map_err(|e| in_context("store", &doc.name, e))?;

    Ok(Store {
        id: EntityId::from(doc.id),
        canteen_id: EntityId::from(doc.canteen_id),
        name: doc.name,
        description: doc.description,
        opening_hours,
        food_items,
    })
}

pub fn canteen_to_normalized(canteen: &Canteen) -> NormalizedCanteen {
    NormalizedCanteen {
        id: canteen.id.to_string(),
        name: canteen.name.clone(),
        busy_periods: canteen
            .busy_periods
            .iter()
            .map(|range| NormalizedTimeRange {
                start: range.start_text(),
                end: range.end_text(),
            })
            .collect(),
        with_air_conditioning: canteen.with_air_conditioning,
    }
}

pub fn store_to_normalized(store: &Store) -> NormalizedStore {
    NormalizedStore {
        id: store.id.to_string(),
        canteen_id: store.canteen_id.to_string(),
        name: store.name.clone(),
        description: store.description.clone(),
        opening_hours: store.opening_hours.to_normalized(),
        frequency: store.opening_hours.normalized_tag(),
        menu: store
            .food_items
            .iter()
            .map(|item| NormalizedFoodItem {
                name: item.name.clone(),
                price: item.prices.normal,
                special_price: item.prices.special,
                description: item.description.clone(),
                category: item.category.map(|c| c.as_str().to_string()),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::{
        vocabulary::{Day, Frequency},
        Category,
    };
    use crate::errors::CatalogError;

    fn store_doc() -> NormalizedStore {
        serde_json::from_value(serde_json::json!({
            "_id": "665f1c",
            "canteenId": "665f00",
            "name": "Noodle Shop",
            "openingHours": [
                {"dayOfWeek": "MONDAY", "start": "07:00", "end": "16:00"},
                {"dayOfWeek": "TUESDAY", "start": "07:00", "end": "16:00"},
                {"dayOfWeek": "WEDNESDAY", "start": "07:00", "end": "16:00"},
                {"dayOfWeek": "THURSDAY", "start": "07:00", "end": "16:00"},
                {"dayOfWeek": "FRIDAY", "start": "07:00", "end": "16:00"}
            ],
            "menu": [
                {"name": "Pad Thai", "price": 50.0, "category": "MAIN"},
                {"name": "Thai Tea", "price": 25.0, "category": "DRINK"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn reads_store_collection_document() {
        let store = store_from_normalized(store_doc()).unwrap();
        assert_eq!(store.canteen_id.as_str(), "665f00");
        assert_eq!(store.opening_hours.resolve().len(), 5);
        assert_eq!(store.opening_hours.hours_for(Day::Sunday), None);
        assert_eq!(store.food_items[1].category, Some(Category::Drink));
        assert_eq!(store.food_items[0].prices.special, None);
    }

    #[test]
    fn store_round_trips() {
        let store = store_from_normalized(store_doc()).unwrap();
        let doc = store_to_normalized(&store);
        assert_eq!(doc, store_doc());
    }

    #[test]
    fn every_other_day_is_tagged_in_store_document() {
        let mut doc = store_doc();
        doc.frequency = Some(Frequency::EveryOtherDay);
        let store = store_from_normalized(doc.clone()).unwrap();
        assert_eq!(store.opening_hours.frequency(), Frequency::EveryOtherDay);
        assert_eq!(store.opening_hours.resolve().len(), 5);

        let written = serde_json::to_value(store_to_normalized(&store)).unwrap();
        assert_eq!(written["frequency"], "every_other_day");

        // plain every-day stores carry no tag
        let plain = store_from_normalized(store_doc()).unwrap();
        let plain = serde_json::to_value(store_to_normalized(&plain)).unwrap();
        assert!(plain.get("frequency").is_none());
    }

    #[test]
    fn bad_day_names_the_store() {
        let mut doc = store_doc();
        doc.opening_hours[0].day_of_week = "MOONDAY".to_string();
        let err = store_from_normalized(doc).unwrap_err();
        assert!(matches!(err, CatalogError::Schema(ref msg) if msg.contains("Noodle Shop")));
    }

    #[test]
    fn canteen_busy_periods_are_a_list() {
        let doc: NormalizedCanteen = serde_json::from_value(serde_json::json!({
            "_id": "665f00",
            "name": "C10",
            "busyPeriods": [{"start": "11:00", "end": "13:00"}, {"start": "17:00", "end": "18:00"}],
            "withAirConditioning": true
        }))
        .unwrap();
        let canteen = canteen_from_normalized(doc.clone()).unwrap();
        assert_eq!(canteen.busy_periods.len(), 2);
        assert!(canteen.with_air_conditioning);
        assert_eq!(canteen_to_normalized(&canteen), doc);
    }
}
