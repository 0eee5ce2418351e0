use crate::data_backend::in_context;
use crate::data_types::{
    legacy_data_types::{
        LegacyCanteen, LegacyFoodItem, LegacyId, LegacyPrices, LegacyStore, LegacyTimeRange,
    },
    time_range::TimeRange,
    vocabulary::LabelSet,
    Canteen, Category, EntityId, FoodItem, Prices, Store,
};
use crate::errors::{CatalogError, Result};
use crate::schedule::Schedule;

pub fn canteen_from_legacy(doc: LegacyCanteen) -> Result<Canteen> {
    let id = EntityId::from(doc.id.to_string());
    let name = doc.canteen_name;

    // the list wins over the single window when both are present
    let busy_periods = if doc.busy_periods.is_empty() {
        doc.busy_hours.into_iter().collect()
    } else {
        doc.busy_periods
    };
    let busy_periods = busy_periods
        .iter()
        .map(|range| TimeRange::parse(&range.start_time, &range.end_time))
        .collect::<Result<Vec<_>>>()
        .map_err(|e| in_context("canteen", &name, e))?;

    let stores = doc
        .stores
        .into_iter()
        .enumerate()
        .map(|(index, store)| store_from_legacy(store, &id, index))
        .collect::<Result<Vec<_>>>()?;

    Ok(Canteen {
        id,
        name,
        busy_periods,
        with_air_conditioning: doc.with_airconditioning,
        stores,
    })
}

/// Embedded stores written before ids existed get one derived from position.
fn store_from_legacy(doc: LegacyStore, canteen_id: &EntityId, index: usize) -> Result<Store> {
    let id = doc
        .id
        .map(EntityId::from)
        .unwrap_or_else(|| EntityId::from(format!("{canteen_id}-{index}")));

    let opening_hours = doc
        .opening_hours
        .as_ref()
        .ok_or_else(|| CatalogError::Schema("no opening hours".to_string()))
        .and_then(Schedule::from_legacy)
        .map_err(|e| in_context("store", &doc.name, e))?;

    let food_items = doc
        .food_items
        .into_iter()
        .map(food_from_legacy)
        .collect::<Result<Vec<_>>>()
        .map_err(|e| in_context("store", &doc.name, e))?;

    Ok(Store {
        id,
        canteen_id: canteen_id.clone(),
        name: doc.name,
        description: doc.description,
        opening_hours,
        food_items,
    })
}

fn food_from_legacy(doc: LegacyFoodItem) -> Result<FoodItem> {
    Ok(FoodItem {
        prices: Prices::new(doc.prices.normal, doc.prices.special)?,
        category: parse_category(doc.category.as_deref(), &doc.name),
        name: doc.name,
        description: doc.description,
    })
}

pub(crate) fn parse_category(text: Option<&str>, food_name: &str) -> Option<Category> {
    let text = text?;
    let category = Category::parse(text);
    if category.is_none() {
        log::warn!("Ignoring unknown category '{text}' of '{food_name}'");
    }
    category
}

pub fn canteen_to_legacy(canteen: &Canteen, labels: LabelSet) -> LegacyCanteen {
    let periods: Vec<LegacyTimeRange> = canteen
        .busy_periods
        .iter()
        .map(|range| LegacyTimeRange {
            start_time: range.start_text(),
            end_time: range.end_text(),
        })
        .collect();

    LegacyCanteen {
        id: LegacyId::from_text(canteen.id.as_str()),
        canteen_name: canteen.name.clone(),
        busy_hours: periods.first().cloned(),
        busy_periods: if periods.len() > 1 { periods } else { Vec::new() },
        with_airconditioning: canteen.with_air_conditioning,
        stores: canteen
            .stores
            .iter()
            .map(|store| store_to_legacy(store, labels))
            .collect(),
    }
}

fn store_to_legacy(store: &Store, labels: LabelSet) -> LegacyStore {
    LegacyStore {
        id: Some(store.id.to_string()),
        name: store.name.clone(),
        description: store.description.clone(),
        opening_hours: Some(store.opening_hours.to_legacy(labels)),
        food_items: store
            .food_items
            .iter()
            .map(|item| LegacyFoodItem {
                name: item.name.clone(),
                prices: LegacyPrices {
                    normal: item.prices.normal,
                    special: item.prices.special,
                },
                description: item.description.clone(),
                category: item.category.map(|c| c.as_str().to_string()),
            })
            .collect(),
    }
}
