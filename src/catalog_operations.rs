//! In-memory catalog mutations. Each operation validates its draft against the
//! current snapshot and reports which single entity it touched, so that the
//! persistence side can write just that record.

use crate::{
    data_types::{
        drafts::{CanteenDraft, FoodItemDraft, StoreDraft},
        Canteen, EntityId, FoodItem, Store,
    },
    errors::{CatalogError, Result},
    validation::{check_canteen_name, check_store_name},
};

/// The one record a mutation wrote or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    CanteenUpserted(EntityId),
    CanteenDeleted(EntityId),
    StoreUpserted(EntityId),
    StoreDeleted(EntityId),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    canteens: Vec<Canteen>,
    orphaned_stores: Vec<Store>,
}

impl Catalog {
    pub fn new(canteens: Vec<Canteen>, orphaned_stores: Vec<Store>) -> Self {
        Catalog {
            canteens,
            orphaned_stores,
        }
    }

    pub fn canteens(&self) -> &[Canteen] {
        &self.canteens
    }

    /// Stores whose canteen no longer exists in the store collection.
    pub fn orphaned_stores(&self) -> &[Store] {
        &self.orphaned_stores
    }

    pub fn canteen(&self, id: &EntityId) -> Result<&Canteen> {
        self.canteens
            .iter()
            .find(|canteen| &canteen.id == id)
            .ok_or_else(|| not_found("canteen", id))
    }

    /// Exact-name lookup, as used by selection lists.
    pub fn canteen_by_name(&self, name: &str) -> Option<&Canteen> {
        self.canteens.iter().find(|canteen| canteen.name == name)
    }

    pub fn store(&self, id: &EntityId) -> Result<&Store> {
        self.canteens
            .iter()
            .flat_map(|canteen| &canteen.stores)
            .find(|store| &store.id == id)
            .ok_or_else(|| not_found("store", id))
    }

    pub fn add_canteen(&mut self, draft: CanteenDraft) -> Result<(EntityId, Change)> {
        check_canteen_name(&draft.name, &self.canteens, None)?;

        let id = EntityId::generate();
        log::info!("Adding canteen '{}' as {}", draft.name, id);
        self.canteens.push(Canteen {
            id: id.clone(),
            name: draft.name,
            busy_periods: draft.busy_periods,
            with_air_conditioning: draft.with_air_conditioning,
            stores: Vec::new(),
        });
        Ok((id.clone(), Change::CanteenUpserted(id)))
    }

    /// Updates name, busy periods and air conditioning. The stores stay untouched.
    pub fn edit_canteen(&mut self, id: &EntityId, draft: CanteenDraft) -> Result<Change> {
        self.canteen(id)?;
        check_canteen_name(&draft.name, &self.canteens, Some(id))?;

        let canteen = self.canteen_mut(id)?;
        log::info!("Editing canteen {} ('{}' -> '{}')", id, canteen.name, draft.name);
        canteen.name = draft.name;
        canteen.busy_periods = draft.busy_periods;
        canteen.with_air_conditioning = draft.with_air_conditioning;
        Ok(Change::CanteenUpserted(id.clone()))
    }

    /// Removes the canteen together with its stores from the snapshot.
    ///
    /// Only the canteen is reported as changed: the embedded schema drops the
    /// stores with it, the normalized schema leaves their documents orphaned.
    pub fn delete_canteen(&mut self, id: &EntityId) -> Result<(Canteen, Change)> {
        let index = self
            .canteens
            .iter()
            .position(|canteen| &canteen.id == id)
            .ok_or_else(|| not_found("canteen", id))?;
        let canteen = self.canteens.remove(index);
        log::info!(
            "Deleted canteen '{}' with {} stores",
            canteen.name,
            canteen.stores.len()
        );
        Ok((canteen, Change::CanteenDeleted(id.clone())))
    }

    pub fn add_store(
        &mut self,
        canteen_id: &EntityId,
        draft: StoreDraft,
    ) -> Result<(EntityId, Change)> {
        let opening_hours = draft.schedule()?;
        let canteen = self.canteen_mut(canteen_id)?;
        check_store_name(&draft.name, &canteen.stores, None)?;

        let id = EntityId::generate();
        log::info!(
            "Adding store '{}' to '{}' as {}",
            draft.name,
            canteen.name,
            id
        );
        canteen.stores.push(Store {
            id: id.clone(),
            canteen_id: canteen_id.clone(),
            name: draft.name,
            description: draft.description,
            opening_hours,
            food_items: Vec::new(),
        });
        Ok((id.clone(), Change::StoreUpserted(id)))
    }

    /// Updates name, description and opening hours. Food items are kept as they are.
    pub fn edit_store(&mut self, id: &EntityId, draft: StoreDraft) -> Result<Change> {
        let opening_hours = draft.schedule()?;
        let (canteen_index, store_index) = self.locate_store(id)?;
        let canteen = &mut self.canteens[canteen_index];
        check_store_name(&draft.name, &canteen.stores, Some(id))?;

        let store = &mut canteen.stores[store_index];
        log::info!("Editing store {} ('{}' -> '{}')", id, store.name, draft.name);
        store.name = draft.name;
        store.description = draft.description;
        store.opening_hours = opening_hours;
        Ok(Change::StoreUpserted(id.clone()))
    }

    pub fn delete_store(&mut self, id: &EntityId) -> Result<(Store, Change)> {
        let (canteen_index, store_index) = self.locate_store(id)?;
        let store = self.canteens[canteen_index].stores.remove(store_index);
        log::info!(
            "Deleted store '{}' with {} food items",
            store.name,
            store.food_items.len()
        );
        Ok((store, Change::StoreDeleted(id.clone())))
    }

    /// Appends to the store's menu and returns the new item's position.
    pub fn add_food_item(
        &mut self,
        store_id: &EntityId,
        draft: FoodItemDraft,
    ) -> Result<(usize, Change)> {
        let item = draft.into_food_item()?;
        let store = self.store_mut(store_id)?;
        log::info!("Adding '{}' to store '{}'", item.name, store.name);
        store.food_items.push(item);
        Ok((
            store.food_items.len() - 1,
            Change::StoreUpserted(store_id.clone()),
        ))
    }

    /// Replaces the whole item at `index`; fields left out of the draft are gone afterwards.
    pub fn edit_food_item(
        &mut self,
        store_id: &EntityId,
        index: usize,
        draft: FoodItemDraft,
    ) -> Result<Change> {
        let item = draft.into_food_item()?;
        let store = self.store_mut(store_id)?;
        let slot = store
            .food_items
            .get_mut(index)
            .ok_or_else(|| not_found("food item", &format!("{store_id}#{index}")))?;
        log::info!("Replacing food item '{}' with '{}'", slot.name, item.name);
        *slot = item;
        Ok(Change::StoreUpserted(store_id.clone()))
    }

    pub fn delete_food_item(
        &mut self,
        store_id: &EntityId,
        index: usize,
    ) -> Result<(FoodItem, Change)> {
        let store = self.store_mut(store_id)?;
        if index >= store.food_items.len() {
            return Err(not_found("food item", &format!("{store_id}#{index}")));
        }
        let item = store.food_items.remove(index);
        log::info!("Deleted food item '{}' from '{}'", item.name, store.name);
        Ok((item, Change::StoreUpserted(store_id.clone())))
    }

    /// Forgets all orphaned stores and returns one `StoreDeleted` per store.
    pub fn purge_orphaned_stores(&mut self) -> Vec<Change> {
        self.orphaned_stores
            .drain(..)
            .map(|store| {
                log::info!("Purging orphaned store '{}' ({})", store.name, store.id);
                Change::StoreDeleted(store.id)
            })
            .collect()
    }

    fn canteen_mut(&mut self, id: &EntityId) -> Result<&mut Canteen> {
        self.canteens
            .iter_mut()
            .find(|canteen| &canteen.id == id)
            .ok_or_else(|| not_found("canteen", id))
    }

    fn store_mut(&mut self, id: &EntityId) -> Result<&mut Store> {
        let (canteen_index, store_index) = self.locate_store(id)?;
        Ok(&mut self.canteens[canteen_index].stores[store_index])
    }

    fn locate_store(&self, id: &EntityId) -> Result<(usize, usize)> {
        self.canteens
            .iter()
            .enumerate()
            .find_map(|(canteen_index, canteen)| {
                canteen
                    .stores
                    .iter()
                    .position(|store| &store.id == id)
                    .map(|store_index| (canteen_index, store_index))
            })
            .ok_or_else(|| not_found("store", id))
    }
}

fn not_found(kind: &'static str, id: &dyn std::fmt::Display) -> CatalogError {
    CatalogError::NotFound {
        kind,
        id: id.to_string(),
    }
}
