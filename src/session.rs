//! One user's sequence of catalog actions against a persistence collaborator.
//!
//! Every mutation is a read -> validate -> write unit. Validation failures
//! leave storage untouched. A storage failure is reported once and halts the
//! session: later mutations fail fast until [`Session::reconnect`] succeeds.

use std::time::Instant;

use crate::{
    catalog_operations::{Catalog, Change},
    data_backend::{load_catalog, RawSnapshot},
    data_types::{
        drafts::{CanteenDraft, FoodItemDraft, StoreDraft},
        Canteen, EntityId, FoodItem, Store,
    },
    errors::{CatalogError, Result, StorageError},
};

/// Where catalog documents live.
pub trait CatalogPersistence {
    /// Reads the full snapshot.
    fn load_snapshot(&mut self) -> Result<RawSnapshot, StorageError>;

    /// Writes the records named in `changes`, taking their current state from
    /// `catalog`.
    fn apply(&mut self, catalog: &Catalog, changes: &[Change]) -> Result<(), StorageError>;

    /// Writes every record of `catalog`, replacing what is stored.
    fn replace_all(&mut self, catalog: &Catalog) -> Result<(), StorageError>;
}

impl<P: CatalogPersistence + ?Sized> CatalogPersistence for Box<P> {
    fn load_snapshot(&mut self) -> Result<RawSnapshot, StorageError> {
        (**self).load_snapshot()
    }

    fn apply(&mut self, catalog: &Catalog, changes: &[Change]) -> Result<(), StorageError> {
        (**self).apply(catalog, changes)
    }

    fn replace_all(&mut self, catalog: &Catalog) -> Result<(), StorageError> {
        (**self).replace_all(catalog)
    }
}

pub struct Session<P> {
    persistence: P,
    halted: bool,
}

impl<P: CatalogPersistence> Session<P> {
    pub fn new(persistence: P) -> Self {
        Session {
            persistence,
            halted: false,
        }
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn into_inner(self) -> P {
        self.persistence
    }

    /// Current canonical catalog.
    pub fn load(&mut self) -> Result<Catalog> {
        let now = Instant::now();
        let snapshot = self.storage(|p| p.load_snapshot())?;
        let catalog = load_catalog(snapshot)?;
        log::debug!("Catalog loaded: {:.2?}", now.elapsed());
        Ok(catalog)
    }

    /// Clears a halt once storage answers again.
    pub fn reconnect(&mut self) -> Result<()> {
        let snapshot = self.persistence.load_snapshot()?;
        load_catalog(snapshot)?;
        if self.halted {
            log::info!("Data storage reachable again, resuming");
        }
        self.halted = false;
        Ok(())
    }

    pub fn add_canteen(&mut self, draft: CanteenDraft) -> Result<EntityId> {
        self.mutate(|catalog| {
            let (id, change) = catalog.add_canteen(draft)?;
            Ok((id, vec![change]))
        })
    }

    pub fn edit_canteen(&mut self, id: &EntityId, draft: CanteenDraft) -> Result<()> {
        self.mutate(|catalog| Ok(((), vec![catalog.edit_canteen(id, draft)?])))
    }

    pub fn delete_canteen(&mut self, id: &EntityId) -> Result<Canteen> {
        self.mutate(|catalog| {
            let (canteen, change) = catalog.delete_canteen(id)?;
            Ok((canteen, vec![change]))
        })
    }

    pub fn add_store(&mut self, canteen_id: &EntityId, draft: StoreDraft) -> Result<EntityId> {
        self.mutate(|catalog| {
            let (id, change) = catalog.add_store(canteen_id, draft)?;
            Ok((id, vec![change]))
        })
    }

    pub fn edit_store(&mut self, id: &EntityId, draft: StoreDraft) -> Result<()> {
        self.mutate(|catalog| Ok(((), vec![catalog.edit_store(id, draft)?])))
    }

    pub fn delete_store(&mut self, id: &EntityId) -> Result<Store> {
        self.mutate(|catalog| {
            let (store, change) = catalog.delete_store(id)?;
            Ok((store, vec![change]))
        })
    }

    pub fn add_food_item(&mut self, store_id: &EntityId, draft: FoodItemDraft) -> Result<usize> {
        self.mutate(|catalog| {
            let (index, change) = catalog.add_food_item(store_id, draft)?;
            Ok((index, vec![change]))
        })
    }

    pub fn edit_food_item(
        &mut self,
        store_id: &EntityId,
        index: usize,
        draft: FoodItemDraft,
    ) -> Result<()> {
        self.mutate(|catalog| Ok(((), vec![catalog.edit_food_item(store_id, index, draft)?])))
    }

    pub fn delete_food_item(&mut self, store_id: &EntityId, index: usize) -> Result<FoodItem> {
        self.mutate(|catalog| {
            let (item, change) = catalog.delete_food_item(store_id, index)?;
            Ok((item, vec![change]))
        })
    }

    /// Deletes stores left behind by canteen deletes. Returns how many were removed.
    pub fn purge_orphaned_stores(&mut self) -> Result<usize> {
        self.mutate(|catalog| {
            let changes = catalog.purge_orphaned_stores();
            Ok((changes.len(), changes))
        })
    }

    /// Copies the whole catalog into another collaborator, e.g. file -> database.
    pub fn migrate_to<Q: CatalogPersistence>(&mut self, target: &mut Q) -> Result<usize> {
        let catalog = self.load()?;
        target.replace_all(&catalog)?;
        let count = catalog.canteens().len();
        log::info!("Migrated {count} canteens");
        Ok(count)
    }

    fn mutate<T>(
        &mut self,
        operation: impl FnOnce(&mut Catalog) -> Result<(T, Vec<Change>)>,
    ) -> Result<T> {
        if self.halted {
            return Err(CatalogError::SessionHalted);
        }
        let mut catalog = self.load()?;
        let (out, changes) = operation(&mut catalog)?;

        let now = Instant::now();
        self.storage(|p| p.apply(&catalog, &changes))?;
        log::debug!("{} change(s) written: {:.2?}", changes.len(), now.elapsed());
        Ok(out)
    }

    fn storage<T>(
        &mut self,
        call: impl FnOnce(&mut P) -> Result<T, StorageError>,
    ) -> Result<T> {
        call(&mut self.persistence).map_err(|e| {
            if !self.halted {
                log::error!("Data storage unavailable: {e}");
            }
            self.halted = true;
            CatalogError::from(e)
        })
    }
}
