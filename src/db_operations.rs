use std::path::Path;

use rusqlite::{params, Connection};
use serde_json::Value;

use crate::{
    catalog_operations::{Catalog, Change},
    data_backend::{
        normalized_parser::{canteen_to_normalized, store_to_normalized},
        RawSnapshot,
    },
    data_types::EntityId,
    errors::StorageError,
    session::CatalogPersistence,
};

/// Normalized collections in SQLite: one JSON document per row, keyed by id.
///
/// Deleting a canteen only deletes its row. Its stores stay behind and show up
/// as orphans on the next load.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> rusqlite::Result<Self> {
        SqliteStore::with_connection(Connection::open(path)?)
    }

    pub fn with_connection(conn: Connection) -> rusqlite::Result<Self> {
        check_or_create_db_tables(&conn)?;
        Ok(SqliteStore { conn })
    }

    fn write_change(&self, catalog: &Catalog, change: &Change) -> Result<(), StorageError> {
        match change {
            Change::CanteenUpserted(id) => match catalog.canteen(id) {
                Ok(canteen) => upsert_canteen(
                    &self.conn,
                    id,
                    &serde_json::to_string(&canteen_to_normalized(canteen))?,
                )?,
                Err(_) => log::warn!("Canteen {id} vanished before it could be written"),
            },
            Change::StoreUpserted(id) => match catalog.store(id) {
                Ok(store) => upsert_store(
                    &self.conn,
                    id,
                    &store.canteen_id,
                    &serde_json::to_string(&store_to_normalized(store))?,
                )?,
                Err(_) => log::warn!("Store {id} vanished before it could be written"),
            },
            Change::CanteenDeleted(id) => delete_canteen_row(&self.conn, id)?,
            Change::StoreDeleted(id) => delete_store_row(&self.conn, id)?,
        }
        Ok(())
    }
}

impl CatalogPersistence for SqliteStore {
    fn load_snapshot(&mut self) -> Result<RawSnapshot, StorageError> {
        Ok(RawSnapshot {
            canteens: get_all_docs(&self.conn, "SELECT json_text FROM canteens ORDER BY rowid")?,
            stores: get_all_docs(&self.conn, "SELECT json_text FROM stores ORDER BY rowid")?,
        })
    }

    fn apply(&mut self, catalog: &Catalog, changes: &[Change]) -> Result<(), StorageError> {
        for change in changes {
            self.write_change(catalog, change)?;
        }
        Ok(())
    }

    fn replace_all(&mut self, catalog: &Catalog) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM stores", [])?;
        tx.execute("DELETE FROM canteens", [])?;
        for canteen in catalog.canteens() {
            upsert_canteen(
                &tx,
                &canteen.id,
                &serde_json::to_string(&canteen_to_normalized(canteen))?,
            )?;
            for store in &canteen.stores {
                upsert_store(
                    &tx,
                    &store.id,
                    &store.canteen_id,
                    &serde_json::to_string(&store_to_normalized(store))?,
                )?;
            }
        }
        for store in catalog.orphaned_stores() {
            upsert_store(
                &tx,
                &store.id,
                &store.canteen_id,
                &serde_json::to_string(&store_to_normalized(store))?,
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

pub fn check_or_create_db_tables(conn: &Connection) -> rusqlite::Result<()> {
    conn.prepare(
        "create table if not exists canteens (
            canteen_id text primary key,
            json_text text not null
        )",
    )?
    .execute([])?;

    // no foreign key: a canteen delete must not take its stores with it
    conn.prepare(
        "create table if not exists stores (
            store_id text primary key,
            canteen_id text not null,
            json_text text not null
        )",
    )?
    .execute([])?;

    Ok(())
}

fn upsert_canteen(conn: &Connection, id: &EntityId, json_text: &str) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare_cached(
        "insert into canteens (canteen_id, json_text) values (?1, ?2)
            on conflict(canteen_id) do update set json_text = excluded.json_text",
    )?;
    stmt.execute(params![id.as_str(), json_text])?;
    Ok(())
}

fn upsert_store(
    conn: &Connection,
    id: &EntityId,
    canteen_id: &EntityId,
    json_text: &str,
) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare_cached(
        "insert into stores (store_id, canteen_id, json_text) values (?1, ?2, ?3)
            on conflict(store_id) do update set json_text = excluded.json_text",
    )?;
    stmt.execute(params![id.as_str(), canteen_id.as_str(), json_text])?;
    Ok(())
}

fn delete_canteen_row(conn: &Connection, id: &EntityId) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare_cached("DELETE FROM canteens WHERE canteen_id = ?1")?;
    stmt.execute(params![id.as_str()])?;
    Ok(())
}

fn delete_store_row(conn: &Connection, id: &EntityId) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare_cached("DELETE FROM stores WHERE store_id = ?1")?;
    stmt.execute(params![id.as_str()])?;
    Ok(())
}

fn get_all_docs(conn: &Connection, query: &str) -> Result<Vec<Value>, StorageError> {
    let mut stmt = conn.prepare_cached(query)?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut docs = Vec::new();
    for json_text in rows {
        docs.push(serde_json::from_str(&json_text?)?);
    }
    Ok(docs)
}
