use std::{env, path::Path};

use crate::{
    db_operations::SqliteStore, errors::StorageError, file_operations::JsonFileStore,
    session::CatalogPersistence,
};

pub fn logger_init(module_path: &str) {
    let crate_level =
        if env::var(pretty_env_logger::env_logger::DEFAULT_FILTER_ENV).unwrap_or_default() == "debug" {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };

    pretty_env_logger::formatted_timed_builder()
        .filter_level(log::LevelFilter::Info)
        .filter_module(module_path, crate_level)
        .filter_module("canteen_catalog_rs", crate_level)
        .init();
}

/// The database wins when both a database and a file are configured.
pub fn open_persistence(
    file: &Path,
    db: Option<&Path>,
) -> Result<Box<dyn CatalogPersistence>, StorageError> {
    match db {
        Some(db) => {
            log::info!("Using catalog database {}", db.display());
            Ok(Box::new(SqliteStore::open(db)?))
        }
        None => {
            log::info!("Using catalog file {}", file.display());
            Ok(Box::new(JsonFileStore::new(file)))
        }
    }
}
