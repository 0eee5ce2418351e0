use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use serde_json::Value;
use tempfile::NamedTempFile;

use crate::{
    catalog_operations::{Catalog, Change},
    data_backend::{to_legacy_documents, to_pretty_json, RawSnapshot},
    data_types::vocabulary::LabelSet,
    errors::StorageError,
    session::CatalogPersistence,
};

/// The embedded schema on disk: one JSON array of canteens, rewritten in full
/// on every change.
pub struct JsonFileStore {
    path: PathBuf,
    labels: LabelSet,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore {
            path: path.into(),
            labels: LabelSet::Thai,
        }
    }

    /// Vocabulary used for day and frequency keys when writing.
    pub fn with_labels(mut self, labels: LabelSet) -> Self {
        self.labels = labels;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, catalog: &Catalog) -> Result<(), StorageError> {
        let text = to_pretty_json(&to_legacy_documents(catalog.canteens(), self.labels))?;

        // replace atomically so a crash never leaves half a file behind
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(text.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;

        log::debug!("Wrote {} canteens to {}", catalog.canteens().len(), self.path.display());
        Ok(())
    }
}

impl CatalogPersistence for JsonFileStore {
    fn load_snapshot(&mut self) -> Result<RawSnapshot, StorageError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("{} does not exist yet, starting empty", self.path.display());
                return Ok(RawSnapshot::default());
            }
            Err(e) => return Err(e.into()),
        };
        let canteens: Vec<Value> = serde_json::from_str(&text)?;
        Ok(RawSnapshot {
            canteens,
            stores: Vec::new(),
        })
    }

    /// The whole file is rewritten whatever the change was.
    fn apply(&mut self, catalog: &Catalog, _changes: &[Change]) -> Result<(), StorageError> {
        self.write(catalog)
    }

    fn replace_all(&mut self, catalog: &Catalog) -> Result<(), StorageError> {
        self.write(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_backend::load_catalog;
    use crate::data_types::drafts::CanteenDraft;

    #[test]
    fn missing_file_is_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("canteen_data.json"));
        assert_eq!(store.load_snapshot().unwrap(), RawSnapshot::default());
    }

    #[test]
    fn garbage_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("canteen_data.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonFileStore::new(&path).load_snapshot(),
            Err(StorageError::Json(_))
        ));
    }

    #[test]
    fn written_file_is_legacy_array_with_four_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("canteen_data.json");
        let mut store = JsonFileStore::new(&path);

        let mut catalog = Catalog::default();
        let draft = CanteenDraft {
            name: "โรงอาหาร C10".to_string(),
            ..CanteenDraft::default()
        };
        let (_, change) = catalog.add_canteen(draft).unwrap();
        store.apply(&catalog, &[change]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n    {\n        \"id\""));
        assert!(text.contains("\"canteen_name\": \"โรงอาหาร C10\""));
        assert!(text.contains("\"busy_hours\""));

        let reloaded = load_catalog(store.load_snapshot().unwrap()).unwrap();
        assert_eq!(reloaded.canteens(), catalog.canteens());
    }
}
