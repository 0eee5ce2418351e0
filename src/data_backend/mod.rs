//! Conversion between stored documents and the canonical catalog.
//!
//! Documents are classified exactly once, here, by the keys they carry. After
//! that everything works on the canonical [`Canteen`] graph.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Map, Value};

use crate::{
    catalog_operations::Catalog,
    constants::JSON_INDENT,
    data_types::{
        legacy_data_types::LegacyCanteen,
        normalized_data_types::{NormalizedCanteen, NormalizedStore},
        vocabulary::LabelSet,
        Canteen,
    },
    errors::{CatalogError, Result},
};

pub mod legacy_parser;
pub mod normalized_parser;

/// Everything a persistence collaborator hands over on load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSnapshot {
    pub canteens: Vec<Value>,
    /// Empty for the embedded schema, where stores live inside canteens.
    pub stores: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawCanteenDocument {
    LegacyEmbedded(LegacyCanteen),
    Normalized(NormalizedCanteen),
}

impl RawCanteenDocument {
    pub fn detect(doc: Value) -> Result<Self> {
        let fields = as_object(&doc, "canteen")?;
        if has_any(fields, &["canteen_name", "busy_hours", "with_airconditioning"]) {
            Ok(RawCanteenDocument::LegacyEmbedded(from_value(doc, "canteen")?))
        } else if has_any(fields, &["busyPeriods", "withAirConditioning", "_id"]) {
            Ok(RawCanteenDocument::Normalized(from_value(doc, "canteen")?))
        } else {
            Err(CatalogError::Schema(
                "canteen document has neither legacy nor normalized fields".to_string(),
            ))
        }
    }
}

/// Store collection entries. Only the normalized shape lives in a collection;
/// legacy stores are embedded and come in through their canteen.
#[derive(Debug, Clone, PartialEq)]
pub enum RawStoreDocument {
    Normalized(NormalizedStore),
}

impl RawStoreDocument {
    pub fn detect(doc: Value) -> Result<Self> {
        let fields = as_object(&doc, "store")?;
        if !fields.contains_key("openingHours") {
            let name = fields.get("name").and_then(Value::as_str).unwrap_or("?");
            return Err(CatalogError::Schema(format!(
                "store '{name}' has no opening hours"
            )));
        }
        Ok(RawStoreDocument::Normalized(from_value(doc, "store")?))
    }
}

/// Builds the canonical catalog from any mix of document versions.
///
/// Stores whose canteen is missing are kept aside as orphans rather than dropped.
pub fn load_catalog(snapshot: RawSnapshot) -> Result<Catalog> {
    let mut canteens = Vec::with_capacity(snapshot.canteens.len());
    for doc in snapshot.canteens {
        let canteen = match RawCanteenDocument::detect(doc)? {
            RawCanteenDocument::LegacyEmbedded(doc) => legacy_parser::canteen_from_legacy(doc)?,
            RawCanteenDocument::Normalized(doc) => normalized_parser::canteen_from_normalized(doc)?,
        };
        canteens.push(canteen);
    }

    let position: HashMap<String, usize> = canteens
        .iter()
        .enumerate()
        .map(|(index, canteen)| (canteen.id.to_string(), index))
        .collect();

    let mut orphaned_stores = Vec::new();
    for doc in snapshot.stores {
        let store = match RawStoreDocument::detect(doc)? {
            RawStoreDocument::Normalized(doc) => normalized_parser::store_from_normalized(doc)?,
        };
        match position.get(store.canteen_id.as_str()) {
            Some(index) => canteens[*index].stores.push(store),
            None => {
                log::warn!(
                    "Store '{}' ({}) refers to missing canteen {}",
                    store.name,
                    store.id,
                    store.canteen_id
                );
                orphaned_stores.push(store);
            }
        }
    }

    Ok(Catalog::new(canteens, orphaned_stores))
}

pub fn to_legacy_documents(canteens: &[Canteen], labels: LabelSet) -> Vec<LegacyCanteen> {
    canteens
        .iter()
        .map(|canteen| legacy_parser::canteen_to_legacy(canteen, labels))
        .collect()
}

pub fn to_normalized_collections(
    canteens: &[Canteen],
) -> (Vec<NormalizedCanteen>, Vec<NormalizedStore>) {
    let canteen_docs = canteens
        .iter()
        .map(normalized_parser::canteen_to_normalized)
        .collect();
    let store_docs = canteens
        .iter()
        .flat_map(|canteen| &canteen.stores)
        .map(normalized_parser::store_to_normalized)
        .collect();
    (canteen_docs, store_docs)
}

/// Indented UTF-8 JSON; non-ASCII text such as Thai names is written as-is.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(JSON_INDENT));
    value.serialize(&mut serializer)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Prefixes schema errors with the record they came from.
pub(crate) fn in_context(kind: &str, name: &str, err: CatalogError) -> CatalogError {
    match err {
        CatalogError::Schema(msg) => CatalogError::Schema(format!("{kind} '{name}': {msg}")),
        other => other,
    }
}

fn as_object<'a>(doc: &'a Value, kind: &str) -> Result<&'a Map<String, Value>> {
    doc.as_object()
        .ok_or_else(|| CatalogError::Schema(format!("{kind} document is not an object")))
}

fn has_any(fields: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter().any(|key| fields.contains_key(*key))
}

fn from_value<T: serde::de::DeserializeOwned>(doc: Value, kind: &str) -> Result<T> {
    serde_json::from_value(doc).map_err(|e| CatalogError::Schema(format!("{kind} document: {e}")))
}
