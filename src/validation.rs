use crate::{
    data_types::{Canteen, EntityId, Named, Store},
    errors::{CatalogError, Result},
};

/// Rejects `candidate` if another canteen already uses the name, ignoring case.
/// `excluding` is the canteen being edited, which may keep its own name.
pub fn check_canteen_name(
    candidate: &str,
    existing: &[Canteen],
    excluding: Option<&EntityId>,
) -> Result<()> {
    check_unique_name("canteen", candidate, existing, excluding)
}

/// Same as [`check_canteen_name`], scoped to the stores of one canteen.
pub fn check_store_name(
    candidate: &str,
    existing: &[Store],
    excluding: Option<&EntityId>,
) -> Result<()> {
    check_unique_name("store", candidate, existing, excluding)
}

// whitespace is compared as-is
fn check_unique_name<T: Named>(
    kind: &'static str,
    candidate: &str,
    existing: &[T],
    excluding: Option<&EntityId>,
) -> Result<()> {
    if candidate.is_empty() {
        return Err(CatalogError::EmptyName(kind));
    }

    let candidate_lower = candidate.to_lowercase();
    let clash = existing
        .iter()
        .filter(|entry| Some(entry.id()) != excluding)
        .any(|entry| entry.name().to_lowercase() == candidate_lower);

    if clash {
        Err(CatalogError::DuplicateName {
            kind,
            name: candidate.to_string(),
        })
    } else {
        Ok(())
    }
}
