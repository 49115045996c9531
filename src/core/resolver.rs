//! Reference resolution
//!
//! Maps domain identifiers (chain ids, food group and category codes) to
//! storage keys. There is no cache: every call queries the store.

use crate::core::store::{EntityKey, EntityStore, StoreError};
use crate::entities::classification::{Axis, Classification};

/// Looks up referenced entities by their domain identifier
pub struct ReferenceResolver<'a> {
    store: &'a dyn EntityStore,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(store: &'a dyn EntityStore) -> Self {
        Self { store }
    }

    /// Storage key of the entity whose id field on `axis` equals `code`
    ///
    /// Returns the lowest matching key, or `None` when nothing matches.
    pub fn resolve(&self, axis: Axis, code: &str) -> Result<Option<EntityKey>, StoreError> {
        let found = self
            .store
            .find_by_field(axis.entity_type(), axis.bundle(), axis.id_field(), code)?;

        match found {
            Some(key) => tracing::debug!(%axis, code, %key, "resolved reference"),
            None => tracing::warn!(%axis, code, "no {} with id '{}'", axis, code),
        }
        Ok(found)
    }

    /// Resolve the classification override chain
    ///
    /// Each present level replaces the value resolved so far, so the most
    /// specific level decides. Returns `None` when no level is present and
    /// the target field should be left as it is; `Some(None)` when the
    /// winning level could not be resolved.
    pub fn resolve_classification(
        &self,
        classification: &Classification,
    ) -> Result<Option<Option<EntityKey>>, StoreError> {
        let mut value = None;
        for (axis, code) in classification.levels() {
            value = Some(self.resolve(*axis, code)?);
        }
        Ok(value)
    }
}
