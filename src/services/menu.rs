//! Menu catalog and the daily availability selection.

use std::collections::HashSet;

use crate::db::{Slot, Step, Store, WriteOutcome};
use crate::errors::AppError;
use crate::models::MenuItem;
use crate::seed;

/// Read access to the catalog plus the `available_items` slot.
#[derive(Clone)]
pub struct MenuService {
    store: Store,
    catalog: Vec<MenuItem>,
}

impl MenuService {
    pub fn new(store: Store) -> Self {
        Self::with_catalog(store, seed::menu_items())
    }

    pub fn with_catalog(store: Store, catalog: Vec<MenuItem>) -> Self {
        Self { store, catalog }
    }

    /// The full catalog in insertion order.
    pub fn list_all_items(&self) -> &[MenuItem] {
        &self.catalog
    }

    /// Look up a catalog item.
    pub fn item(&self, id: &str) -> Option<&MenuItem> {
        self.catalog.iter().find(|item| item.id == id)
    }

    fn catalog_ids(&self) -> Vec<String> {
        self.catalog.iter().map(|item| item.id.clone()).collect()
    }

    fn warn_unknown(&self, id: &str) {
        if self.item(id).is_none() {
            tracing::warn!(item_id = id, "Availability references an item outside the catalog");
        }
    }

    /// Ids currently offered to location managers.
    ///
    /// The first read with nothing persisted stores and returns the whole catalog.
    pub async fn available_ids(&self) -> Result<Vec<String>, AppError> {
        if let Some(ids) = self.store.get::<Vec<String>>(Slot::AvailableItems).await? {
            return Ok(ids);
        }

        let defaults = self.catalog_ids();
        self.store
            .seed_if_absent(Slot::AvailableItems, || defaults.clone())
            .await?;
        // Another client may have seeded first
        Ok(self
            .store
            .get(Slot::AvailableItems)
            .await?
            .unwrap_or(defaults))
    }

    /// Catalog items that are available today, in catalog order.
    pub async fn list_available_items(&self) -> Result<Vec<MenuItem>, AppError> {
        let ids: HashSet<String> = self.available_ids().await?.into_iter().collect();
        Ok(self
            .catalog
            .iter()
            .filter(|item| ids.contains(&item.id))
            .cloned()
            .collect())
    }

    /// Replace the availability selection wholesale.
    ///
    /// Unknown ids are kept but can never show up in [`Self::list_available_items`].
    pub async fn set_availability<I, S>(&self, ids: I) -> Result<(), AppError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let ids: Vec<String> = ids
            .into_iter()
            .map(Into::into)
            .filter(|id| seen.insert(id.clone()))
            .collect();

        for id in &ids {
            self.warn_unknown(id);
        }

        self.store.replace(Slot::AvailableItems, &ids).await?;
        tracing::info!(count = ids.len(), "Updated daily availability");
        Ok(())
    }

    /// Toggle a single item, saved immediately.
    pub async fn set_item_available(
        &self,
        id: &str,
        available: bool,
    ) -> Result<WriteOutcome, AppError> {
        self.warn_unknown(id);

        let outcome = self
            .store
            .modify(
                Slot::AvailableItems,
                || self.catalog_ids(),
                |ids: &mut Vec<String>| {
                    let present = ids.iter().any(|existing| existing == id);
                    match (present, available) {
                        (false, true) => ids.push(id.to_string()),
                        (true, false) => ids.retain(|existing| existing != id),
                        _ => return Ok(Step::Skip(WriteOutcome::NoOp)),
                    }
                    Ok(Step::Commit(WriteOutcome::Applied))
                },
            )
            .await?;

        tracing::info!(item_id = id, available, ?outcome, "Toggled item availability");
        Ok(outcome)
    }
}
