//! Location registry.

use crate::db::{Slot, Step, Store, WriteOutcome};
use crate::errors::AppError;
use crate::models::Location;
use crate::seed;

/// CRUD over the `locations` slot.
///
/// Deleting a location never touches its orders.
#[derive(Clone)]
pub struct LocationRegistry {
    store: Store,
}

impl LocationRegistry {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// All locations in insertion order. Falls back to the demo locations
    /// while nothing has been stored.
    pub async fn list(&self) -> Result<Vec<Location>, AppError> {
        Ok(self
            .store
            .get(Slot::Locations)
            .await?
            .unwrap_or_else(seed::default_locations))
    }

    pub async fn get(&self, id: &str) -> Result<Option<Location>, AppError> {
        Ok(self.list().await?.into_iter().find(|loc| loc.id == id))
    }

    pub async fn create(&self, name: &str) -> Result<Location, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation(
                "Location name is required".to_string(),
            ));
        }

        let location = Location {
            id: format!("loc-{}", uuid::Uuid::new_v4()),
            name: name.to_string(),
        };

        self.store
            .modify(Slot::Locations, seed::default_locations, |locations| {
                locations.push(location.clone());
                Ok(Step::Commit(()))
            })
            .await?;

        tracing::info!(location_id = %location.id, name = %location.name, "Created location");
        Ok(location)
    }

    /// Rename a location. An unknown id is logged and ignored.
    pub async fn rename(&self, id: &str, new_name: &str) -> Result<WriteOutcome, AppError> {
        let outcome = self
            .store
            .modify(Slot::Locations, seed::default_locations, |locations| {
                match locations.iter_mut().find(|loc| loc.id == id) {
                    Some(location) => {
                        location.name = new_name.to_string();
                        Ok(Step::Commit(WriteOutcome::Applied))
                    }
                    None => Ok(Step::Skip(WriteOutcome::NoOp)),
                }
            })
            .await?;

        match outcome {
            WriteOutcome::Applied => tracing::info!(location_id = id, "Renamed location"),
            WriteOutcome::NoOp => tracing::warn!(location_id = id, "Rename ignored: location not found"),
        }
        Ok(outcome)
    }

    /// Remove a location. Idempotent.
    pub async fn delete(&self, id: &str) -> Result<WriteOutcome, AppError> {
        let outcome = self
            .store
            .modify(Slot::Locations, seed::default_locations, |locations| {
                let before = locations.len();
                locations.retain(|loc| loc.id != id);
                if locations.len() == before {
                    Ok(Step::Skip(WriteOutcome::NoOp))
                } else {
                    Ok(Step::Commit(WriteOutcome::Applied))
                }
            })
            .await?;

        tracing::info!(location_id = id, ?outcome, "Deleted location");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_defaults_without_persisting() {
        let store = Store::in_memory();
        let registry = LocationRegistry::new(store.clone());

        assert_eq!(registry.list().await.unwrap().len(), 3);
        assert!(store.get::<Vec<Location>>(Slot::Locations).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_appends_with_fresh_id() {
        let registry = LocationRegistry::new(Store::in_memory());
        let a = registry.create("  Harbor Kiosk ").await.unwrap();
        let b = registry.create("Harbor Kiosk").await.unwrap();

        assert_eq!(a.name, "Harbor Kiosk");
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("loc-"));

        let locations = registry.list().await.unwrap();
        assert_eq!(locations.len(), 5);
        assert_eq!(locations[3], a);
        assert_eq!(locations[4], b);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let registry = LocationRegistry::new(Store::in_memory());
        let err = registry.create("   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_rename_and_missing_id_is_noop() {
        let registry = LocationRegistry::new(Store::in_memory());

        let outcome = registry.rename("loc-2", "West Campus").await.unwrap();
        assert_eq!(outcome, WriteOutcome::Applied);
        assert_eq!(
            registry.get("loc-2").await.unwrap().unwrap().name,
            "West Campus"
        );

        let outcome = registry.rename("loc-404", "Nowhere").await.unwrap();
        assert_eq!(outcome, WriteOutcome::NoOp);
        assert_eq!(registry.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let registry = LocationRegistry::new(Store::in_memory());
        assert_eq!(registry.delete("loc-1").await.unwrap(), WriteOutcome::Applied);
        assert_eq!(registry.delete("loc-1").await.unwrap(), WriteOutcome::NoOp);

        let ids: Vec<String> = registry.list().await.unwrap().into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["loc-2", "loc-3"]);
    }
}
