//! Order ledger.
//!
//! Orders are stored in insertion order. Every stored order holds at least one
//! item and only strictly positive quantities.

use chrono::{NaiveDate, Utc};

use crate::db::{Slot, Step, Store, WriteOutcome};
use crate::errors::AppError;
use crate::models::{positive_items, CreateOrderRequest, Order, OrderStatus, OrderUpdate};

/// CRUD over the `orders` slot.
#[derive(Clone)]
pub struct OrderLedger {
    store: Store,
}

impl OrderLedger {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Calendar day used for new orders.
    pub fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    pub async fn list_all(&self) -> Result<Vec<Order>, AppError> {
        Ok(self.store.get(Slot::Orders).await?.unwrap_or_default())
    }

    /// Orders for one location, including locations that have since been deleted.
    pub async fn list_by_location(&self, location_id: &str) -> Result<Vec<Order>, AppError> {
        let mut orders = self.list_all().await?;
        orders.retain(|order| order.location_id == location_id);
        Ok(orders)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Order>, AppError> {
        Ok(self.list_all().await?.into_iter().find(|order| order.id == id))
    }

    /// Submit a new order dated today.
    pub async fn create(&self, request: CreateOrderRequest) -> Result<Order, AppError> {
        let items = positive_items(request.items)?;
        if items.is_empty() {
            return Err(AppError::EmptyOrder);
        }

        let order = Order {
            id: format!("ord-{}", uuid::Uuid::new_v4()),
            location_id: request.location_id,
            date: Self::today(),
            items,
            manager_notes: request.manager_notes,
            status: OrderStatus::Submitted,
        };

        self.store
            .modify(Slot::Orders, Vec::new, |orders: &mut Vec<Order>| {
                orders.push(order.clone());
                Ok(Step::Commit(()))
            })
            .await?;

        tracing::info!(
            order_id = %order.id,
            location_id = %order.location_id,
            units = order.total_units(),
            "Created order"
        );
        Ok(order)
    }

    /// Replace an order by id.
    ///
    /// The stored date and status are kept unless the update supplies them.
    pub async fn update(&self, update: OrderUpdate) -> Result<Order, AppError> {
        let items = positive_items(update.items)?;
        if items.is_empty() {
            return Err(AppError::EmptyOrder);
        }

        let updated = self
            .store
            .modify(Slot::Orders, Vec::new, |orders: &mut Vec<Order>| {
                let existing = orders
                    .iter_mut()
                    .find(|order| order.id == update.id)
                    .ok_or_else(|| AppError::NotFound(format!("Order {} not found", update.id)))?;

                *existing = Order {
                    id: existing.id.clone(),
                    location_id: update.location_id.clone(),
                    date: update.date.unwrap_or(existing.date),
                    items: items.clone(),
                    manager_notes: update.manager_notes.clone(),
                    status: update.status.unwrap_or(existing.status),
                };
                Ok(Step::Commit(existing.clone()))
            })
            .await?;

        tracing::info!(order_id = %updated.id, "Updated order");
        Ok(updated)
    }

    /// Mark an order as fulfilled.
    pub async fn complete(&self, id: &str) -> Result<Order, AppError> {
        let order = self
            .store
            .modify(Slot::Orders, Vec::new, |orders: &mut Vec<Order>| {
                let order = orders
                    .iter_mut()
                    .find(|order| order.id == id)
                    .ok_or_else(|| AppError::NotFound(format!("Order {} not found", id)))?;
                if order.status == OrderStatus::Completed {
                    return Ok(Step::Skip(order.clone()));
                }
                order.status = OrderStatus::Completed;
                Ok(Step::Commit(order.clone()))
            })
            .await?;

        tracing::info!(order_id = id, "Completed order");
        Ok(order)
    }

    /// Remove an order. Idempotent.
    pub async fn delete(&self, id: &str) -> Result<WriteOutcome, AppError> {
        let outcome = self
            .store
            .modify(Slot::Orders, Vec::new, |orders: &mut Vec<Order>| {
                let before = orders.len();
                orders.retain(|order| order.id != id);
                if orders.len() == before {
                    Ok(Step::Skip(WriteOutcome::NoOp))
                } else {
                    Ok(Step::Commit(WriteOutcome::Applied))
                }
            })
            .await?;

        tracing::info!(order_id = id, ?outcome, "Deleted order");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn cart(entries: &[(&str, i64)]) -> BTreeMap<String, i64> {
        entries.iter().map(|(id, qty)| (id.to_string(), *qty)).collect()
    }

    fn request(location_id: &str, entries: &[(&str, i64)]) -> CreateOrderRequest {
        CreateOrderRequest {
            location_id: location_id.to_string(),
            items: cart(entries),
            manager_notes: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_strips_zero_quantities() {
        let ledger = OrderLedger::new(Store::in_memory());
        let order = ledger
            .create(request("loc-1", &[("item-1", 5), ("item-2", 0), ("item-3", -1)]))
            .await
            .unwrap();

        assert_eq!(order.items.len(), 1);
        assert_eq!(order.status, OrderStatus::Submitted);
        assert_eq!(order.date, OrderLedger::today());

        let stored = ledger.get(&order.id).await.unwrap().unwrap();
        assert!(!stored.items.contains_key("item-2"));
        assert!(stored.items.values().all(|qty| *qty > 0));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_order() {
        let store = Store::in_memory();
        let ledger = OrderLedger::new(store.clone());

        let err = ledger
            .create(request("loc-1", &[("item-1", 0)]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyOrder));
        assert!(store.get::<Vec<Order>>(Slot::Orders).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_oversized_quantity() {
        let store = Store::in_memory();
        let ledger = OrderLedger::new(store.clone());

        let err = ledger
            .create(request("loc-1", &[("item-1", 5_000_000_000)]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = ledger
            .create(request("loc-1", &[("item-1", 5_000_000_000), ("item-2", 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.get::<Vec<Order>>(Slot::Orders).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_rejects_oversized_quantity() {
        let ledger = OrderLedger::new(Store::in_memory());
        let order = ledger.create(request("loc-1", &[("item-1", 2)])).await.unwrap();

        let err = ledger
            .update(OrderUpdate {
                id: order.id.clone(),
                location_id: "loc-1".to_string(),
                items: cart(&[("item-1", 3), ("item-2", 5_000_000_000)]),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(ledger.get(&order.id).await.unwrap(), Some(order));
    }

    #[tokio::test]
    async fn test_update_preserves_date_and_status_by_default() {
        let ledger = OrderLedger::new(Store::in_memory());
        let order = ledger.create(request("loc-1", &[("item-1", 2)])).await.unwrap();
        ledger.complete(&order.id).await.unwrap();

        let updated = ledger
            .update(OrderUpdate {
                id: order.id.clone(),
                location_id: "loc-1".to_string(),
                items: cart(&[("item-1", 0), ("item-5", 4)]),
                manager_notes: "late delivery".to_string(),
                date: None,
                status: None,
            })
            .await
            .unwrap();

        assert_eq!(updated.id, order.id);
        assert_eq!(updated.date, order.date);
        assert_eq!(updated.status, OrderStatus::Completed);
        assert_eq!(updated.items, cart_u32(&[("item-5", 4)]));
        assert_eq!(ledger.list_all().await.unwrap(), vec![updated]);
    }

    fn cart_u32(entries: &[(&str, u32)]) -> BTreeMap<String, u32> {
        entries.iter().map(|(id, qty)| (id.to_string(), *qty)).collect()
    }

    #[tokio::test]
    async fn test_update_with_explicit_date() {
        let ledger = OrderLedger::new(Store::in_memory());
        let order = ledger.create(request("loc-2", &[("item-3", 1)])).await.unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

        let updated = ledger
            .update(OrderUpdate {
                id: order.id,
                location_id: "loc-2".to_string(),
                items: cart(&[("item-3", 3)]),
                date: Some(day),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.date, day);
    }

    #[tokio::test]
    async fn test_update_missing_order_is_not_found() {
        let ledger = OrderLedger::new(Store::in_memory());
        let err = ledger
            .update(OrderUpdate {
                id: "ord-missing".to_string(),
                location_id: "loc-1".to_string(),
                items: cart(&[("item-1", 1)]),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_to_empty_is_rejected() {
        let ledger = OrderLedger::new(Store::in_memory());
        let order = ledger.create(request("loc-1", &[("item-1", 2)])).await.unwrap();

        let err = ledger
            .update(OrderUpdate {
                id: order.id.clone(),
                location_id: "loc-1".to_string(),
                items: cart(&[("item-1", 0)]),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyOrder));
        assert_eq!(ledger.get(&order.id).await.unwrap(), Some(order));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent_and_keeps_order() {
        let ledger = OrderLedger::new(Store::in_memory());
        let a = ledger.create(request("loc-1", &[("item-1", 1)])).await.unwrap();
        let b = ledger.create(request("loc-1", &[("item-2", 1)])).await.unwrap();
        let c = ledger.create(request("loc-2", &[("item-3", 1)])).await.unwrap();

        assert_eq!(ledger.delete(&b.id).await.unwrap(), WriteOutcome::Applied);
        assert_eq!(ledger.delete(&b.id).await.unwrap(), WriteOutcome::NoOp);
        assert_eq!(ledger.delete("ord-never").await.unwrap(), WriteOutcome::NoOp);

        assert_eq!(ledger.list_all().await.unwrap(), vec![a.clone(), c]);
        assert_eq!(ledger.list_by_location("loc-1").await.unwrap(), vec![a]);
    }

    #[tokio::test]
    async fn test_complete_missing_order() {
        let ledger = OrderLedger::new(Store::in_memory());
        assert!(matches!(
            ledger.complete("ord-x").await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}
