//! Order model.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Item id to strictly positive quantity.
pub type OrderItems = BTreeMap<String, u32>;

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Submitted,
    Completed,
}

/// A location's request for item quantities on a given day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub location_id: String,
    pub date: NaiveDate,
    pub items: OrderItems,
    #[serde(default)]
    pub manager_notes: String,
    #[serde(default)]
    pub status: OrderStatus,
}

impl Order {
    /// Total number of units across all items.
    pub fn total_units(&self) -> u64 {
        self.items.values().map(|qty| u64::from(*qty)).sum()
    }
}

/// Input for creating an order. Quantities may be zero or negative; those
/// entries are dropped before the order is stored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub location_id: String,
    pub items: BTreeMap<String, i64>,
    #[serde(default)]
    pub manager_notes: String,
}

/// Full replacement of an existing order.
///
/// `date` and `status` are preserved from the stored order when left empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub id: String,
    pub location_id: String,
    pub items: BTreeMap<String, i64>,
    #[serde(default)]
    pub manager_notes: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

/// Keep only strictly positive quantities.
///
/// Non-positive entries are dropped. A quantity too large to store is a
/// validation error, never a silent drop.
pub fn positive_items<I>(items: I) -> Result<OrderItems, AppError>
where
    I: IntoIterator<Item = (String, i64)>,
{
    let mut kept = OrderItems::new();
    for (id, qty) in items {
        if qty <= 0 {
            continue;
        }
        let qty = u32::try_from(qty).map_err(|_| {
            AppError::Validation(format!("Quantity {} for item {} is too large", qty, id))
        })?;
        kept.insert(id, qty);
    }
    Ok(kept)
}
