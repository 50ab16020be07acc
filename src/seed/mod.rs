//! Compiled-in reference data and first-run demo data.
//!
//! The catalog and user list are static and never persisted. Locations,
//! availability and the demo orders are written into their slots the first
//! time storage is opened.

use chrono::NaiveDate;

use crate::db::{Slot, Store};
use crate::errors::AppError;
use crate::models::{
    Category, Location, MenuItem, Order, OrderItems, OrderStatus, Role, User,
};

/// The full menu catalog in display order.
pub fn menu_items() -> Vec<MenuItem> {
    vec![
        MenuItem::new("item-1", "Bagel with Cream Cheese", Category::Food),
        MenuItem::new("item-2", "Scrambled Eggs", Category::Food),
        MenuItem::new("item-3", "Croissant", Category::Food),
        MenuItem::new("item-4", "Black Coffee", Category::Drink),
        MenuItem::new("item-5", "Orange Juice", Category::Drink),
    ]
}

/// Accounts allowed to log in.
pub fn users() -> Vec<User> {
    let user = |id: &str, username: &str, role: Role, name: &str, location: Option<&str>| User {
        id: id.to_string(),
        username: username.to_string(),
        password: "123".to_string(),
        role,
        name: name.to_string(),
        location_id: location.map(str::to_string),
    };

    vec![
        user("u1", "admin", Role::OverallManager, "Sarah Smith", None),
        user("u2", "mgr1", Role::LocationManager, "John Doe", Some("loc-1")),
        user("u3", "mgr2", Role::LocationManager, "Jane Roe", Some("loc-2")),
        user("u4", "mgr3", Role::LocationManager, "Bob Guy", Some("loc-3")),
    ]
}

/// Locations present before HQ edits anything.
pub fn default_locations() -> Vec<Location> {
    vec![
        Location::new("loc-1", "Downtown Branch"),
        Location::new("loc-2", "Westside Campus"),
        Location::new("loc-3", "Uptown Hub"),
    ]
}

/// Every catalog id, the default availability selection.
pub fn all_item_ids() -> Vec<String> {
    menu_items().into_iter().map(|item| item.id).collect()
}

/// Two historical, completed orders.
pub fn demo_orders() -> Vec<Order> {
    let day = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap_or_default();
    let items = |entries: &[(&str, u32)]| -> OrderItems {
        entries
            .iter()
            .map(|(id, qty)| (id.to_string(), *qty))
            .collect()
    };

    vec![
        Order {
            id: "ord-101".to_string(),
            location_id: "loc-1".to_string(),
            date: day,
            items: items(&[("item-1", 5), ("item-4", 10)]),
            manager_notes: "Extra cream cheese please".to_string(),
            status: OrderStatus::Completed,
        },
        Order {
            id: "ord-102".to_string(),
            location_id: "loc-2".to_string(),
            date: day,
            items: items(&[("item-2", 10), ("item-5", 5)]),
            manager_notes: String::new(),
            status: OrderStatus::Completed,
        },
    ]
}

/// Seed missing slots. Safe to call on every start; existing data is kept.
///
/// `session` and `alerts` are never seeded.
pub async fn init_storage(store: &Store) -> Result<(), AppError> {
    store.seed_if_absent(Slot::Orders, demo_orders).await?;
    store
        .seed_if_absent(Slot::AvailableItems, all_item_ids)
        .await?;
    store
        .seed_if_absent(Slot::Locations, default_locations)
        .await?;
    Ok(())
}
