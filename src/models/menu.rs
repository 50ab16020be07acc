//! Menu catalog model.

use serde::{Deserialize, Serialize};

/// Broad menu category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Drink,
}

/// A purchasable menu item. Catalog entries are compiled in and never mutate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub category: Category,
}

impl MenuItem {
    pub fn new(id: &str, name: &str, category: Category) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category,
        }
    }
}
