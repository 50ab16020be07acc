//! Derived views over orders for HQ reporting.
//!
//! Everything here is a pure function of its inputs; nothing is stored.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::{Location, MenuItem, Order};

/// Optional filters for [`aggregate`]. `None` means "all".
#[derive(Debug, Clone, Default)]
pub struct AggregateFilter {
    pub year: Option<i32>,
    pub location_id: Option<String>,
}

impl AggregateFilter {
    pub fn matches(&self, order: &Order) -> bool {
        let year_ok = self.year.map_or(true, |year| order.date.year() == year);
        let location_ok = self
            .location_id
            .as_deref()
            .map_or(true, |id| order.location_id == id);
        year_ok && location_ok
    }
}

/// Demand for one menu item across the matching orders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemAggregate {
    pub item_id: String,
    pub name: String,
    pub total_quantity: u64,
    /// Matching orders containing at least one unit of the item
    pub order_count: u64,
}

impl ItemAggregate {
    /// Mean units per containing order. Never divides by zero: an aggregate
    /// only exists once an order contributed to it.
    pub fn average_per_order(&self) -> f64 {
        self.total_quantity as f64 / self.order_count.max(1) as f64
    }
}

/// Aggregate table plus the number of orders it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    pub items: Vec<ItemAggregate>,
    pub orders_analyzed: usize,
}

fn item_name(catalog: &[MenuItem], id: &str) -> String {
    catalog
        .iter()
        .find(|item| item.id == id)
        .map(|item| item.name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn location_name<'a>(locations: &'a [Location], id: &'a str) -> &'a str {
    locations
        .iter()
        .find(|loc| loc.id == id)
        .map(|loc| loc.name.as_str())
        .unwrap_or(id)
}

/// Sum quantities and count containing orders per item.
///
/// Output is sorted by total quantity (largest first) then item id, so the
/// result does not depend on the order of `orders`.
pub fn aggregate(orders: &[Order], filter: &AggregateFilter, catalog: &[MenuItem]) -> AggregateReport {
    let mut totals: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    let mut orders_analyzed = 0;

    for order in orders.iter().filter(|order| filter.matches(order)) {
        orders_analyzed += 1;
        for (item_id, qty) in order.items.iter().filter(|(_, qty)| **qty > 0) {
            let entry = totals.entry(item_id.as_str()).or_insert((0, 0));
            entry.0 += u64::from(*qty);
            entry.1 += 1;
        }
    }

    let mut items: Vec<ItemAggregate> = totals
        .into_iter()
        .map(|(item_id, (total_quantity, order_count))| ItemAggregate {
            item_id: item_id.to_string(),
            name: item_name(catalog, item_id),
            total_quantity,
            order_count,
        })
        .collect();
    items.sort_by(|a, b| {
        b.total_quantity
            .cmp(&a.total_quantity)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });

    AggregateReport {
        items,
        orders_analyzed,
    }
}

/// Distinct order years, newest first.
pub fn available_years(orders: &[Order]) -> Vec<i32> {
    let years: BTreeSet<i32> = orders.iter().map(|order| order.date.year()).collect();
    years.into_iter().rev().collect()
}

/// Locations with no order dated `date`.
pub fn missing_locations(date: NaiveDate, orders: &[Order], locations: &[Location]) -> Vec<Location> {
    let submitted = submitted_location_ids(date, orders);
    locations
        .iter()
        .filter(|loc| !submitted.contains(loc.id.as_str()))
        .cloned()
        .collect()
}

fn submitted_location_ids(date: NaiveDate, orders: &[Order]) -> HashSet<&str> {
    orders
        .iter()
        .filter(|order| order.date == date)
        .map(|order| order.location_id.as_str())
        .collect()
}

/// Whether a location has submitted for the day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationStatus {
    pub location: Location,
    pub submitted: bool,
}

/// One line of the master production list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub item_id: String,
    pub name: String,
    pub quantity: u64,
}

/// Per-day operations sheet: who ordered and what must be produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyOperations {
    pub date: NaiveDate,
    pub statuses: Vec<LocationStatus>,
    pub requirements: Vec<Requirement>,
}

impl DailyOperations {
    pub fn missing(&self) -> impl Iterator<Item = &Location> {
        self.statuses
            .iter()
            .filter(|status| !status.submitted)
            .map(|status| &status.location)
    }
}

pub fn daily_operations(
    date: NaiveDate,
    orders: &[Order],
    locations: &[Location],
    catalog: &[MenuItem],
) -> DailyOperations {
    let submitted = submitted_location_ids(date, orders);
    let statuses = locations
        .iter()
        .map(|loc| LocationStatus {
            location: loc.clone(),
            submitted: submitted.contains(loc.id.as_str()),
        })
        .collect();

    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for order in orders.iter().filter(|order| order.date == date) {
        for (item_id, qty) in &order.items {
            *totals.entry(item_id.as_str()).or_default() += u64::from(*qty);
        }
    }

    let requirements = totals
        .into_iter()
        .map(|(item_id, quantity)| Requirement {
            item_id: item_id.to_string(),
            name: item_name(catalog, item_id),
            quantity,
        })
        .collect();

    DailyOperations {
        date,
        statuses,
        requirements,
    }
}

/// Headline numbers for the HQ dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_orders: usize,
    pub location_count: usize,
    /// All-time units per item, largest first
    pub item_totals: Vec<Requirement>,
}

pub fn overview(orders: &[Order], locations: &[Location], catalog: &[MenuItem]) -> Overview {
    let report = aggregate(orders, &AggregateFilter::default(), catalog);
    Overview {
        total_orders: orders.len(),
        location_count: locations.len(),
        item_totals: report
            .items
            .into_iter()
            .map(|item| Requirement {
                item_id: item.item_id,
                name: item.name,
                quantity: item.total_quantity,
            })
            .collect(),
    }
}

/// Orders whose location name (case-insensitive) or `YYYY-MM-DD` date
/// contains `text`. Orders for deleted locations match on their id.
pub fn search_orders(orders: &[Order], locations: &[Location], text: &str) -> Vec<Order> {
    let needle = text.to_lowercase();
    orders
        .iter()
        .filter(|order| {
            location_name(locations, &order.location_id)
                .to_lowercase()
                .contains(&needle)
                || order.date.to_string().contains(text)
        })
        .cloned()
        .collect()
}
