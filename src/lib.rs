//! Chazu order coordination backend
//!
//! Persistence and service layer for a multi-location food service. HQ
//! broadcasts alerts and reviews aggregated demand; location managers submit
//! daily orders. All state lives in five JSON slots of a SQLite database.

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod poll;
pub mod reports;
pub mod seed;
pub mod services;

use chrono::NaiveDate;

use auth::SessionManager;
use config::Config;
use db::Store;
use errors::AppError;
use models::{Alert, Order};
use poll::AlertWatcher;
use reports::{AggregateFilter, AggregateReport, DailyOperations, Overview};
use services::{AlertService, LocationRegistry, MenuService, OrderLedger};

/// Every service wired to one shared store.
#[derive(Clone)]
pub struct Services {
    pub store: Store,
    pub sessions: SessionManager,
    pub menu: MenuService,
    pub locations: LocationRegistry,
    pub orders: OrderLedger,
    pub alerts: AlertService,
}

impl Services {
    pub fn new(store: Store) -> Self {
        Self {
            sessions: SessionManager::new(store.clone()),
            menu: MenuService::new(store.clone()),
            locations: LocationRegistry::new(store.clone()),
            orders: OrderLedger::new(store.clone()),
            alerts: AlertService::new(store.clone()),
            store,
        }
    }

    /// Open the configured database and seed any missing slots.
    pub async fn open(config: &Config) -> Result<Self, AppError> {
        let pool = db::init_database(&config.db_path).await?;
        let store = Store::sqlite(pool);
        seed::init_storage(&store).await?;
        Ok(Self::new(store))
    }

    /// HQ aggregate table over fresh order data.
    pub async fn aggregate(&self, filter: &AggregateFilter) -> Result<AggregateReport, AppError> {
        let orders = self.orders.list_all().await?;
        Ok(reports::aggregate(&orders, filter, self.menu.list_all_items()))
    }

    /// Submitted/missing status and production list for one day.
    pub async fn daily_operations(&self, date: NaiveDate) -> Result<DailyOperations, AppError> {
        let orders = self.orders.list_all().await?;
        let locations = self.locations.list().await?;
        Ok(reports::daily_operations(
            date,
            &orders,
            &locations,
            self.menu.list_all_items(),
        ))
    }

    pub async fn overview(&self) -> Result<Overview, AppError> {
        let orders = self.orders.list_all().await?;
        let locations = self.locations.list().await?;
        Ok(reports::overview(&orders, &locations, self.menu.list_all_items()))
    }

    pub async fn search_orders(&self, text: &str) -> Result<Vec<Order>, AppError> {
        let orders = self.orders.list_all().await?;
        let locations = self.locations.list().await?;
        Ok(reports::search_orders(&orders, &locations, text))
    }

    /// Alerts newest first, each with its live response ratio.
    pub async fn alert_progress(&self) -> Result<Vec<(Alert, f64)>, AppError> {
        let total = self.locations.list().await?.len();
        let mut alerts = self.alerts.list().await?;
        alerts.reverse();
        Ok(alerts
            .into_iter()
            .map(|alert| {
                let progress = alert.progress(total);
                (alert, progress)
            })
            .collect())
    }

    /// Refresh loop for a location dashboard.
    pub fn watch_alerts(&self, location_id: &str, config: &Config) -> AlertWatcher {
        AlertWatcher::new(self.alerts.clone(), location_id, config.poll_interval)
    }
}
