//! Alert broadcast service.
//!
//! HQ broadcasts a prompt; each location acknowledges it by placing an order.
//! Creating an alert deactivates all earlier ones in the same slot write, so
//! the collection never holds two active alerts.

use chrono::Utc;

use crate::db::{Slot, Step, Store, WriteOutcome};
use crate::errors::AppError;
use crate::models::Alert;

#[derive(Clone)]
pub struct AlertService {
    store: Store,
}

impl AlertService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// All alerts, oldest first.
    pub async fn list(&self) -> Result<Vec<Alert>, AppError> {
        Ok(self.store.get(Slot::Alerts).await?.unwrap_or_default())
    }

    /// Broadcast a new alert, superseding every earlier one.
    pub async fn create(&self, text: &str) -> Result<Alert, AppError> {
        if text.trim().is_empty() {
            return Err(AppError::Validation("Alert text is required".to_string()));
        }

        let alert = Alert {
            id: format!("alert-{}", uuid::Uuid::new_v4()),
            text: text.to_string(),
            sent_at: Utc::now(),
            active: true,
            responded_locations: Vec::new(),
        };

        let superseded = self
            .store
            .modify(Slot::Alerts, Vec::new, |alerts: &mut Vec<Alert>| {
                let superseded = alerts.iter().filter(|a| a.active).count();
                for existing in alerts.iter_mut() {
                    existing.active = false;
                }
                alerts.push(alert.clone());
                Ok(Step::Commit(superseded))
            })
            .await?;

        tracing::info!(alert_id = %alert.id, superseded, "Broadcast alert");
        Ok(alert)
    }

    /// Most recently created alert, active or not.
    pub async fn latest(&self) -> Result<Option<Alert>, AppError> {
        Ok(self.list().await?.pop())
    }

    /// Latest alert if `location_id` has not answered it yet.
    pub async fn pending_for(&self, location_id: &str) -> Result<Option<Alert>, AppError> {
        Ok(self
            .latest()
            .await?
            .filter(|alert| !alert.has_responded(location_id)))
    }

    /// Record that a location answered an alert.
    ///
    /// Repeated calls and unknown alert ids leave the slot unchanged.
    pub async fn mark_responded(
        &self,
        alert_id: &str,
        location_id: &str,
    ) -> Result<WriteOutcome, AppError> {
        let outcome = self
            .store
            .modify(Slot::Alerts, Vec::new, |alerts: &mut Vec<Alert>| {
                match alerts.iter_mut().find(|alert| alert.id == alert_id) {
                    Some(alert) if !alert.has_responded(location_id) => {
                        alert.responded_locations.push(location_id.to_string());
                        Ok(Step::Commit(WriteOutcome::Applied))
                    }
                    Some(_) => Ok(Step::Skip(WriteOutcome::NoOp)),
                    None => {
                        tracing::debug!(alert_id, "Response for unknown alert ignored");
                        Ok(Step::Skip(WriteOutcome::NoOp))
                    }
                }
            })
            .await?;

        tracing::info!(alert_id, location_id, ?outcome, "Recorded alert response");
        Ok(outcome)
    }

    /// Responded share of `total_locations`, recomputed from the stored alert.
    pub async fn progress(
        &self,
        alert_id: &str,
        total_locations: usize,
    ) -> Result<Option<f64>, AppError> {
        Ok(self
            .list()
            .await?
            .iter()
            .find(|alert| alert.id == alert_id)
            .map(|alert| alert.progress(total_locations)))
    }
}
