//! Client-driven alert refresh.
//!
//! There is no push channel: a location dashboard learns about a new alert only
//! by polling. [`AlertWatcher`] runs that loop on a fixed interval and forwards
//! each newly pending alert once. Delivery is best-effort; a watcher that is not
//! running sees nothing.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::models::Alert;
use crate::services::AlertService;

pub struct AlertWatcher {
    alerts: AlertService,
    location_id: String,
    interval: Duration,
}

impl AlertWatcher {
    pub fn new(alerts: AlertService, location_id: impl Into<String>, interval: Duration) -> Self {
        Self {
            alerts,
            location_id: location_id.into(),
            interval,
        }
    }

    /// Start polling in a background task. The task ends when the receiver is dropped.
    pub fn spawn(self) -> (JoinHandle<()>, mpsc::Receiver<Alert>) {
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(self.run(tx));
        (handle, rx)
    }

    pub async fn run(self, tx: mpsc::Sender<Alert>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_sent: Option<String> = None;

        tracing::debug!(location_id = %self.location_id, interval = ?self.interval, "Alert watcher started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = tx.closed() => break,
            }

            match self.alerts.pending_for(&self.location_id).await {
                Ok(Some(alert)) if last_sent.as_deref() != Some(alert.id.as_str()) => {
                    last_sent = Some(alert.id.clone());
                    if tx.send(alert).await.is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(location_id = %self.location_id, "Alert refresh failed: {}", e),
            }
        }

        tracing::debug!(location_id = %self.location_id, "Alert watcher stopped");
    }
}
