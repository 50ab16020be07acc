//! Broadcast alert model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A prompt broadcast by headquarters to every location.
///
/// Only the newest alert carries `active = true`. `responded_locations` grows
/// monotonically and never holds duplicates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub text: String,
    pub sent_at: DateTime<Utc>,
    pub active: bool,
    #[serde(default)]
    pub responded_locations: Vec<String>,
}

impl Alert {
    pub fn has_responded(&self, location_id: &str) -> bool {
        self.responded_locations.iter().any(|id| id == location_id)
    }

    pub fn responded_count(&self) -> usize {
        self.responded_locations.len()
    }

    /// Responded count over `total_locations`. Zero when there are no
    /// locations at all.
    ///
    /// Responses are kept after their location is deleted, so the ratio can
    /// exceed 1.
    pub fn progress(&self, total_locations: usize) -> f64 {
        if total_locations == 0 {
            return 0.0;
        }
        self.responded_count() as f64 / total_locations as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(responded: &[&str]) -> Alert {
        Alert {
            id: "alert-1".to_string(),
            text: "Order please".to_string(),
            sent_at: Utc::now(),
            active: true,
            responded_locations: responded.iter().map(|id| id.to_string()).collect(),
        }
    }

    #[test]
    fn test_progress_counts_responses_from_deleted_locations() {
        let alert = alert(&["loc-1", "loc-2"]);
        assert_eq!(alert.progress(4), 0.5);
        assert_eq!(alert.progress(1), 2.0);
        assert_eq!(alert.progress(0), 0.0);
    }
}
