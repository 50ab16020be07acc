//! User and session models.

use serde::{Deserialize, Serialize};

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Headquarters: broadcasts alerts and reviews aggregated demand
    OverallManager,
    /// Runs a single location and submits its orders
    LocationManager,
}

/// A static user account.
///
/// `location_id` is present iff the role is [`Role::LocationManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password: String,
    pub role: Role,
    pub name: String,
    pub location_id: Option<String>,
}

/// The persisted identity of the single active client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub role: Role,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
}

impl From<&User> for Session {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            role: user.role,
            name: user.name.clone(),
            location_id: match user.role {
                Role::LocationManager => user.location_id.clone(),
                Role::OverallManager => None,
            },
        }
    }
}
