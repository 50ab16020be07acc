//! Data models for the Chazu order coordinator.
//!
//! These models serialize with camelCase field names so stored slots stay
//! readable by the presentation clients.

mod alert;
mod location;
mod menu;
mod order;
mod user;

pub use alert::*;
pub use location::*;
pub use menu::*;
pub use order::*;
pub use user::*;
