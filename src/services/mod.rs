//! Domain services over the slot store.
//!
//! Each service owns one slot and returns fresh snapshots after every call.
//! None of them call each other; the presentation layer wires order creation
//! to alert acknowledgement.

mod alerts;
mod locations;
mod menu;
mod orders;

pub use alerts::*;
pub use locations::*;
pub use menu::*;
pub use orders::*;
