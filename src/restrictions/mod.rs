//! Restriction store
//!
//! This module provides:
//! - `Restriction` - one `(command, sender, param)` entry with its parsed behavior
//! - `RestrictionStore` - sender-scoped storage with extremum aggregation
//! - `RestrictionEvent` - add/remove notifications drained by the host

mod entry;
mod store;

pub use entry::{ExtremumKind, NotifyTarget, Restriction, RestrictionBehavior};
pub use store::{RestrictionEvent, RestrictionStore};
