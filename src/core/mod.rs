//! Core types shared by every engine layer
//!
//! - `AttachmentPoint` / `WearableType` - the body locations items are worn on
//! - `RlvError` - Error types

pub mod attachment;
pub mod error;
pub mod wearable;

pub use attachment::AttachmentPoint;
pub use error::{RlvError, RlvResult};
pub use wearable::WearableType;

/// The null key used in replies when no object applies
pub const NULL_KEY: &str = "00000000-0000-0000-0000-000000000000";
