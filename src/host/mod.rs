//! Host collaborators
//!
//! The engine reads avatar state through `QueryProvider` and performs side
//! effects through `ActionSink`. Both are async and take the cancellation
//! token passed to `RlvEngine::process_message`.
//!
//! `MemoryHost` implements both against in-memory state and records actions.

mod memory;
mod traits;
mod types;

pub use memory::MemoryHost;
pub use traits::{ActionSink, QueryProvider};
pub use types::{
    CameraSettings, GroupSelector, HeightAdjustment, HostAction, SettingKind, TeleportRequest,
};
