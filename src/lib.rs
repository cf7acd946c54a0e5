//! RLV restriction and inventory resolution engine
//!
//! In-world objects send `@cmd[:option]=behavior` chat commands to an
//! avatar's viewer. This crate keeps the restrictions those commands impose,
//! answers whether an action is currently allowed, computes shared-folder
//! locks, resolves force commands into attach/detach batches and builds the
//! replies for `=<channel>` queries.

pub mod core;
pub mod inventory;
pub mod command;
pub mod restrictions;

// Derived state and evaluation
pub mod permissions;
pub mod locks;
pub mod force;
pub mod queries;

// Host collaborators and dispatch
pub mod host;
pub mod engine;

// Optional components
pub mod logging;

pub use crate::core::{AttachmentPoint, RlvError, RlvResult, WearableType};
pub use crate::engine::{EngineConfig, RlvEngine};
pub use crate::host::{ActionSink, MemoryHost, QueryProvider};
pub use crate::permissions::PermissionEvaluator;
pub use crate::restrictions::{Restriction, RestrictionEvent, RestrictionStore};
