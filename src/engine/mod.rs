//! Command dispatch
//!
//! `RlvEngine` owns the restriction store and routes every parsed command:
//! restrictions go to the store (with `@notify` echoes), `=force` commands to
//! the force resolver and the host's `ActionSink`, and `=<channel>` queries to
//! the reply builders in `queries`.
//!
//! # Example
//!
//! ```rust,ignore
//! let host = Arc::new(MemoryHost::new());
//! let mut engine = RlvEngine::new(EngineConfig::default(), host.clone(), host.clone())?;
//!
//! let cancel = CancellationToken::new();
//! engine.process_message("@fly=n,notify:2222=add", collar, "Collar", &cancel).await;
//! assert!(!engine.permissions().can_fly());
//! ```

mod config;
mod force;
mod replies;
mod rlv_engine;

pub use config::EngineConfig;
pub use rlv_engine::RlvEngine;
