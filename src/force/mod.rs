//! Force command resolution
//!
//! `ForceResolver` maps attach/detach/remoutfit force commands to concrete
//! item batches. Folder paths, attachment points, wearable types and item ids
//! all select candidates; worn state and folder names decide the rest.

mod resolver;

pub use resolver::{AttachMode, AttachmentRequest, ForceResolution, ForceResolver};
