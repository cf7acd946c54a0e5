//! Permission evaluation
//!
//! `PermissionEvaluator` borrows the restriction store and answers
//! `can_*` questions without side effects:
//!
//! 1. No entry for the action's family: allowed.
//! 2. A restriction with no matching exception: denied.
//! 3. Exceptions match by discriminator (user, group or `allgroups`, channel,
//!    object); secure restrictions only honor exceptions from their own sender.
//! 4. Scoped restrictions (point, layer, target) are checked alongside blanket
//!    ones and any denial wins.
//! 5. Threshold checks return `(unrestricted, limit)`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use rlv_engine::permissions::{ImTarget, PermissionEvaluator};
//!
//! let eval = PermissionEvaluator::new(engine.restrictions());
//! if !eval.can_send_im(ImTarget::Avatar(friend)) {
//!     return;
//! }
//! let (free, max_distance) = eval.can_sit_tp();
//! ```

mod camera;
mod evaluator;
mod interaction;
mod wearing;

pub use camera::CameraRestrictions;
pub use evaluator::{ChatKind, ChatVolume, ImTarget, PermissionEvaluator};
pub use interaction::{EditTarget, HoverTextLocation, TouchTarget};
