//! Client-side view state mirrored from server answers.

pub mod follow;
pub mod interaction;

pub use follow::{FollowOutcome, FollowState};
pub use interaction::{InteractionState, Snapshot};
