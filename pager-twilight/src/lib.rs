//! Discord bindings for `pager-core` sessions over the twilight stack.
//!
//! [`EmbedListRenderer`] renders string elements as a paginated embed
//! list; [`ReactionRouter`] plus [`GatewayInputSource`] feed gateway
//! reaction and message events into running sessions. The host owns the
//! gateway shard and calls [`ReactionRouter::route`] with every event.

/// Embed composition helpers.
pub mod embed;
/// Reaction input source.
pub mod input;
/// Embed-list render port.
pub mod renderer;
/// Gateway event fan-out.
pub mod router;

pub use input::{GatewayInputSource, ReactionSubscription};
pub use renderer::{EmbedListRenderer, MessageRef, PagePayload};
pub use router::ReactionRouter;
