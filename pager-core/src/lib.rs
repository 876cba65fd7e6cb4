//! Reaction-driven pagination sessions for chat platforms.
//!
//! A session renders a collection of elements as pages inside a single
//! persistent message and lets a bounded set of actors navigate between
//! pages or trigger custom actions by pressing reaction-style keys,
//! without re-sending the message. The platform itself (message
//! publishing, reaction listening) stays behind the [`port`] traits;
//! adapters supply those.

/// Default timeout for reaction-based pagination sessions, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Actor authorization filtering.
pub mod auth;
/// Per-session configuration and render options.
pub mod config;
/// Session error taxonomy.
pub mod error;
/// Lifecycle notifications.
pub mod event;
/// Page cursor state and pure pagination math.
pub mod page;
/// Platform collaborator contracts.
pub mod port;
/// Navigation and action trigger registry.
pub mod registry;
/// The session interaction loop.
pub mod session;

pub use auth::{ActorId, AuthorizationFilter};
pub use config::{RenderOptions, SessionOptions, TextAssets};
pub use error::SessionError;
pub use event::{EventSink, SessionEvent};
pub use page::{NavDirection, PageState, clamp_page, page_window, parse_jump_reply, total_pages};
pub use port::{InputSource, InputSubscription, InputWait, RenderContext, RenderPort, TextWait};
pub use registry::{
    ActionCallback, ActionContext, NavSelector, NavTrigger, Resolved, TriggerRegistry, action,
};
pub use session::{PaginatedSession, SessionOutcome, StartPage};
