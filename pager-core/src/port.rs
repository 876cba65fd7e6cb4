//! Collaborator contracts between the session core and a chat platform.
//!
//! The core owns the navigation state machine and nothing else. Turning
//! `(elements, page)` into a presentable payload, publishing it, and
//! listening for actor input all live behind these traits so the same
//! loop drives any platform adapter.

use async_trait::async_trait;
use tokio::time::Instant;

use crate::auth::ActorId;
use crate::config::RenderOptions;

/// Snapshot of renderable state handed to renderers and action callbacks.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a, T> {
    /// The full element collection backing the session.
    pub elements: &'a [T],
    /// Current page, 1-based.
    pub current_page: usize,
    /// Total page count.
    pub total_pages: usize,
}

/// Renders pages and manages the lifetime of the presented message.
///
/// Implementations decide the page-size policy (one element per page or
/// chunked grouping) via [`RenderPort::page_size`]; the core never
/// inspects payloads beyond passing them back to the port.
#[async_trait]
pub trait RenderPort<T>: Send + Sync {
    /// Platform payload produced for one page.
    type Payload: Send;
    /// Opaque reference to the live presented message.
    type Handle: Clone + Send + Sync;

    /// Elements shown per page.
    fn page_size(&self) -> usize;

    /// Turn the current elements and page into a presentable payload.
    fn render(&self, ctx: RenderContext<'_, T>, options: &RenderOptions) -> Self::Payload;

    /// Publish the first payload, creating the presented message.
    async fn publish(&self, payload: Self::Payload) -> anyhow::Result<Self::Handle>;

    /// Replace the presented message content in place.
    async fn update(&self, handle: &Self::Handle, payload: Self::Payload) -> anyhow::Result<()>;

    /// Remove a message previously created by this port.
    async fn remove(&self, handle: &Self::Handle) -> anyhow::Result<()>;

    /// Publish a transient prompt near the presented message.
    async fn prompt(&self, origin: &Self::Handle, text: String) -> anyhow::Result<Self::Handle>;

    /// Expand an actor id into a platform mention for prompt templates.
    fn mention(&self, actor: ActorId) -> String {
        actor.to_string()
    }
}

/// One received reaction input, or the deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputWait {
    /// An actor pressed a trigger key.
    Reaction { actor: ActorId, key: String },
    /// The deadline elapsed first.
    TimedOut,
}

/// Reply to a textual sub-prompt, or the deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextWait {
    /// The prompted actor replied with this body.
    Text(String),
    /// The deadline elapsed first.
    TimedOut,
}

/// Source of actor input tied to a presented message.
#[async_trait]
pub trait InputSource<H>: Send + Sync {
    /// Live input stream produced by [`InputSource::attach`].
    type Subscription: InputSubscription;

    /// Attach the given trigger keys to the message and start listening.
    ///
    /// Seeding individual trigger keys onto the message is best-effort;
    /// only failure to produce a subscription at all is fatal.
    async fn attach(&self, handle: &H, keys: &[String]) -> anyhow::Result<Self::Subscription>;
}

/// Live input stream for one presented message.
#[async_trait]
pub trait InputSubscription: Send {
    /// Wait for the next reaction input until `deadline`.
    ///
    /// Inputs arriving while the session is dispatching are queued and
    /// returned by later calls in arrival order.
    async fn wait_next(&mut self, deadline: Instant) -> anyhow::Result<InputWait>;

    /// Wait for a textual reply from `actor` until `deadline`.
    async fn wait_text(&mut self, actor: ActorId, deadline: Instant) -> anyhow::Result<TextWait>;

    /// Stop listening and detach the triggers from the message.
    async fn dispose(&mut self) -> anyhow::Result<()>;
}
