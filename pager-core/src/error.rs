//! Error taxonomy for pagination sessions.

use thiserror::Error;

/// Errors produced by pagination sessions.
///
/// `Config` rejects session startup; `OutOfRange`, `ReservedKey`,
/// `DuplicateKey`, and `Dispatch` are recovered locally without stopping
/// a running session; `Platform` is fatal to the session instance.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Invalid configuration detected before the session starts.
    #[error("invalid session configuration: {0}")]
    Config(String),

    /// A jump request outside the valid page range.
    #[error("page {requested} is outside 1..={total_pages}")]
    OutOfRange { requested: usize, total_pages: usize },

    /// An action registration collides with an enabled navigation key.
    #[error("key {key:?} is reserved by an enabled navigation trigger")]
    ReservedKey { key: String },

    /// A navigation rebind collides with another enabled trigger.
    #[error("key {key:?} is already bound to another enabled trigger")]
    DuplicateKey { key: String },

    /// A registered action callback failed while dispatching.
    #[error("action callback for {key:?} failed")]
    Dispatch {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// The underlying message or channel became unusable.
    #[error("platform operation failed")]
    Platform(#[source] anyhow::Error),
}
