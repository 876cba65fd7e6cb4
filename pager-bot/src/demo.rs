//! `!paginate` demo command wiring a session end to end.

use std::sync::Arc;

use tracing::{error, info, warn};
use twilight_http::Client;
use twilight_model::gateway::payload::incoming::MessageCreate;

use pager_core::{PaginatedSession, action};
use pager_twilight::{EmbedListRenderer, GatewayInputSource, ReactionRouter};

const COMMAND: &str = "!paginate";
const DEMO_ENTRIES: usize = 25;
const ENTRIES_PER_PAGE: usize = 10;

/// Start a demo pagination session when `msg` is the demo command.
///
/// The session runs on its own task; only the command author may
/// interact with it.
pub fn maybe_start_session(http: Arc<Client>, router: Arc<ReactionRouter>, msg: &MessageCreate) {
    if msg.author.bot || msg.content.trim() != COMMAND {
        return;
    }

    let elements: Vec<String> = (1..=DEMO_ENTRIES)
        .map(|i| format!("entry number {i}"))
        .collect();

    let renderer = EmbedListRenderer::new(Arc::clone(&http), msg.channel_id, "Demo List")
        .per_page(ENTRIES_PER_PAGE);
    let input = GatewayInputSource::new(http, router);
    let owner = msg.author.id.get();

    let session = PaginatedSession::new(renderer, input)
        .elements(elements)
        .authorized_actors([owner])
        .register_action(
            "⭐",
            action(|actor, ctx| async move {
                info!(actor, page = ctx.current_page, "page starred");
                Ok(())
            }),
        );

    let session = match session {
        Ok(session) => session,
        Err(err) => {
            warn!(error = ?err, "demo session rejected an action key");
            return;
        }
    };

    let (session, mut events) = session.subscribe();

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            info!(?event, "session notification");
        }
    });

    tokio::spawn(async move {
        match session.run().await {
            Ok(outcome) => info!(?outcome, "pagination session ended"),
            Err(err) => error!(error = ?err, "pagination session failed"),
        }
    });
}
