//! Reaction-based input source over gateway events.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use pager_core::{ActorId, InputSource, InputSubscription, InputWait, TextWait};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::warn;
use twilight_http::Client;
use twilight_http::request::channel::reaction::RequestReactionType;
use twilight_model::id::Id;

use crate::renderer::MessageRef;
use crate::router::{ReactionRouter, RoutedInput};

/// Input source feeding router-delivered gateway events into sessions.
pub struct GatewayInputSource {
    http: Arc<Client>,
    router: Arc<ReactionRouter>,
}

impl GatewayInputSource {
    pub fn new(http: Arc<Client>, router: Arc<ReactionRouter>) -> Self {
        Self { http, router }
    }
}

#[async_trait]
impl InputSource<MessageRef> for GatewayInputSource {
    type Subscription = ReactionSubscription;

    async fn attach(
        &self,
        handle: &MessageRef,
        keys: &[String],
    ) -> anyhow::Result<ReactionSubscription> {
        let rx = self.router.register(handle.channel_id, handle.message_id);

        // Seeding the trigger reactions is best-effort; a missing
        // permission degrades the controls, it does not kill the session.
        for key in keys {
            if let Err(err) = self
                .http
                .create_reaction(handle.channel_id, handle.message_id, &request_reaction(key))
                .await
            {
                warn!(%key, error = ?err, "failed to seed trigger reaction");
            }
        }

        Ok(ReactionSubscription {
            http: Arc::clone(&self.http),
            router: Arc::clone(&self.router),
            handle: *handle,
            rx,
            pending: VecDeque::new(),
        })
    }
}

/// Live reaction stream for one presented message.
pub struct ReactionSubscription {
    http: Arc<Client>,
    router: Arc<ReactionRouter>,
    handle: MessageRef,
    rx: mpsc::UnboundedReceiver<RoutedInput>,
    pending: VecDeque<RoutedInput>,
}

#[async_trait]
impl InputSubscription for ReactionSubscription {
    async fn wait_next(&mut self, deadline: Instant) -> anyhow::Result<InputWait> {
        loop {
            let input = match self.pending.pop_front() {
                Some(input) => input,
                None => match tokio::time::timeout_at(deadline, self.rx.recv()).await {
                    Err(_) => return Ok(InputWait::TimedOut),
                    Ok(None) => anyhow::bail!("reaction stream closed"),
                    Ok(Some(input)) => input,
                },
            };

            match input {
                RoutedInput::Reaction { actor, key } => {
                    // Clear the actor's reaction so the key can be pressed again.
                    if let Err(err) = self
                        .http
                        .delete_reaction(
                            self.handle.channel_id,
                            self.handle.message_id,
                            &request_reaction(&key),
                            Id::new(actor),
                        )
                        .await
                    {
                        warn!(error = ?err, "failed to clear actor reaction");
                    }

                    return Ok(InputWait::Reaction { actor, key });
                }
                // Channel chatter while no prompt is waiting.
                RoutedInput::Text { .. } => {}
            }
        }
    }

    async fn wait_text(&mut self, actor: ActorId, deadline: Instant) -> anyhow::Result<TextWait> {
        loop {
            let input = match tokio::time::timeout_at(deadline, self.rx.recv()).await {
                Err(_) => return Ok(TextWait::TimedOut),
                Ok(None) => anyhow::bail!("reaction stream closed"),
                Ok(Some(input)) => input,
            };

            match input {
                reaction @ RoutedInput::Reaction { .. } => {
                    // Reactions stay queued for the main wait.
                    self.pending.push_back(reaction);
                }
                RoutedInput::Text {
                    actor: author,
                    body,
                    message_id,
                } if author == actor => {
                    // Tidy the reply away, best-effort.
                    if let Err(err) = self
                        .http
                        .delete_message(self.handle.channel_id, message_id)
                        .await
                    {
                        warn!(error = ?err, "failed to delete jump reply");
                    }

                    return Ok(TextWait::Text(body));
                }
                RoutedInput::Text { .. } => {}
            }
        }
    }

    async fn dispose(&mut self) -> anyhow::Result<()> {
        self.router.unregister(self.handle.message_id);
        self.rx.close();

        if let Err(err) = self
            .http
            .delete_all_reactions(self.handle.channel_id, self.handle.message_id)
            .await
        {
            warn!(error = ?err, "failed to clear trigger reactions");
        }

        Ok(())
    }
}

/// Parse a trigger key into a reaction request.
///
/// `name:id` selects a custom emoji; anything else is unicode.
fn request_reaction(key: &str) -> RequestReactionType<'_> {
    if let Some((name, id)) = key.rsplit_once(':')
        && let Ok(id) = id.parse::<u64>()
        && id > 0
    {
        return RequestReactionType::Custom {
            id: Id::new(id),
            name: Some(name),
        };
    }

    RequestReactionType::Unicode { name: key }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_keys_are_unicode_reactions() {
        assert!(matches!(
            request_reaction("▶"),
            RequestReactionType::Unicode { name: "▶" }
        ));
        assert!(matches!(
            request_reaction("no-id:here"),
            RequestReactionType::Unicode { .. }
        ));
    }

    #[test]
    fn name_id_keys_are_custom_reactions() {
        match request_reaction("blob:123") {
            RequestReactionType::Custom { id, name } => {
                assert_eq!(id.get(), 123);
                assert_eq!(name, Some("blob"));
            }
            RequestReactionType::Unicode { .. } => panic!("expected custom reaction"),
        }
    }

    #[test]
    fn zero_ids_stay_unicode() {
        assert!(matches!(
            request_reaction("blob:0"),
            RequestReactionType::Unicode { .. }
        ));
    }
}
