//! Gateway event fan-out to per-message pagination subscriptions.

use std::collections::HashMap;
use std::sync::Mutex;

use pager_core::ActorId;
use tokio::sync::mpsc;
use twilight_model::channel::message::EmojiReactionType;
use twilight_model::gateway::event::Event;
use twilight_model::id::{
    Id,
    marker::{ChannelMarker, MessageMarker, UserMarker},
};

/// Input routed to one subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RoutedInput {
    Reaction {
        actor: ActorId,
        key: String,
    },
    Text {
        actor: ActorId,
        body: String,
        message_id: Id<MessageMarker>,
    },
}

struct RouteEntry {
    channel_id: Id<ChannelMarker>,
    tx: mpsc::UnboundedSender<RoutedInput>,
}

/// Fans incoming gateway events out to pagination subscriptions.
///
/// The host's gateway loop feeds every event through
/// [`ReactionRouter::route`]; reactions are matched to subscriptions by
/// message, channel messages by channel (for jump prompts). Events
/// caused by the bot itself are dropped so trigger seeding never
/// dispatches.
pub struct ReactionRouter {
    self_id: Id<UserMarker>,
    entries: Mutex<HashMap<Id<MessageMarker>, RouteEntry>>,
}

impl ReactionRouter {
    /// Create a router for a bot running as `self_id`.
    pub fn new(self_id: Id<UserMarker>) -> Self {
        Self {
            self_id,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Feed one gateway event through the router.
    pub fn route(&self, event: &Event) {
        match event {
            Event::ReactionAdd(reaction) => {
                self.deliver_reaction(
                    reaction.message_id,
                    reaction.user_id,
                    reaction_key(&reaction.emoji),
                );
            }
            Event::MessageCreate(message) => {
                self.deliver_text(
                    message.channel_id,
                    message.author.id,
                    message.author.bot,
                    &message.content,
                    message.id,
                );
            }
            _ => {}
        }
    }

    fn deliver_reaction(&self, message_id: Id<MessageMarker>, user_id: Id<UserMarker>, key: String) {
        if user_id == self.self_id {
            return;
        }

        let entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.get(&message_id) {
            let _ = entry.tx.send(RoutedInput::Reaction {
                actor: user_id.get(),
                key,
            });
        }
    }

    fn deliver_text(
        &self,
        channel_id: Id<ChannelMarker>,
        author_id: Id<UserMarker>,
        author_is_bot: bool,
        body: &str,
        message_id: Id<MessageMarker>,
    ) {
        if author_is_bot || author_id == self.self_id {
            return;
        }

        let entries = self.entries.lock().unwrap();
        for entry in entries.values().filter(|entry| entry.channel_id == channel_id) {
            let _ = entry.tx.send(RoutedInput::Text {
                actor: author_id.get(),
                body: body.to_owned(),
                message_id,
            });
        }
    }

    pub(crate) fn register(
        &self,
        channel_id: Id<ChannelMarker>,
        message_id: Id<MessageMarker>,
    ) -> mpsc::UnboundedReceiver<RoutedInput> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.entries
            .lock()
            .unwrap()
            .insert(message_id, RouteEntry { channel_id, tx });
        rx
    }

    pub(crate) fn unregister(&self, message_id: Id<MessageMarker>) {
        self.entries.lock().unwrap().remove(&message_id);
    }
}

/// Key string for a received reaction emoji.
fn reaction_key(emoji: &EmojiReactionType) -> String {
    match emoji {
        EmojiReactionType::Unicode { name } => name.clone(),
        EmojiReactionType::Custom {
            name: Some(name),
            id,
            ..
        } => format!("{name}:{id}"),
        EmojiReactionType::Custom { name: None, id, .. } => id.to_string(),
    }
}
