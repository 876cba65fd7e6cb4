//! Discord embed-list renderer for pagination sessions.

use std::sync::Arc;

use async_trait::async_trait;
use pager_core::{ActorId, RenderContext, RenderOptions, RenderPort};
use twilight_http::Client;
use twilight_model::channel::message::embed::Embed;
use twilight_model::id::{
    Id,
    marker::{ChannelMarker, MessageMarker},
};

use crate::embed::{DEFAULT_EMBED_COLOR, build_page_embed, bulleted_page_description};

/// Reference to a live Discord message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub channel_id: Id<ChannelMarker>,
    pub message_id: Id<MessageMarker>,
}

/// One rendered page, ready to publish or apply in place.
pub struct PagePayload {
    embed: Embed,
    prepare: String,
}

/// Renders string elements as a bulleted embed list, one chunk per page.
///
/// Publishing is two-phase: the message is created with the prepare
/// placeholder so triggers can attach early, then edited to the embed.
pub struct EmbedListRenderer {
    http: Arc<Client>,
    channel_id: Id<ChannelMarker>,
    title: String,
    color: u32,
    per_page: usize,
}

impl EmbedListRenderer {
    /// Create a renderer targeting `channel_id`.
    pub fn new(
        http: Arc<Client>,
        channel_id: Id<ChannelMarker>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            http,
            channel_id,
            title: title.into(),
            color: DEFAULT_EMBED_COLOR,
            per_page: 10,
        }
    }

    /// Set the number of elements shown per page.
    pub fn per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    /// Set the embed accent color.
    pub fn color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }
}

#[async_trait]
impl RenderPort<String> for EmbedListRenderer {
    type Payload = PagePayload;
    type Handle = MessageRef;

    fn page_size(&self) -> usize {
        self.per_page
    }

    fn render(&self, ctx: RenderContext<'_, String>, options: &RenderOptions) -> PagePayload {
        let description = bulleted_page_description(ctx.elements, self.per_page, ctx.current_page);
        let embed = build_page_embed(
            &self.title,
            description,
            ctx.current_page,
            ctx.total_pages,
            options.show_page_indicator,
            self.color,
        );

        PagePayload {
            embed,
            prepare: options.prepare.clone(),
        }
    }

    async fn publish(&self, payload: PagePayload) -> anyhow::Result<MessageRef> {
        let message = self
            .http
            .create_message(self.channel_id)
            .content(&payload.prepare)
            .await?
            .model()
            .await?;

        let handle = MessageRef {
            channel_id: message.channel_id,
            message_id: message.id,
        };

        self.update(&handle, payload).await?;

        Ok(handle)
    }

    async fn update(&self, handle: &MessageRef, payload: PagePayload) -> anyhow::Result<()> {
        self.http
            .update_message(handle.channel_id, handle.message_id)
            .content(None)
            .embeds(Some(&[payload.embed]))
            .await?;

        Ok(())
    }

    async fn remove(&self, handle: &MessageRef) -> anyhow::Result<()> {
        self.http
            .delete_message(handle.channel_id, handle.message_id)
            .await?;

        Ok(())
    }

    async fn prompt(&self, origin: &MessageRef, text: String) -> anyhow::Result<MessageRef> {
        let message = self
            .http
            .create_message(origin.channel_id)
            .content(&text)
            .await?
            .model()
            .await?;

        Ok(MessageRef {
            channel_id: message.channel_id,
            message_id: message.id,
        })
    }

    fn mention(&self, actor: ActorId) -> String {
        format!("<@{actor}>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> EmbedListRenderer {
        let http = Arc::new(Client::new("test-token".to_owned()));
        EmbedListRenderer::new(http, Id::new(100), "Demo")
    }

    #[test]
    fn per_page_guards_against_zero() {
        assert_eq!(renderer().per_page(0).page_size(), 1);
        assert_eq!(renderer().per_page(25).page_size(), 25);
    }

    #[test]
    fn render_produces_the_page_embed() {
        let renderer = renderer().per_page(2);
        let elements: Vec<String> = ["a", "b", "c", "d"].map(str::to_owned).into();
        let options = RenderOptions {
            show_page_indicator: true,
            prepare: "Preparing...".to_owned(),
        };

        let payload = renderer.render(
            RenderContext {
                elements: &elements,
                current_page: 2,
                total_pages: 2,
            },
            &options,
        );

        assert_eq!(payload.embed.description.as_deref(), Some("- c\n- d"));
        assert_eq!(payload.embed.footer.unwrap().text, "Page 2/2");
        assert_eq!(payload.prepare, "Preparing...");
    }

    #[test]
    fn mention_uses_discord_syntax() {
        assert_eq!(renderer().mention(42), "<@42>");
    }
}
