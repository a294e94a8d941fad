//! @-mention echo handler
//!
//! Replies to every message that mentions the bot with the message text, mention removed.

use anyhow::Context;
use async_trait::async_trait;
use bot_api::ApiClient;
use bot_core::{Message, MessageToCreate};
use bot_gateway::{EventEnvelope, MessageHandler};

pub struct EchoHandler {
    api: ApiClient,
}

impl EchoHandler {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

/// Passive reply to `message`, or `None` if there is nothing to echo
fn reply_for(message: &Message) -> Option<MessageToCreate> {
    let content = message.content_without_mention();
    if content.is_empty() {
        return None;
    }
    Some(MessageToCreate::text(content).reply_to(message.id.as_str()))
}

#[async_trait]
impl MessageHandler for EchoHandler {
    async fn handle(&self, event: &EventEnvelope, message: Message) -> anyhow::Result<()> {
        let Some(reply) = reply_for(&message) else {
            tracing::debug!(message_id = %message.id, "Empty mention, nothing to reply");
            return Ok(());
        };

        tracing::debug!(
            seq = ?event.seq,
            channel_id = %message.channel_id,
            message_id = %message.id,
            "Replying to mention"
        );
        self.api
            .post_message(&message.channel_id, &reply)
            .await
            .with_context(|| format!("failed to reply in channel {}", message.channel_id))?;
        Ok(())
    }
}
