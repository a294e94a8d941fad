//! Message entities - inbound messages and outbound message requests

use super::user::{Member, User};
use serde::{Deserialize, Serialize};

/// A message as delivered by message events and returned by the REST API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub guild_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub edited_timestamp: String,
    #[serde(default)]
    pub mention_everyone: bool,
    #[serde(default)]
    pub author: Option<User>,
    #[serde(default)]
    pub member: Option<Member>,
    #[serde(default)]
    pub attachments: Vec<MessageAttachment>,
    #[serde(default)]
    pub mentions: Vec<User>,
    #[serde(default)]
    pub ark: Option<Ark>,
    #[serde(default)]
    pub direct_message: bool,
    /// Ordering key within a channel; not comparable across channels
    #[serde(default)]
    pub seq_in_channel: String,
    /// For direct messages: the guild the conversation was started from
    #[serde(default)]
    pub src_guild_id: String,
}

impl Message {
    /// Content with a leading `<@!bot>` mention stripped
    ///
    /// Messages that @-mention the bot start with the mention tag followed by a space.
    pub fn content_without_mention(&self) -> &str {
        let content = self.content.trim_start();
        if content.starts_with("<@") {
            if let Some(end) = content.find('>') {
                return content[end + 1..].trim();
            }
        }
        content.trim()
    }
}

/// Attachment reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAttachment {
    #[serde(default)]
    pub url: String,
}

/// Ark message template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ark {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub template_id: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kv: Vec<ArkKv>,
}

/// Ark key/value entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArkKv {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub obj: Vec<ArkObj>,
}

/// Ark object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArkObj {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub obj_kv: Vec<ArkObjKv>,
}

/// Ark object key/value entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArkObjKv {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
}

/// Outbound message request body
///
/// A message carrying `msg_id` or `event_id` is a passive reply; without them it is an
/// active message, which public bots may only send after asynchronous review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageToCreate {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ark: Option<Ark>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub msg_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub event_id: String,
}

impl MessageToCreate {
    /// Plain text message
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Passive reply to the given message
    #[must_use]
    pub fn reply_to(mut self, msg_id: impl Into<String>) -> Self {
        self.msg_id = msg_id.into();
        self
    }

    /// Check if this message replies to a message or an event
    #[inline]
    pub fn is_passive(&self) -> bool {
        !self.msg_id.is_empty() || !self.event_id.is_empty()
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(value: &i32) -> bool {
    *value == 0
}
