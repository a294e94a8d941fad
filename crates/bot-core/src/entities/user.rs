//! User and member entities

use serde::{Deserialize, Serialize};

/// A platform user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub bot: bool,
    /// openid of a specially linked application
    #[serde(default)]
    pub union_openid: String,
    /// Linked user account of the bot
    #[serde(default)]
    pub union_user_account: String,
}

/// Guild membership of a user (partial, as attached to messages)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub guild_id: String,
    #[serde(default)]
    pub joined_at: String,
    #[serde(default)]
    pub nick: String,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub op_user_id: String,
}
