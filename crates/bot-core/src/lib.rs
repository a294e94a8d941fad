//! # bot-core
//!
//! Domain layer containing the wire entities exchanged with the bot open platform,
//! authentication tokens, gateway intents and gateway bootstrap metadata.
//! This crate has zero dependencies on infrastructure (HTTP client, WebSocket, runtime).

pub mod entities;
pub mod error;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Ark, ArkKv, ArkObj, ArkObjKv, GatewayInfo, Member, Message, MessageAttachment,
    MessageToCreate, SessionStartLimit, ShardConfig, User,
};
pub use error::DomainError;
pub use value_objects::{Intents, Token};
