//! Wire entities
//!
//! Shapes exchanged with the open platform over REST and the gateway.

mod gateway;
mod message;
mod user;

pub use gateway::{GatewayInfo, SessionStartLimit, ShardConfig};
pub use message::{Ark, ArkKv, ArkObj, ArkObjKv, Message, MessageAttachment, MessageToCreate};
pub use user::{Member, User};
