//! # bot-gateway
//!
//! Sharded WebSocket gateway client.
//!
//! A [`SessionManager`] starts one [`GatewayConnection`] per shard, paced by the gateway's
//! session start limit. Each connection identifies (or resumes), keeps the heartbeat going and
//! hands dispatch events to the [`EventRouter`]. When a connection ends for any reason other than
//! a failed handshake, its session goes back to the manager's queue and is resumed.

pub mod connection;
pub mod error;
pub mod events;
pub mod interval;
pub mod protocol;
pub mod resume;
pub mod router;

pub use connection::{
    ConnectionConfig, ConnectionState, GatewayConnection, ManagerConfig, Session, SessionManager,
    SessionQueue,
};
pub use error::{ErrorKind, GatewayError, GatewayResult};
pub use events::{EventEnvelope, EventType};
pub use interval::IntervalCalculator;
pub use resume::ResumeSignal;
pub use router::{EventRouter, MessageHandler};
