//! Connection management
//!
//! Per-shard connection state machine, its read and dispatch pumps, the session retry queue and
//! the manager that paces session starts.

mod connection;
mod manager;
mod pumps;
mod session;

pub use connection::{ConnectionConfig, ConnectionState, FrameSink, FrameStream, GatewayConnection};
pub use manager::{ManagerConfig, SessionManager};
pub use session::{Session, SessionQueue};
