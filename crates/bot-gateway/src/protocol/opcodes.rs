//! Gateway operation codes

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Gateway operation codes
///
/// Op codes define the type of frame being sent or received over the WebSocket connection.
/// Codes this client does not know decode to [`OpCode::Unknown`] so the frame still flows
/// through sequence tracking and delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    /// Server pushes an event (server only)
    Dispatch,
    /// Keep the connection alive, carries the last sequence (client only)
    Heartbeat,
    /// Authenticate a new session (client only)
    Identify,
    /// Continue an existing session (client only)
    Resume,
    /// Server asks the client to reconnect (server only)
    Reconnect,
    /// Identify or Resume was rejected (server only)
    InvalidSession,
    /// Sent on connect with the heartbeat interval (server only)
    Hello,
    /// Heartbeat acknowledged (server only)
    HeartbeatAck,
    /// HTTP callback acknowledged (server only)
    HttpCallbackAck,
    /// Any other op code, kept as received
    Unknown(u8),
}

impl OpCode {
    /// Create an `OpCode` from a raw integer value
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Dispatch,
            1 => Self::Heartbeat,
            2 => Self::Identify,
            6 => Self::Resume,
            7 => Self::Reconnect,
            9 => Self::InvalidSession,
            10 => Self::Hello,
            11 => Self::HeartbeatAck,
            12 => Self::HttpCallbackAck,
            other => Self::Unknown(other),
        }
    }

    /// Get the raw integer value
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Dispatch => 0,
            Self::Heartbeat => 1,
            Self::Identify => 2,
            Self::Resume => 6,
            Self::Reconnect => 7,
            Self::InvalidSession => 9,
            Self::Hello => 10,
            Self::HeartbeatAck => 11,
            Self::HttpCallbackAck => 12,
            Self::Unknown(value) => value,
        }
    }

    /// Built-in ops are consumed by the connection and never reach handlers
    #[must_use]
    pub const fn is_builtin(self) -> bool {
        matches!(
            self,
            Self::Hello | Self::HeartbeatAck | Self::Reconnect | Self::InvalidSession
        )
    }

    /// Get the name of this op code
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dispatch => "Dispatch",
            Self::Heartbeat => "Heartbeat",
            Self::Identify => "Identify",
            Self::Resume => "Resume",
            Self::Reconnect => "Reconnect",
            Self::InvalidSession => "InvalidSession",
            Self::Hello => "Hello",
            Self::HeartbeatAck => "HeartbeatAck",
            Self::HttpCallbackAck => "HttpCallbackAck",
            Self::Unknown(_) => "Unknown",
        }
    }
}

impl Serialize for OpCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for OpCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        u8::deserialize(deserializer).map(Self::from_u8)
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u8())
    }
}
