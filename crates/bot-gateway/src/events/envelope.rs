//! Decoded inbound frame

use super::EventType;
use crate::protocol::{GatewayMessage, OpCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// One inbound frame, decoded once by the read pump and handed to the dispatch pump
///
/// `raw` keeps the original text so handlers can inspect fields this crate does not model.
#[derive(Debug, Clone)]
pub struct EventEnvelope {
    pub op: OpCode,
    pub seq: Option<u64>,
    pub event_type: Option<String>,
    pub event_id: Option<String>,
    pub data: Option<Value>,
    pub raw: String,
}

impl EventEnvelope {
    /// Decode a text frame
    pub fn decode(raw: impl Into<String>) -> Result<Self, serde_json::Error> {
        let raw = raw.into();
        let message = GatewayMessage::from_json(&raw)?;
        Ok(Self {
            op: message.op,
            seq: message.s,
            event_type: message.t,
            event_id: message.id,
            data: message.d,
            raw,
        })
    }

    /// Known event type, if the frame carries one
    #[must_use]
    pub fn event(&self) -> Option<EventType> {
        self.event_type.as_deref().and_then(EventType::from_name)
    }

    /// Sequence number, ignoring absent and zero values
    #[must_use]
    pub fn sequence(&self) -> Option<u64> {
        self.seq.filter(|seq| *seq > 0)
    }

    /// Deserialize the `d` field into a typed payload
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match &self.data {
            Some(data) => T::deserialize(data),
            None => T::deserialize(&Value::Null),
        }
    }
}
