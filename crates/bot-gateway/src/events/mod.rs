//! Gateway events
//!
//! Event names sent by the gateway and the envelope inbound frames are decoded into.

mod envelope;
mod event_types;

pub use envelope::EventEnvelope;
pub use event_types::EventType;
