//! Event routing
//!
//! Maps `(op, event type)` to the handler registered for it. Handlers are registered before the
//! manager starts and the router is shared read-only by every connection afterwards.

use crate::error::{GatewayError, GatewayResult};
use crate::events::{EventEnvelope, EventType};
use crate::protocol::OpCode;
use async_trait::async_trait;
use bot_core::{Intents, Message};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Handler for message events (AT_MESSAGE_CREATE, MESSAGE_CREATE, DIRECT_MESSAGE_CREATE)
///
/// Errors are logged by the dispatch pump and do not affect the connection. Panics end the
/// connection and the session is resumed on a fresh one.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, event: &EventEnvelope, message: Message) -> anyhow::Result<()>;
}

#[async_trait]
impl<F, Fut> MessageHandler for F
where
    F: Fn(EventEnvelope, Message) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    async fn handle(&self, event: &EventEnvelope, message: Message) -> anyhow::Result<()> {
        (self)(event.clone(), message).await
    }
}

/// A registered handler, tagged by the payload it expects
#[derive(Clone)]
enum Route {
    Message(Arc<dyn MessageHandler>),
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(_) => f.write_str("Route::Message"),
        }
    }
}

/// Routes dispatch frames to registered handlers
#[derive(Debug, Default)]
pub struct EventRouter {
    routes: HashMap<OpCode, HashMap<EventType, Route>>,
}

impl EventRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle messages that @-mention the bot
    #[must_use]
    pub fn on_at_message(self, handler: impl MessageHandler + 'static) -> Self {
        self.register(EventType::AtMessageCreate, Route::Message(Arc::new(handler)))
    }

    /// Handle every guild message (private bots only)
    #[must_use]
    pub fn on_guild_message(self, handler: impl MessageHandler + 'static) -> Self {
        self.register(EventType::MessageCreate, Route::Message(Arc::new(handler)))
    }

    /// Handle direct messages
    #[must_use]
    pub fn on_direct_message(self, handler: impl MessageHandler + 'static) -> Self {
        self.register(EventType::DirectMessageCreate, Route::Message(Arc::new(handler)))
    }

    /// Registering twice for the same event replaces the earlier handler
    fn register(mut self, event: EventType, route: Route) -> Self {
        let replaced = self
            .routes
            .entry(OpCode::Dispatch)
            .or_default()
            .insert(event, route)
            .is_some();
        tracing::debug!(event = %event, replaced, "Handler registered");
        self
    }

    /// Union of intents needed by the registered handlers
    #[must_use]
    pub fn intents(&self) -> Intents {
        self.routes
            .values()
            .flat_map(HashMap::keys)
            .fold(Intents::empty(), |acc, event| acc | event.required_intents())
    }

    /// Run the handler registered for this frame
    ///
    /// Frames with no handler are ignored. A payload that does not decode is an error and the
    /// handler is not invoked.
    pub async fn dispatch(&self, envelope: &EventEnvelope) -> GatewayResult<()> {
        let Some(route) = self.lookup(envelope) else {
            tracing::trace!(
                op = %envelope.op,
                event = envelope.event_type.as_deref().unwrap_or_default(),
                "No handler registered, ignoring"
            );
            return Ok(());
        };

        match route {
            Route::Message(handler) => {
                let message: Message = envelope.data_as().map_err(GatewayError::Decode)?;
                handler
                    .handle(envelope, message)
                    .await
                    .map_err(GatewayError::Handler)
            }
        }
    }

    fn lookup(&self, envelope: &EventEnvelope) -> Option<&Route> {
        let event = envelope.event()?;
        self.routes.get(&envelope.op)?.get(&event)
    }
}
