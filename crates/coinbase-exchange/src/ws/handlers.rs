/*
[INPUT]:  Caller callbacks and decoded feed records
[OUTPUT]: Per-type handler dispatch
[POS]:    WebSocket layer - handler registry
[UPDATE]: When adding event types
*/

use std::fmt;

use super::message::FeedEventType;
use crate::types::Record;

/// Callback invoked on the connection task; must not block
pub type Handler = Box<dyn FnMut(&Record) + Send + 'static>;

/// Registered feed callbacks
///
/// Every record reaches the catch-all handler first, then at most one
/// type handler.
#[derive(Default)]
pub struct FeedHandlers {
    message: Option<Handler>,
    received: Option<Handler>,
    open: Option<Handler>,
    matched: Option<Handler>,
    change: Option<Handler>,
    done: Option<Handler>,
    error: Option<Handler>,
}

impl FeedHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catch-all handler for every decoded message
    pub fn on_message(mut self, handler: impl FnMut(&Record) + Send + 'static) -> Self {
        self.message = Some(Box::new(handler));
        self
    }

    /// Handler for one event type
    pub fn on(mut self, kind: FeedEventType, handler: impl FnMut(&Record) + Send + 'static) -> Self {
        *self.slot(kind) = Some(Box::new(handler));
        self
    }

    pub fn on_received(self, handler: impl FnMut(&Record) + Send + 'static) -> Self {
        self.on(FeedEventType::Received, handler)
    }

    pub fn on_open(self, handler: impl FnMut(&Record) + Send + 'static) -> Self {
        self.on(FeedEventType::Open, handler)
    }

    pub fn on_match(self, handler: impl FnMut(&Record) + Send + 'static) -> Self {
        self.on(FeedEventType::Match, handler)
    }

    pub fn on_change(self, handler: impl FnMut(&Record) + Send + 'static) -> Self {
        self.on(FeedEventType::Change, handler)
    }

    pub fn on_done(self, handler: impl FnMut(&Record) + Send + 'static) -> Self {
        self.on(FeedEventType::Done, handler)
    }

    pub fn on_error(self, handler: impl FnMut(&Record) + Send + 'static) -> Self {
        self.on(FeedEventType::Error, handler)
    }

    /// Run the catch-all, then the handler for the record's `type`
    pub fn dispatch(&mut self, record: &Record) {
        if let Some(handler) = self.message.as_mut() {
            handler(record);
        }

        if let Some(kind) = record.str("type").and_then(FeedEventType::from_type)
            && let Some(handler) = self.slot(kind).as_mut()
        {
            handler(record);
        }
    }

    fn slot(&mut self, kind: FeedEventType) -> &mut Option<Handler> {
        match kind {
            FeedEventType::Received => &mut self.received,
            FeedEventType::Open => &mut self.open,
            FeedEventType::Match => &mut self.matched,
            FeedEventType::Change => &mut self.change,
            FeedEventType::Done => &mut self.done,
            FeedEventType::Error => &mut self.error,
        }
    }
}

impl fmt::Debug for FeedHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedHandlers")
            .field("message", &self.message.is_some())
            .field("received", &self.received.is_some())
            .field("open", &self.open.is_some())
            .field("match", &self.matched.is_some())
            .field("change", &self.change.is_some())
            .field("done", &self.done.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}
