/*
[INPUT]:  Feed configuration and event handlers
[OUTPUT]: Real-time order book events dispatched by type
[POS]:    WebSocket layer - streaming feed consumer
[UPDATE]: When adding event types or changing connection logic
*/

pub mod client;
pub mod handlers;
pub mod message;

pub use client::{
    DEFAULT_FEED_URL, FeedConfig, FeedConsumer, FeedHandle, FeedState, PongCallback,
    SANDBOX_FEED_URL,
};
pub use handlers::{FeedHandlers, Handler};
pub use message::{FeedEventType, SubscribeRequest};
