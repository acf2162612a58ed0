/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public Coinbase Exchange client crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod auth;
pub mod http;
pub mod types;
pub mod ws;

// Re-export commonly used types from auth
pub use auth::{Credentials, RequestSigner, SignedEnvelope};

// Re-export commonly used types from http
pub use http::{
    AsyncTransport,
    BlockingRestClient,
    BlockingTransport,
    ClientConfig,
    ExchangeError,
    RequestDescriptor,
    RestClient,
    Result,
};

// Re-export all types
pub use types::*;

// Re-export commonly used types from ws
pub use ws::{
    FeedConfig,
    FeedConsumer,
    FeedEventType,
    FeedHandle,
    FeedHandlers,
    FeedState,
};
