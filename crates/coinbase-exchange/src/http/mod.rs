/*
[INPUT]:  Client configuration, credentials and endpoint parameters
[OUTPUT]: Async and blocking REST clients with decoded responses
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod account;
pub mod blocking;
pub mod client;
pub mod error;
pub mod market;
pub mod orders;
pub mod pagination;
pub mod request;
pub mod transfers;
pub mod transport;

pub use error::{ExchangeError, Result};

pub use blocking::BlockingRestClient;
pub use client::{ClientConfig, DEFAULT_API_URL, DEFAULT_PRODUCT, RestClient, SANDBOX_API_URL};
pub use pagination::{CURSOR_HEADER, DEFAULT_PAGE_LIMIT};
pub use request::RequestDescriptor;
pub use transport::{AsyncTransport, BlockingHttpTransport, BlockingTransport, HttpTransport};
