/*
[INPUT]:  API key, base64 secret, passphrase and a timestamp source
[OUTPUT]: Signed header envelopes for authenticated requests
[POS]:    Auth layer - handles Coinbase Exchange request authentication
[UPDATE]: When the signing scheme or header set changes
*/

pub mod credentials;
pub mod signer;

pub use credentials::Credentials;
pub use signer::{Clock, RequestSigner, SignedEnvelope, sign};
