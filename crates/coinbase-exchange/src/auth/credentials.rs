/*
[INPUT]:  API key, base64-encoded secret, passphrase
[OUTPUT]: Validated, immutable credentials with a decoded HMAC key
[POS]:    Auth layer - credential storage
[UPDATE]: When credential format or validation changes
*/

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use std::fmt;
use std::sync::Arc;

use crate::http::{ExchangeError, Result};

/// API credentials for authenticated requests
///
/// The secret is decoded once at construction; the raw key bytes are shared
/// between clones and never printed.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    passphrase: String,
    secret: Arc<[u8]>,
}

impl Credentials {
    /// Create credentials from the values issued by the exchange
    ///
    /// `api_secret` must be base64; surrounding whitespace is ignored on both
    /// the encoded and the decoded form.
    pub fn new(
        api_key: impl Into<String>,
        api_secret: &str,
        passphrase: impl Into<String>,
    ) -> Result<Self> {
        let decoded = BASE64
            .decode(api_secret.trim())
            .map_err(|err| ExchangeError::Config(format!("api secret is not valid base64: {err}")))?;

        Ok(Self {
            api_key: api_key.into(),
            passphrase: passphrase.into(),
            secret: Arc::from(decoded.trim_ascii()),
        })
    }

    /// Credentials for public endpoints only
    pub fn anonymous() -> Self {
        Self {
            api_key: String::new(),
            passphrase: String::new(),
            secret: Arc::from(Vec::new()),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }

    /// Decoded HMAC key
    pub(crate) fn secret(&self) -> &[u8] {
        &self.secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let visible: String = self.api_key.chars().take(8).collect();
        f.debug_struct("Credentials")
            .field("api_key", &format!("{visible}..."))
            .field("passphrase", &"<redacted>")
            .field("secret", &"<redacted>")
            .finish()
    }
}
