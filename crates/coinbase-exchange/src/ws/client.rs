/*
[INPUT]:  Feed URL, product, keepalive flag and registered handlers
[OUTPUT]: Decoded feed messages dispatched to handlers; a handle to stop, ping and subscribe
[POS]:    WebSocket layer - feed connection lifecycle
[UPDATE]: When changing connection, reconnection or runtime ownership logic
*/

use futures_util::{SinkExt, StreamExt};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::handlers::FeedHandlers;
use super::message::{SubscribeRequest, parse_message};
use crate::http::{DEFAULT_PRODUCT, ExchangeError, Result};

/// Production feed endpoint
pub const DEFAULT_FEED_URL: &str = "wss://ws-feed.exchange.coinbase.com";
/// Public sandbox feed endpoint
pub const SANDBOX_FEED_URL: &str = "wss://ws-feed-public.sandbox.exchange.coinbase.com";

/// Feed connection configuration
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub ws_url: String,
    pub product_id: String,
    /// Reconnect and resubscribe whenever the remote side closes
    pub keepalive: bool,
    /// Pause before a keepalive reconnect
    pub reconnect_delay: Duration,
    pub connect_timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            ws_url: DEFAULT_FEED_URL.to_string(),
            product_id: DEFAULT_PRODUCT.to_string(),
            keepalive: false,
            reconnect_delay: Duration::ZERO,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl FeedConfig {
    pub fn sandbox() -> Self {
        Self {
            ws_url: SANDBOX_FEED_URL.to_string(),
            ..Self::default()
        }
    }

    pub fn with_url(mut self, ws_url: impl Into<String>) -> Self {
        self.ws_url = ws_url.into();
        self
    }

    pub fn with_product(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = product_id.into();
        self
    }

    pub fn with_keepalive(mut self, keepalive: bool) -> Self {
        self.keepalive = keepalive;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FeedState {
    Closed = 0,
    Connecting = 1,
    Open = 2,
    Closing = 3,
}

impl FeedState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Connecting,
            2 => Self::Open,
            3 => Self::Closing,
            _ => Self::Closed,
        }
    }
}

/// Callback receiving the payload of the matching pong
pub type PongCallback = Box<dyn FnOnce(String) + Send + 'static>;

/// State shared between the connection task and its handles
struct Shared {
    state: AtomicU8,
    owns_runtime: AtomicBool,
    cancel: CancellationToken,
    outbound: Mutex<Option<mpsc::UnboundedSender<WsMessage>>>,
    pending_pongs: Mutex<Vec<(Vec<u8>, PongCallback)>>,
    task: Mutex<Option<JoinHandle<Result<()>>>>,
}

impl Shared {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(FeedState::Closed as u8),
            owns_runtime: AtomicBool::new(false),
            cancel: CancellationToken::new(),
            outbound: Mutex::new(None),
            pending_pongs: Mutex::new(Vec::new()),
            task: Mutex::new(None),
        }
    }

    fn state(&self) -> FeedState {
        FeedState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn set_state(&self, state: FeedState) {
        let previous = FeedState::from_u8(self.state.swap(state as u8, Ordering::SeqCst));
        if previous != state {
            debug!(from = ?previous, to = ?state, "feed state changed");
        }
    }

    fn outbound(&self) -> MutexGuard<'_, Option<mpsc::UnboundedSender<WsMessage>>> {
        self.outbound.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn pending_pongs(&self) -> MutexGuard<'_, Vec<(Vec<u8>, PongCallback)>> {
        self.pending_pongs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn task(&self) -> MutexGuard<'_, Option<JoinHandle<Result<()>>>> {
        self.task.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn send(&self, message: WsMessage) -> Result<()> {
        let guard = self.outbound();
        let sender = guard
            .as_ref()
            .ok_or_else(|| ExchangeError::WebSocket("feed not connected".to_string()))?;
        sender
            .send(message)
            .map_err(|_| ExchangeError::WebSocket("feed send channel closed".to_string()))
    }

    /// Drop callbacks for pings the closed socket will never answer
    fn clear_pending_pongs(&self) {
        let dropped = std::mem::take(&mut *self.pending_pongs());
        if !dropped.is_empty() {
            debug!(count = dropped.len(), "dropping unanswered pings");
        }
    }

    fn deliver_pong(&self, payload: &[u8]) {
        let callback = {
            let mut pending = self.pending_pongs();
            pending
                .iter()
                .position(|(expected, _)| expected.as_slice() == payload)
                .map(|index| pending.remove(index).1)
        };

        match callback {
            Some(callback) => callback(String::from_utf8_lossy(payload).into_owned()),
            None => debug!(bytes = payload.len(), "unsolicited pong"),
        }
    }
}

/// Cloneable control surface for a running feed
#[derive(Clone)]
pub struct FeedHandle {
    shared: Arc<Shared>,
}

impl FeedHandle {
    pub fn state(&self) -> FeedState {
        self.shared.state()
    }

    /// Whether this consumer built the runtime it runs on
    pub fn owns_runtime(&self) -> bool {
        self.shared.owns_runtime.load(Ordering::SeqCst)
    }

    /// Close the socket and end the connection loop; never reconnects
    pub fn stop(&self) {
        if !self.shared.cancel.is_cancelled() {
            info!("feed stop requested");
        }
        self.shared.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.cancel.is_cancelled()
    }

    /// Send a ping; `callback` gets the pong payload
    ///
    /// The payload defaults to the current time.
    pub fn ping(
        &self,
        payload: Option<String>,
        callback: impl FnOnce(String) + Send + 'static,
    ) -> Result<()> {
        let payload = payload.unwrap_or_else(|| chrono::Utc::now().to_rfc3339());
        let bytes = payload.into_bytes();
        self.shared
            .pending_pongs()
            .push((bytes.clone(), Box::new(callback)));

        if let Err(err) = self.shared.send(WsMessage::Ping(bytes.clone().into())) {
            self.shared
                .pending_pongs()
                .retain(|(expected, _)| *expected != bytes);
            return Err(err);
        }
        Ok(())
    }

    /// Subscribe the live connection to another product
    pub fn subscribe(&self, product_id: &str) -> Result<()> {
        let frame = SubscribeRequest::new(product_id).to_json()?;
        self.shared.send(WsMessage::Text(frame.into()))?;
        info!(product_id, "ws subscription sent");
        Ok(())
    }

    /// Wait for an attached connection task to finish
    ///
    /// Returns immediately for owned-runtime feeds, which have already
    /// finished when `start` returns.
    pub async fn closed(&self) -> Result<()> {
        let task = self.shared.task().take();
        match task {
            Some(task) => task
                .await
                .map_err(|err| ExchangeError::WebSocket(format!("feed task failed: {err}")))?,
            None => Ok(()),
        }
    }
}

impl fmt::Debug for FeedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedHandle")
            .field("state", &self.state())
            .field("owns_runtime", &self.owns_runtime())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// Streaming feed consumer
pub struct FeedConsumer {
    config: FeedConfig,
    handlers: FeedHandlers,
    shared: Arc<Shared>,
}

impl FeedConsumer {
    pub fn new(config: FeedConfig, handlers: FeedHandlers) -> Self {
        Self {
            config,
            handlers,
            shared: Arc::new(Shared::new()),
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Handle usable before and after `start`, e.g. to stop an owned feed
    /// from another thread
    pub fn handle(&self) -> FeedHandle {
        FeedHandle {
            shared: self.shared.clone(),
        }
    }

    /// Open the feed
    ///
    /// Inside a tokio runtime the connection is spawned onto it and this
    /// returns at once. Outside one, a runtime is built, the connection runs
    /// to completion on the calling thread, and the runtime is shut down
    /// before returning.
    pub fn start(self) -> Result<FeedHandle> {
        let handle = self.handle();
        let Self {
            config,
            handlers,
            shared,
        } = self;

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                shared.owns_runtime.store(false, Ordering::SeqCst);
                info!(url = %config.ws_url, "feed attaching to running runtime");
                let task = runtime.spawn(run(config, handlers, shared.clone()));
                *shared.task() = Some(task);
                Ok(handle)
            }
            Err(_) => {
                shared.owns_runtime.store(true, Ordering::SeqCst);
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .enable_all()
                    .build()
                    .map_err(|err| ExchangeError::Config(format!("build feed runtime: {err}")))?;
                info!(url = %config.ws_url, "feed running on owned runtime");
                let result = runtime.block_on(run(config, handlers, shared));
                runtime.shutdown_timeout(Duration::from_secs(1));
                result.map(|()| handle)
            }
        }
    }
}

impl fmt::Debug for FeedConsumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedConsumer")
            .field("config", &self.config)
            .field("handlers", &self.handlers)
            .field("state", &self.shared.state())
            .finish()
    }
}

/// How one socket session ended
enum SessionEnd {
    Stopped,
    RemoteClosed,
}

async fn run(config: FeedConfig, mut handlers: FeedHandlers, shared: Arc<Shared>) -> Result<()> {
    let result = run_sessions(&config, &mut handlers, &shared).await;
    shared.outbound().take();
    shared.set_state(FeedState::Closed);
    if let Err(err) = &result {
        error!(error = %err, "feed terminated");
    } else {
        info!("feed closed");
    }
    result
}

async fn run_sessions(
    config: &FeedConfig,
    handlers: &mut FeedHandlers,
    shared: &Shared,
) -> Result<()> {
    let mut reconnects: u64 = 0;
    loop {
        if shared.cancel.is_cancelled() {
            return Ok(());
        }

        match session(config, handlers, shared).await? {
            SessionEnd::Stopped => return Ok(()),
            SessionEnd::RemoteClosed if !config.keepalive => {
                info!("feed closed by remote");
                return Ok(());
            }
            SessionEnd::RemoteClosed => {
                reconnects += 1;
                info!(reconnects, delay_ms = config.reconnect_delay.as_millis() as u64, "feed closed by remote, reconnecting");
                if !config.reconnect_delay.is_zero() {
                    tokio::select! {
                        _ = shared.cancel.cancelled() => return Ok(()),
                        _ = tokio::time::sleep(config.reconnect_delay) => {}
                    }
                }
            }
        }
    }
}

/// One socket from connect to close
async fn session(
    config: &FeedConfig,
    handlers: &mut FeedHandlers,
    shared: &Shared,
) -> Result<SessionEnd> {
    shared.set_state(FeedState::Connecting);
    info!(url = %config.ws_url, product_id = %config.product_id, "feed connecting");

    let connect = tokio::time::timeout(config.connect_timeout, connect_async(config.ws_url.as_str()));
    let ws_stream = tokio::select! {
        _ = shared.cancel.cancelled() => return Ok(SessionEnd::Stopped),
        connected = connect => match connected {
            Ok(Ok((ws_stream, _response))) => ws_stream,
            Ok(Err(err)) => return Err(ExchangeError::WebSocket(format!("connect failed: {err}"))),
            Err(_) => {
                return Err(ExchangeError::WebSocket(format!(
                    "connect timed out after {:?}",
                    config.connect_timeout
                )));
            }
        },
    };

    let (mut write, mut read) = ws_stream.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
    *shared.outbound() = Some(outbound_tx);
    shared.set_state(FeedState::Open);
    info!(url = %config.ws_url, "feed open");

    let end: Result<SessionEnd> = async {
        let subscribe = match SubscribeRequest::new(config.product_id.as_str()).to_json() {
            Ok(subscribe) => subscribe,
            Err(err) => return Err(err.into()),
        };
        if let Err(err) = write.send(WsMessage::Text(subscribe.into())).await {
            return socket_failure("subscribe failed", err);
        }
        info!(product_id = %config.product_id, "ws subscription sent");

        loop {
            tokio::select! {
                _ = shared.cancel.cancelled() => {
                    shared.set_state(FeedState::Closing);
                    if let Err(err) = write.send(WsMessage::Close(None)).await {
                        debug!(error = %err, "close frame not sent");
                    }
                    return Ok(SessionEnd::Stopped);
                }
                Some(outbound) = outbound_rx.recv() => {
                    if let Err(err) = write.send(outbound).await {
                        return socket_failure("send failed", err);
                    }
                }
                incoming = read.next() => match incoming {
                    Some(Ok(WsMessage::Text(text))) => {
                        if let Some(record) = parse_message(text.as_str()) {
                            handlers.dispatch(&record);
                        }
                    }
                    Some(Ok(WsMessage::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => {
                            if let Some(record) = parse_message(text) {
                                handlers.dispatch(&record);
                            }
                        }
                        Err(_) => warn!(bytes = bytes.len(), "binary ws message is not utf-8, skipping"),
                    },
                    Some(Ok(WsMessage::Pong(payload))) => shared.deliver_pong(&payload),
                    Some(Ok(WsMessage::Ping(_))) | Some(Ok(WsMessage::Frame(_))) => {}
                    Some(Ok(WsMessage::Close(frame))) => {
                        debug!(?frame, "close frame received");
                        return Ok(SessionEnd::RemoteClosed);
                    }
                    None => return Ok(SessionEnd::RemoteClosed),
                    Some(Err(err)) => return socket_failure("read failed", err),
                },
            }
        }
    }
    .await;

    shared.outbound().take();
    shared.clear_pending_pongs();
    shared.set_state(FeedState::Closed);
    end
}

/// Whether a socket error means the peer went away rather than a failure
///
/// Covers a TCP drop without a close handshake (code 1006) and reset or
/// truncated streams. Protocol violations and TLS errors are not included.
fn is_abrupt_close(err: &WsError) -> bool {
    match err {
        WsError::ConnectionClosed | WsError::AlreadyClosed => true,
        WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake) => true,
        WsError::Io(io) => matches!(
            io.kind(),
            std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::ConnectionAborted
                | std::io::ErrorKind::BrokenPipe
                | std::io::ErrorKind::UnexpectedEof
        ),
        _ => false,
    }
}

fn socket_failure(context: &str, err: WsError) -> Result<SessionEnd> {
    if is_abrupt_close(&err) {
        warn!(error = %err, "{context}: connection dropped");
        Ok(SessionEnd::RemoteClosed)
    } else {
        Err(ExchangeError::WebSocket(format!("{context}: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = FeedConfig::default();
        assert_eq!(config.ws_url, DEFAULT_FEED_URL);
        assert_eq!(config.product_id, "BTC-USD");
        assert!(!config.keepalive);
        assert_eq!(config.reconnect_delay, Duration::ZERO);
        assert_eq!(FeedConfig::sandbox().ws_url, SANDBOX_FEED_URL);
    }

    #[test]
    fn test_handle_before_start() {
        let consumer = FeedConsumer::new(FeedConfig::default(), FeedHandlers::new());
        let handle = consumer.handle();
        assert_eq!(handle.state(), FeedState::Closed);
        assert!(!handle.owns_runtime());
        assert!(handle.subscribe("ETH-USD").is_err());
        assert!(handle.ping(None, |_| {}).is_err());
        assert!(handle.shared.pending_pongs().is_empty());
    }

    #[test]
    fn test_stopped_before_start_returns_immediately() {
        let consumer = FeedConsumer::new(FeedConfig::default(), FeedHandlers::new());
        consumer.handle().stop();
        let handle = consumer.start().unwrap();
        assert!(handle.owns_runtime());
        assert_eq!(handle.state(), FeedState::Closed);
    }

    #[test]
    fn test_pong_goes_to_matching_callback() {
        let shared = Shared::new();
        let (tx, rx) = std::sync::mpsc::channel();
        shared
            .pending_pongs()
            .push((b"t1".to_vec(), Box::new(move |payload: String| tx.send(payload).unwrap())));

        shared.deliver_pong(b"other");
        assert!(rx.try_recv().is_err());
        shared.deliver_pong(b"t1");
        assert_eq!(rx.try_recv().unwrap(), "t1");
        assert!(shared.pending_pongs().is_empty());
    }

    #[test]
    fn test_clear_pending_pongs_drops_unanswered_pings() {
        let shared = Shared::new();
        shared.pending_pongs().push((b"a".to_vec(), Box::new(|_: String| {})));
        shared.pending_pongs().push((b"b".to_vec(), Box::new(|_: String| {})));

        shared.clear_pending_pongs();
        assert!(shared.pending_pongs().is_empty());
    }

    #[test]
    fn test_abrupt_close_classification() {
        use std::io::{Error as IoError, ErrorKind};

        assert!(is_abrupt_close(&WsError::ConnectionClosed));
        assert!(is_abrupt_close(&WsError::AlreadyClosed));
        assert!(is_abrupt_close(&WsError::Protocol(
            ProtocolError::ResetWithoutClosingHandshake
        )));
        assert!(is_abrupt_close(&WsError::Io(IoError::from(ErrorKind::ConnectionReset))));
        assert!(is_abrupt_close(&WsError::Io(IoError::from(ErrorKind::UnexpectedEof))));

        assert!(!is_abrupt_close(&WsError::Protocol(ProtocolError::HandshakeIncomplete)));
        assert!(!is_abrupt_close(&WsError::Io(IoError::from(ErrorKind::PermissionDenied))));
        assert!(!is_abrupt_close(&WsError::Protocol(ProtocolError::SendAfterClosing)));
    }

    #[test]
    fn test_socket_failure_maps_drop_to_remote_close() {
        let dropped = socket_failure(
            "read failed",
            WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake),
        );
        assert!(matches!(dropped, Ok(SessionEnd::RemoteClosed)));

        let failed = socket_failure("read failed", WsError::Protocol(ProtocolError::HandshakeIncomplete));
        assert!(matches!(failed, Err(ExchangeError::WebSocket(_))));
    }
}
