use std::sync::Arc;

use futures::{stream::SplitSink, SinkExt, StreamExt};
use thiserror::Error;
use tokio::{
    net::TcpStream,
    sync::{mpsc, Mutex},
    task::JoinHandle,
};
use tokio_tungstenite::{connect_async, tungstenite, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};
use url::Url;

use shared::protocol::{self, BackendEvent, ClientCommand};

type WsWriter = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, tungstenite::Message>;

/// Lifecycle of the one transport connection a session owns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChannelStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("backend endpoint is not a valid url: {endpoint}")]
    InvalidEndpoint { endpoint: String },
    #[error("failed to connect websocket: {endpoint}")]
    Connect {
        endpoint: String,
        #[source]
        source: tungstenite::Error,
    },
    #[error("channel is already open")]
    AlreadyOpen,
}

/// One websocket connection to the rendering backend.
///
/// Outbound sends are best effort: anything submitted while the status
/// is not `Connected` is dropped silently, by design — commands are
/// never queued for a future connection. Inbound text frames are parsed
/// into [`BackendEvent`]s by a single reader task and forwarded in
/// arrival order; frames that fail to decode are logged and skipped.
pub struct ChannelSession {
    inner: Arc<Mutex<ChannelInner>>,
}

#[derive(Default)]
struct ChannelInner {
    status: ChannelStatus,
    writer: Option<WsWriter>,
    reader_task: Option<JoinHandle<()>>,
}

impl Default for ChannelSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelSession {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ChannelInner::default())),
        }
    }

    pub async fn status(&self) -> ChannelStatus {
        self.inner.lock().await.status
    }

    /// Opens the transport and starts the reader task. Parsed inbound
    /// events are forwarded through `inbound` until the peer closes or
    /// the receiver is dropped.
    pub async fn open(
        &self,
        endpoint: &str,
        inbound: mpsc::UnboundedSender<BackendEvent>,
    ) -> Result<(), ChannelError> {
        let ws_url = normalize_endpoint(endpoint)?;

        {
            let mut guard = self.inner.lock().await;
            if guard.status != ChannelStatus::Disconnected {
                return Err(ChannelError::AlreadyOpen);
            }
            guard.status = ChannelStatus::Connecting;
        }

        let (stream, _) = match connect_async(ws_url.as_str()).await {
            Ok(connected) => connected,
            Err(source) => {
                self.inner.lock().await.status = ChannelStatus::Disconnected;
                return Err(ChannelError::Connect {
                    endpoint: ws_url.to_string(),
                    source,
                });
            }
        };
        let (writer, mut reader) = stream.split();

        let mut guard = self.inner.lock().await;
        guard.writer = Some(writer);
        guard.status = ChannelStatus::Connected;

        let task_inner = Arc::clone(&self.inner);
        guard.reader_task = Some(tokio::spawn(async move {
            while let Some(message) = reader.next().await {
                match message {
                    Ok(tungstenite::Message::Text(text)) => {
                        match protocol::decode_event(&text) {
                            Ok(event) => {
                                if inbound.send(event).is_err() {
                                    break;
                                }
                            }
                            Err(err) => {
                                warn!("ignoring undecodable backend message: {err}");
                            }
                        }
                    }
                    Ok(tungstenite::Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(err) => {
                        warn!("websocket receive failed: {err}");
                        break;
                    }
                }
            }
            let mut guard = task_inner.lock().await;
            guard.status = ChannelStatus::Disconnected;
            guard.writer = None;
            debug!("channel reader finished");
        }));

        Ok(())
    }

    /// Best-effort send. Dropped silently unless the channel is
    /// `Connected`; a transport write failure degrades the connection
    /// instead of surfacing an error to the caller.
    pub async fn send(&self, command: &ClientCommand) {
        let mut guard = self.inner.lock().await;
        if guard.status != ChannelStatus::Connected {
            debug!(?command, "dropping command while not connected");
            return;
        }
        let text = match protocol::encode_command(command) {
            Ok(text) => text,
            Err(err) => {
                warn!("failed to encode client command: {err}");
                return;
            }
        };
        let Some(writer) = guard.writer.as_mut() else {
            guard.status = ChannelStatus::Disconnected;
            return;
        };
        if let Err(err) = writer.send(tungstenite::Message::Text(text)).await {
            warn!("websocket send failed: {err}");
            guard.status = ChannelStatus::Disconnected;
            guard.writer = None;
            if let Some(task) = guard.reader_task.take() {
                task.abort();
            }
        }
    }

    /// Detaches the reader and closes the transport. Idempotent.
    pub async fn close(&self) {
        let (writer, task) = {
            let mut guard = self.inner.lock().await;
            guard.status = ChannelStatus::Disconnected;
            (guard.writer.take(), guard.reader_task.take())
        };
        if let Some(task) = task {
            task.abort();
        }
        if let Some(mut writer) = writer {
            let _ = writer.close().await;
        }
    }
}

// Backstop for deactivation paths that never reach an explicit close:
// detach the reader and let the socket close on drop.
impl Drop for ChannelSession {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.inner.try_lock() {
            if let Some(task) = guard.reader_task.take() {
                task.abort();
            }
            guard.writer = None;
            guard.status = ChannelStatus::Disconnected;
        }
    }
}

/// Accepts ws/wss endpoints directly and rewrites http/https the way the
/// backend address is usually configured.
fn normalize_endpoint(endpoint: &str) -> Result<Url, ChannelError> {
    let invalid = || ChannelError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
    };
    let mut url = Url::parse(endpoint).map_err(|_| invalid())?;
    match url.scheme() {
        "ws" | "wss" => {}
        "http" => url.set_scheme("ws").map_err(|()| invalid())?,
        "https" => url.set_scheme("wss").map_err(|()| invalid())?,
        _ => return Err(invalid()),
    }
    Ok(url)
}

#[cfg(test)]
#[path = "tests/channel_tests.rs"]
mod tests;
