//! Host-side client: the sole consumer of the surface's protocol.
//!
//! The pending-request table lives behind the client; an entry is removed
//! exactly once — by the matching response or by the timeout, whichever
//! runs first — and the loser becomes a no-op.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::time;
use vellum_protocol::{CaretRect, EditorCommand, Envelope, RequestId, RequestIds};

use crate::config::SyncConfig;
use crate::error::{HostError, TransportError};
use crate::transport::{Inbound, Transport};

/// Fire-and-forget notifications from the surface.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// The engine finished initializing.
    Ready,
    /// The user edited; payload is the live HTML fragment.
    ValueChanged { value: String },
    /// The rendered content height changed.
    HeightChanged { height: f64 },
    /// First caret geometry of a focus session.
    CaretMoved { position: CaretRect },
}

/// Stream of [`HostEvent`]s for the embedding application.
pub type HostEvents = mpsc::UnboundedReceiver<HostEvent>;

struct HostShared {
    pending: Mutex<HashMap<RequestId, oneshot::Sender<String>>>,
    ids: RequestIds,
}

/// Sends envelopes into the surface and awaits correlated responses.
pub struct HostClient<T> {
    transport: T,
    shared: Arc<HostShared>,
    timeout_ms: u64,
}

impl<T: Clone> Clone for HostClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            shared: Arc::clone(&self.shared),
            timeout_ms: self.timeout_ms,
        }
    }
}

impl<T: Transport> HostClient<T> {
    /// Wire up a client over the host side of a transport. Returns the
    /// client, the connection task to drive, and the notification stream.
    pub fn new(transport: T, inbound: Inbound, config: &SyncConfig) -> (Self, HostConnection, HostEvents) {
        let shared = Arc::new(HostShared {
            pending: Mutex::new(HashMap::new()),
            ids: RequestIds::new(),
        });
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let client = Self {
            transport,
            shared: Arc::clone(&shared),
            timeout_ms: config.request_timeout_ms,
        };
        let connection = HostConnection {
            inbound,
            shared,
            events: events_tx,
        };
        (client, connection, events_rx)
    }

    /// Replace the surface content. The value may be Markdown, HTML, or
    /// plain text; the surface infers the kind.
    pub fn set_value(&self, value: &str) -> Result<(), HostError> {
        self.send(&Envelope::SetValue {
            value: value.to_owned(),
        })
    }

    /// Apply a formatting command to the current selection.
    pub fn execute_command(&self, command: &EditorCommand) -> Result<(), HostError> {
        self.send(&Envelope::ExecuteCommand {
            command: command.token().into(),
        })
    }

    /// Fetch the current content as Markdown.
    ///
    /// Registers a fresh request id, sends `getValue`, and resolves with
    /// the matching `valueResponse` — or fails with [`HostError::Timeout`]
    /// after the configured window. A response arriving after the timeout
    /// is dropped by the connection; it can neither resolve nor panic.
    pub async fn get_value(&self) -> Result<String, HostError> {
        if !self.transport.is_connected() {
            return Err(TransportError::Detached.into());
        }
        let request_id = self.shared.ids.next_id();
        let (reply_tx, reply_rx) = oneshot::channel();
        self.shared
            .pending
            .lock()
            .await
            .insert(request_id.clone(), reply_tx);

        let envelope = Envelope::GetValue {
            request_id: request_id.clone(),
        };
        if let Err(error) = self.try_send(&envelope) {
            self.shared.pending.lock().await.remove(&request_id);
            return Err(error);
        }

        match time::timeout(time::Duration::from_millis(self.timeout_ms), reply_rx).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => {
                self.shared.pending.lock().await.remove(&request_id);
                Err(HostError::ConnectionClosed)
            }
            Err(_elapsed) => {
                self.shared.pending.lock().await.remove(&request_id);
                Err(HostError::Timeout {
                    request_id,
                    timeout_ms: self.timeout_ms,
                })
            }
        }
    }

    fn send(&self, envelope: &Envelope) -> Result<(), HostError> {
        if !self.transport.is_connected() {
            return Err(TransportError::Detached.into());
        }
        self.try_send(envelope)
    }

    fn try_send(&self, envelope: &Envelope) -> Result<(), HostError> {
        let payload = envelope.encode()?;
        self.transport.send(&payload)?;
        Ok(())
    }
}

/// Driver for the surface -> host direction. Run it to completion
/// alongside the client; it ends when the surface side closes.
pub struct HostConnection {
    inbound: Inbound,
    shared: Arc<HostShared>,
    events: mpsc::UnboundedSender<HostEvent>,
}

impl HostConnection {
    pub async fn run(mut self) {
        while let Some(raw) = self.inbound.recv().await {
            match Envelope::decode(&raw) {
                Ok(Some(envelope)) => self.handle(envelope).await,
                Ok(None) => tracing::trace!("ignoring unknown message kind"),
                Err(error) => tracing::warn!(%error, "dropping malformed envelope"),
            }
        }
        tracing::debug!("surface side closed; host connection stopping");
    }

    async fn handle(&mut self, envelope: Envelope) {
        match envelope {
            Envelope::ValueResponse { request_id, value } => {
                match self.shared.pending.lock().await.remove(&request_id) {
                    Some(reply) => {
                        if reply.send(value).is_err() {
                            tracing::debug!(%request_id, "response lost the race to its timeout");
                        }
                    }
                    None => {
                        tracing::debug!(%request_id, "dropping response for unknown request");
                    }
                }
            }
            Envelope::Ready => self.notify(HostEvent::Ready),
            Envelope::ValueChanged { value } => self.notify(HostEvent::ValueChanged { value }),
            Envelope::HeightChanged { height } => self.notify(HostEvent::HeightChanged { height }),
            Envelope::CaretPosition { position } => {
                self.notify(HostEvent::CaretMoved { position });
            }
            other => tracing::trace!(?other, "ignoring envelope not addressed to the host"),
        }
    }

    fn notify(&self, event: HostEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("host event receiver dropped");
        }
    }
}
