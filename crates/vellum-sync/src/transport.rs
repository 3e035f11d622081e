//! Transport abstraction: an asynchronous, ordered, at-most-once channel
//! carrying serialized text payloads in each direction.
//!
//! The engine and host client are injected with a [`Transport`] for their
//! outbound direction and an [`Inbound`] receiver for the other; dropping
//! the receiver is the unsubscribe, so teardown is deterministic rather
//! than relying on ambient global listeners.

use tokio::sync::mpsc;

use crate::error::TransportError;

/// Outbound half of a channel. Sends are fire-and-forget; delivery
/// acknowledgment, where it exists, is defined by the protocol itself.
pub trait Transport: Send + 'static {
    /// Push one serialized envelope toward the peer.
    fn send(&self, payload: &str) -> Result<(), TransportError>;

    /// Whether the peer can currently receive. Callers check this to fail
    /// fast locally instead of erroring asynchronously.
    fn is_connected(&self) -> bool;
}

/// Inbound half of a channel: ordered payloads from the peer.
pub type Inbound = mpsc::UnboundedReceiver<String>;

/// In-memory transport endpoint backed by a tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelEndpoint {
    tx: mpsc::UnboundedSender<String>,
}

impl Transport for ChannelEndpoint {
    fn send(&self, payload: &str) -> Result<(), TransportError> {
        self.tx
            .send(payload.to_owned())
            .map_err(|_| TransportError::Detached)
    }

    fn is_connected(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Two linked endpoints: `(host side, surface side)`, each a sender plus
/// the inbound stream of what the other side sends.
///
/// This is the concrete transport used by the integration tests and by
/// embedders that already own both ends of a message channel.
pub fn channel_pair() -> ((ChannelEndpoint, Inbound), (ChannelEndpoint, Inbound)) {
    let (host_tx, surface_inbound) = mpsc::unbounded_channel();
    let (surface_tx, host_inbound) = mpsc::unbounded_channel();
    (
        (ChannelEndpoint { tx: host_tx }, host_inbound),
        (ChannelEndpoint { tx: surface_tx }, surface_inbound),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pair_crosses_directions() {
        let ((host, mut host_inbound), (surface, mut surface_inbound)) = channel_pair();
        host.send("to-surface").unwrap();
        surface.send("to-host").unwrap();
        assert_eq!(surface_inbound.recv().await.as_deref(), Some("to-surface"));
        assert_eq!(host_inbound.recv().await.as_deref(), Some("to-host"));
    }

    #[tokio::test]
    async fn test_send_fails_fast_when_peer_dropped() {
        let ((host, _host_inbound), (_surface, surface_inbound)) = channel_pair();
        drop(surface_inbound);
        assert!(!host.is_connected());
        assert!(matches!(host.send("x"), Err(TransportError::Detached)));
    }

    #[tokio::test]
    async fn test_payloads_arrive_in_send_order() {
        let ((host, _hi), (_surface, mut surface_inbound)) = channel_pair();
        for i in 0..5 {
            host.send(&format!("m{i}")).unwrap();
        }
        for i in 0..5 {
            assert_eq!(surface_inbound.recv().await.unwrap(), format!("m{i}"));
        }
    }
}
