//! Error types for the synchronization core.

use thiserror::Error;
use vellum_protocol::{ProtocolError, RequestId};

/// Errors from pushing a payload into a transport.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The peer endpoint is gone; nothing can be delivered.
    #[error("transport target detached")]
    Detached,
}

/// Errors surfaced to the host through [`crate::HostClient`].
///
/// A timeout is deliberately distinguishable from everything else: it is
/// the only failure a well-behaved surface can still produce, since
/// conversion failures degrade to a fallback response instead of an error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HostError {
    /// No matching response arrived within the configured window.
    #[error("request {request_id} timed out after {timeout_ms} ms")]
    Timeout {
        request_id: RequestId,
        timeout_ms: u64,
    },

    /// The transport refused the send; checked before anything is queued.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The outbound envelope could not be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The receiving half shut down while the request was pending.
    #[error("connection closed before the response arrived")]
    ConnectionClosed,
}
