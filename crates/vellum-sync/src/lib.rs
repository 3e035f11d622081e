//! vellum-sync: the content-synchronization protocol core.
//!
//! Mediates all traffic between a host application and an embedded editing
//! surface over an asynchronous, ordered, text-payload [`Transport`]. The
//! surface side runs a [`SyncEngine`] — the single authoritative dispatcher
//! for inbound envelopes and the only emitter of outbound ones. The host
//! side runs a [`HostClient`] with its pending-request table and a typed
//! event stream for fire-and-forget notifications.
//!
//! Everything platform-specific sits behind the [`EditorSurface`],
//! [`LinkPrompt`], and [`Transport`] traits, so the whole protocol is
//! exercised in tests with in-memory channels and a scripted surface.

mod caret;
mod config;
mod engine;
mod error;
mod height;
mod host;
mod surface;
mod transport;

pub use caret::CaretReporter;
pub use config::SyncConfig;
pub use engine::SyncEngine;
pub use error::{HostError, TransportError};
pub use height::HeightTracker;
pub use host::{HostClient, HostConnection, HostEvent, HostEvents};
pub use surface::{
    EditorSurface, LinkPrompt, NoPrompt, SelectionSnapshot, SurfaceEvent, SurfaceEvents,
    surface_event_channel,
};
pub use transport::{ChannelEndpoint, Inbound, Transport, channel_pair};
