//! vellum-protocol: wire types for the host <-> editing surface channel.
//!
//! Every message on the channel is one UTF-8 JSON object with a single
//! `type` tag drawn from a closed set. Both directions share the envelope
//! shape; which kinds travel in which direction is a convention enforced by
//! the dispatchers, not by the codec.

mod command;
mod envelope;
mod types;

pub use command::EditorCommand;
pub use envelope::{Envelope, ProtocolError};
pub use types::{CaretRect, RequestId, RequestIds};
