//! The editing-surface seam.
//!
//! The engine never touches a platform document API; it drives whatever
//! implements [`EditorSurface`] and reacts to [`SurfaceEvent`]s delivered
//! on a channel. A browser embedding adapts its DOM widget to these
//! traits; tests script them directly.

use tokio::sync::mpsc;
use vellum_protocol::{CaretRect, EditorCommand};

/// Snapshot of the current selection: its plain text (empty when the
/// selection is collapsed to a caret) and its bounding geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSnapshot {
    pub text: String,
    pub rect: CaretRect,
}

/// The live editing widget, owner of the HTML fragment under edit.
pub trait EditorSurface: Send {
    /// Current markup.
    fn value(&self) -> String;

    /// Replace the whole content.
    fn set_value(&mut self, html: &str);

    /// Current selection, if the surface has one.
    fn selection(&self) -> Option<SelectionSnapshot>;

    /// Rendered content height in CSS pixels.
    fn content_height(&self) -> f64;

    /// Apply a formatting command to the current selection. The `link`
    /// command never reaches here; the engine handles it.
    fn apply_command(&mut self, command: &EditorCommand);

    /// Insert markup at the caret, replacing the current selection if any.
    fn insert_html(&mut self, html: &str);
}

/// User-input notifications from the surface, delivered in occurrence order.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// The user changed the content; the surface value is already updated.
    Edited,
    /// The surface gained focus.
    FocusIn,
    /// The surface lost focus.
    Blur,
    /// The observation primitive saw a new content-box height.
    Resized { height: f64 },
    /// Clipboard paste, intercepted before it reaches the document.
    Paste {
        html: Option<String>,
        text: Option<String>,
    },
}

/// Inbound stream of surface events for the engine.
pub type SurfaceEvents = mpsc::UnboundedReceiver<SurfaceEvent>;

/// Channel for feeding [`SurfaceEvent`]s to an engine.
pub fn surface_event_channel() -> (mpsc::UnboundedSender<SurfaceEvent>, SurfaceEvents) {
    mpsc::unbounded_channel()
}

/// Out-of-band URL prompt for the `link` command.
#[trait_variant::make(Send)]
pub trait LinkPrompt {
    /// Ask the user for a URL. `None` makes the command a silent no-op.
    async fn prompt_url(&self) -> Option<String>;
}

/// Prompt that always declines; for headless embeddings.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrompt;

impl LinkPrompt for NoPrompt {
    async fn prompt_url(&self) -> Option<String> {
        None
    }
}
