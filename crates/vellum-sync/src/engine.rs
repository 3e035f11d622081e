//! The sync engine: single authoritative dispatcher for the surface side.
//!
//! One cooperative loop processes one inbound envelope or one user-input
//! event to completion before the next; suspension happens only at
//! converter calls and settling timers. Conversions are not sequenced
//! across envelopes beyond arrival order — a host must not assume a
//! `valueResponse` excludes the effect of a `setValue` it sent afterward.

use tokio::time::{self, Instant};
use vellum_content::dom::{self, Element, HtmlNode};
use vellum_content::{ContentConverter, looks_like_markup, promote, sanitize};
use vellum_protocol::{EditorCommand, Envelope, RequestId};

use crate::caret::CaretReporter;
use crate::config::SyncConfig;
use crate::height::HeightTracker;
use crate::surface::{EditorSurface, LinkPrompt, SurfaceEvent, SurfaceEvents};
use crate::transport::{Inbound, Transport};

/// The protocol core on the editing-surface side.
///
/// Owns the dispatch of every inbound envelope and the emission policy for
/// every outbound one. Emits `ready` exactly once, before any inbound
/// envelope is processed. Survives malformed envelopes and transport
/// failures; both are logged, never propagated.
pub struct SyncEngine<T, S, C, P> {
    transport: T,
    inbound: Inbound,
    surface: S,
    events: SurfaceEvents,
    converter: C,
    link_prompt: P,
    config: SyncConfig,
    height: HeightTracker,
    caret: CaretReporter,
}

impl<T, S, C, P> SyncEngine<T, S, C, P>
where
    T: Transport,
    S: EditorSurface,
    C: ContentConverter + Send,
    P: LinkPrompt,
{
    pub fn new(
        transport: T,
        inbound: Inbound,
        surface: S,
        events: SurfaceEvents,
        converter: C,
        link_prompt: P,
        config: SyncConfig,
    ) -> Self {
        Self {
            transport,
            inbound,
            surface,
            events,
            converter,
            link_prompt,
            config,
            height: HeightTracker::new(),
            caret: CaretReporter::new(),
        }
    }

    /// Run until the host side of the transport closes.
    pub async fn run(mut self) {
        self.emit(&Envelope::Ready);

        // First measurement lands after mount so late layout is captured.
        let mut measure_at = Some(Instant::now() + self.config.mount_measure());
        let mut caret_at: Option<Instant> = None;
        let mut events_open = true;

        loop {
            tokio::select! {
                biased;
                _ = time::sleep_until(deadline(measure_at)), if measure_at.is_some() => {
                    measure_at = None;
                    self.measure_height();
                }
                _ = time::sleep_until(deadline(caret_at)), if caret_at.is_some() => {
                    caret_at = None;
                    self.report_caret();
                }
                raw = self.inbound.recv() => match raw {
                    Some(raw) => self.handle_payload(&raw).await,
                    None => break,
                },
                event = self.events.recv(), if events_open => match event {
                    Some(event) => self.handle_event(event, &mut measure_at, &mut caret_at).await,
                    None => events_open = false,
                },
            }
        }
        tracing::debug!("transport closed; sync engine stopping");
    }

    async fn handle_payload(&mut self, raw: &str) {
        match Envelope::decode(raw) {
            Ok(Some(envelope)) => self.dispatch(envelope).await,
            Ok(None) => tracing::trace!("ignoring unknown message kind"),
            Err(error) => tracing::warn!(%error, "dropping malformed envelope"),
        }
    }

    async fn dispatch(&mut self, envelope: Envelope) {
        match envelope {
            Envelope::SetValue { value } => self.set_value(value).await,
            Envelope::GetValue { request_id } => self.get_value(request_id).await,
            Envelope::ExecuteCommand { command } => self.execute_command(&command).await,
            other => {
                tracing::trace!(?other, "ignoring envelope not addressed to the surface");
            }
        }
    }

    /// `setValue`: infer the content kind, convert markdown, promote plain
    /// text, then replace the live value. A failed conversion keeps the
    /// previous value — the surface is never left half-updated.
    async fn set_value(&mut self, value: String) {
        let html = if looks_like_markup(&value) {
            value
        } else {
            match self.converter.markdown_to_html(&value).await {
                // Promotion is a no-op when the converter produced markup.
                Ok(converted) => promote(&converted),
                Err(error) => {
                    tracing::warn!(%error, "markdown conversion failed; keeping previous value");
                    return;
                }
            }
        };
        self.surface.set_value(&html);
    }

    /// `getValue`: answer with Markdown, or with the raw markup when
    /// conversion fails. A pending request is never left unanswered over a
    /// conversion failure.
    async fn get_value(&mut self, request_id: RequestId) {
        let markup = self.surface.value();
        let value = match self.converter.html_to_markdown(&markup).await {
            Ok(markdown) => markdown,
            Err(error) => {
                tracing::warn!(%error, "markup conversion failed; answering with raw markup");
                markup
            }
        };
        self.emit(&Envelope::ValueResponse { request_id, value });
    }

    async fn execute_command(&mut self, token: &str) {
        match EditorCommand::parse(token) {
            EditorCommand::Link => self.insert_link().await,
            command => self.surface.apply_command(&command),
        }
    }

    /// The `link` special case: wrap the selection in a hyperlink, or
    /// insert a self-referential one when the selection is empty. No URL
    /// from the prompt means no change at all.
    async fn insert_link(&mut self) {
        let selected = self
            .surface
            .selection()
            .map(|selection| selection.text)
            .unwrap_or_default();
        let Some(url) = self.link_prompt.prompt_url().await else {
            return;
        };
        let label = if selected.is_empty() {
            url.clone()
        } else {
            selected
        };
        let mut anchor = Element::new("a");
        anchor.attrs.push(("href".into(), url));
        anchor.children.push(HtmlNode::Text(label));
        self.surface
            .insert_html(&dom::serialize(&[HtmlNode::Element(anchor)]));
    }

    async fn handle_event(
        &mut self,
        event: SurfaceEvent,
        measure_at: &mut Option<Instant>,
        caret_at: &mut Option<Instant>,
    ) {
        match event {
            SurfaceEvent::Edited => {
                self.emit(&Envelope::ValueChanged {
                    value: self.surface.value(),
                });
                // Measure now and once more after layout settles.
                self.measure_height();
                *measure_at = Some(Instant::now() + self.config.height_settle());
            }
            SurfaceEvent::FocusIn => {
                if self.caret.focus_gained() {
                    *caret_at = Some(Instant::now() + self.config.caret_settle());
                }
            }
            SurfaceEvent::Blur => {
                self.caret.blur();
                *caret_at = None;
            }
            SurfaceEvent::Resized { height } => self.emit_height(height),
            SurfaceEvent::Paste { html, text } => self.paste(html, text),
        }
    }

    /// Clipboard ingestion: HTML is preferred over plain text and always
    /// sanitized; plain text gets its newlines turned into `<br>`.
    /// Unsanitized external markup never reaches the live value.
    fn paste(&mut self, html: Option<String>, text: Option<String>) {
        if let Some(html) = html {
            self.surface.insert_html(&sanitize(&html));
        } else if let Some(text) = text {
            self.surface.insert_html(&breaks_from_newlines(&text));
        }
    }

    fn measure_height(&mut self) {
        let observed = self.surface.content_height();
        self.emit_height(observed);
    }

    fn emit_height(&mut self, observed: f64) {
        if let Some(height) = self.height.observe(observed) {
            self.emit(&Envelope::HeightChanged { height });
        }
    }

    fn report_caret(&mut self) {
        let Some(selection) = self.surface.selection() else {
            return;
        };
        self.emit(&Envelope::CaretPosition {
            position: selection.rect,
        });
        self.caret.mark_sent();
    }

    fn emit(&self, envelope: &Envelope) {
        let payload = match envelope.encode() {
            Ok(payload) => payload,
            Err(error) => {
                tracing::error!(%error, "failed to encode outbound envelope");
                return;
            }
        };
        if let Err(error) = self.transport.send(&payload) {
            tracing::warn!(%error, "failed to send envelope to host");
        }
    }
}

/// Placeholder instant for disabled timer branches; never polled.
fn deadline(at: Option<Instant>) -> Instant {
    at.unwrap_or_else(Instant::now)
}

/// Escape plain text and replace newlines with `<br>`.
fn breaks_from_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push_str("<br>");
        }
        out.push_str(&html_escape::encode_text(line.trim_end_matches('\r')));
    }
    out
}
