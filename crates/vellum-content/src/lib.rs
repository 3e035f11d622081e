//! vellum-content: pure content transforms for the editing surface.
//!
//! Everything here operates on plain strings or on the abstract HTML tree
//! in [`dom`] — no platform document API, no I/O — so every transform is
//! unit-testable without a rendering environment.
//!
//! - [`dom`] — tolerant HTML fragment parser and serializer
//! - [`sanitize`] — strips presentation-only markup from ingested HTML
//! - [`promote`] — promotes plain text to minimal semantic markup
//! - [`convert`] — Markdown <-> HTML conversion behind a pluggable trait

pub mod convert;
pub mod dom;
pub mod promote;
pub mod sanitize;

pub use convert::{ContentConverter, ConvertError, GfmConverter};
pub use dom::{Element, HtmlNode};
pub use promote::{looks_like_markup, promote};
pub use sanitize::sanitize;
