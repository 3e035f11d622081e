//! Protocol value types: request correlation tokens and caret geometry.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use smol_str::{SmolStr, format_smolstr};

/// Opaque correlation token for a `getValue` round trip.
///
/// The issuer guarantees uniqueness per call; the surface echoes the token
/// back untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(SmolStr);

impl RequestId {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Monotonic [`RequestId`] generator for the host-side issuer.
#[derive(Debug, Default)]
pub struct RequestIds {
    next: AtomicU64,
}

impl RequestIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh token. Never repeats within one issuer.
    pub fn next_id(&self) -> RequestId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        RequestId(format_smolstr!("r{}", n + 1))
    }
}

/// Bounding geometry of the caret or current selection, in CSS pixels
/// relative to the surface viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaretRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub bottom: f64,
    pub right: f64,
}

impl CaretRect {
    /// Build a rect from its origin and size, deriving `bottom`/`right`.
    pub fn from_origin_size(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            bottom: y + height,
            right: x + width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique_and_monotonic() {
        let ids = RequestIds::new();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert_eq!(a.as_str(), "r1");
        assert_eq!(b.as_str(), "r2");
    }

    #[test]
    fn test_caret_rect_derives_extents() {
        let rect = CaretRect::from_origin_size(10.0, 20.0, 2.0, 16.0);
        assert_eq!(rect.bottom, 36.0);
        assert_eq!(rect.right, 12.0);
    }
}
