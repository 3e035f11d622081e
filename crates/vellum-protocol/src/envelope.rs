//! The content envelope: one tagged JSON object per message.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::types::{CaretRect, RequestId};

/// Message kinds the codec understands. Tags outside this set are ignored
/// by [`Envelope::decode`] rather than treated as errors, so the protocol
/// can grow without breaking older peers.
const KNOWN_KINDS: &[&str] = &[
    "ready",
    "setValue",
    "getValue",
    "valueResponse",
    "valueChanged",
    "heightChanged",
    "caretPosition",
    "executeCommand",
];

/// One protocol message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Envelope {
    /// Surface -> host. Sent exactly once, after the sync engine finishes
    /// initialization and before it processes any inbound envelope.
    Ready,

    /// Host -> surface. Replace the editor content. `value` may be
    /// Markdown, HTML, or plain text; the kind is inferred on receipt.
    SetValue {
        /// New content in whatever representation the host has.
        value: String,
    },

    /// Host -> surface. Ask for the current content as Markdown.
    GetValue {
        /// Correlation token, echoed back in the response.
        request_id: RequestId,
    },

    /// Surface -> host. Answer to a [`Envelope::GetValue`].
    ValueResponse {
        /// The token from the triggering request.
        request_id: RequestId,
        /// Markdown, or the raw surface markup when conversion failed.
        value: String,
    },

    /// Surface -> host, fire-and-forget on every user edit. The payload is
    /// the live HTML fragment of the surface.
    ValueChanged {
        /// Current surface markup.
        value: String,
    },

    /// Surface -> host, whenever the observed content height changes.
    HeightChanged {
        /// Content height in CSS pixels, never negative.
        height: f64,
    },

    /// Surface -> host. Caret geometry, at most once per focus session.
    CaretPosition {
        /// Bounding box of the caret or selection.
        position: CaretRect,
    },

    /// Host -> surface. Imperative formatting command applied to the
    /// current selection, e.g. `bold` or `link`.
    ExecuteCommand {
        /// Opaque command token; see [`crate::EditorCommand`].
        command: SmolStr,
    },
}

impl Envelope {
    /// Serialize to the JSON wire form.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a wire payload.
    ///
    /// Returns `Ok(None)` for well-formed objects whose `type` tag is not a
    /// known kind; those are ignored by dispatchers. Anything that is not a
    /// JSON object with a string `type` field, or that fails to match its
    /// declared kind, is a [`ProtocolError`].
    pub fn decode(payload: &str) -> Result<Option<Self>, ProtocolError> {
        let value: serde_json::Value = serde_json::from_str(payload)?;
        let kind = value
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or(ProtocolError::MissingTag)?;
        if !KNOWN_KINDS.contains(&kind) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }
}

/// Errors from envelope encoding/decoding.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// The payload is not valid JSON, or its fields do not match the kind.
    #[error("malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The payload has no string `type` field.
    #[error("envelope has no type tag")]
    MissingTag,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_roundtrip_get_value() {
        let msg = Envelope::GetValue {
            request_id: RequestId::from("r1"),
        };
        let wire = msg.encode().unwrap();
        assert_eq!(wire, r#"{"type":"getValue","requestId":"r1"}"#);
        let decoded = Envelope::decode(&wire).unwrap();
        assert_eq!(decoded, Some(msg));
    }

    #[test]
    fn test_roundtrip_value_response() {
        let msg = Envelope::ValueResponse {
            request_id: RequestId::from("r2"),
            value: "# Hi".into(),
        };
        let decoded = Envelope::decode(&msg.encode().unwrap()).unwrap();
        assert_eq!(decoded, Some(msg));
    }

    #[test]
    fn test_ready_has_no_payload() {
        assert_eq!(Envelope::Ready.encode().unwrap(), r#"{"type":"ready"}"#);
        assert_eq!(
            Envelope::decode(r#"{"type":"ready"}"#).unwrap(),
            Some(Envelope::Ready)
        );
    }

    #[test]
    fn test_caret_position_wire_shape() {
        let msg = Envelope::CaretPosition {
            position: CaretRect::from_origin_size(1.0, 2.0, 3.0, 4.0),
        };
        let wire = msg.encode().unwrap();
        assert!(wire.contains(r#""type":"caretPosition""#));
        assert!(wire.contains(r#""bottom":6.0"#));
        assert!(wire.contains(r#""right":4.0"#));
        assert_eq!(Envelope::decode(&wire).unwrap(), Some(msg));
    }

    #[test]
    fn test_unknown_kind_is_ignored_not_error() {
        let decoded = Envelope::decode(r#"{"type":"mystery","value":1}"#).unwrap();
        assert_eq!(decoded, None);
    }

    #[test]
    fn test_malformed_payloads_are_errors() {
        assert!(Envelope::decode("not json").is_err());
        assert!(Envelope::decode(r#"{"value":"no tag"}"#).is_err());
        assert!(Envelope::decode(r#"{"type":42}"#).is_err());
        // Known tag but missing required field.
        assert!(Envelope::decode(r#"{"type":"setValue"}"#).is_err());
    }

    #[test]
    fn test_set_value_camel_case_fields() {
        let decoded = Envelope::decode(r#"{"type":"setValue","value":"hi"}"#).unwrap();
        assert_eq!(decoded, Some(Envelope::SetValue { value: "hi".into() }));
    }
}
