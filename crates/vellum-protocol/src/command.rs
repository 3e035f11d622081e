//! Formatting command tokens carried by `executeCommand` envelopes.

use smol_str::SmolStr;

/// A formatting command applied to the current selection.
///
/// The wire carries an opaque token; dispatchers parse it so the `link`
/// special case is a match arm. Tokens outside the known set pass through
/// to the editing surface untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCommand {
    Bold,
    Italic,
    Strikethrough,
    BulletList,
    OrderedList,
    /// Hyperlink the selection; requires an out-of-band URL prompt.
    Link,
    /// Anything else, forwarded verbatim to the surface.
    Other(SmolStr),
}

impl EditorCommand {
    /// Parse a wire token.
    pub fn parse(token: &str) -> Self {
        match token {
            "bold" => Self::Bold,
            "italic" => Self::Italic,
            "strikethrough" => Self::Strikethrough,
            "bulletList" => Self::BulletList,
            "orderedList" => Self::OrderedList,
            "link" => Self::Link,
            other => Self::Other(other.into()),
        }
    }

    /// The wire token for this command.
    pub fn token(&self) -> &str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Strikethrough => "strikethrough",
            Self::BulletList => "bulletList",
            Self::OrderedList => "orderedList",
            Self::Link => "link",
            Self::Other(token) => token.as_str(),
        }
    }
}
