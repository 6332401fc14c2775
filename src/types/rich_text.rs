use serde::{Deserialize, Serialize};

/// Formatting flags attached to a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
}

/// A span of plain text with its annotations. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub annotations: Annotations,
}

impl TextRun {
    pub fn new(text: impl Into<String>, annotations: Annotations) -> Self {
        Self {
            text: text.into(),
            annotations,
        }
    }

    /// A run with no annotations.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Annotations::default())
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self::new(
            text,
            Annotations {
                bold: true,
                ..Default::default()
            },
        )
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Self::new(
            text,
            Annotations {
                italic: true,
                ..Default::default()
            },
        )
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Keeps at most `max_chars` characters of `text`, cutting on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
