use crate::types::{BlockId, TextRun};
use serde::{Deserialize, Serialize};

/// Block types the flattener knows how to extract text from.
///
/// Everything else the store can return is carried as `Unsupported`
/// with its wire type name, so it can be named in a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    BulletedListItem,
    NumberedListItem,
    Quote,
    Code,
    Callout,
    Toggle,
    Unsupported(String),
}

/// How a block joins its text with the text of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineBreak {
    /// Entries separated by newlines.
    Lines,
    /// Entries separated by newlines, framed by a leading and trailing newline.
    Framed,
    /// Entries separated by single spaces.
    Spaces,
}

impl BlockKind {
    /// Maps a Notion block type name onto the supported set.
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "paragraph" => Self::Paragraph,
            "heading_1" => Self::Heading1,
            "heading_2" => Self::Heading2,
            "heading_3" => Self::Heading3,
            "bulleted_list_item" => Self::BulletedListItem,
            "numbered_list_item" => Self::NumberedListItem,
            "quote" => Self::Quote,
            "code" => Self::Code,
            "callout" => Self::Callout,
            "toggle" => Self::Toggle,
            other => Self::Unsupported(other.to_string()),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Heading1 => "heading_1",
            Self::Heading2 => "heading_2",
            Self::Heading3 => "heading_3",
            Self::BulletedListItem => "bulleted_list_item",
            Self::NumberedListItem => "numbered_list_item",
            Self::Quote => "quote",
            Self::Code => "code",
            Self::Callout => "callout",
            Self::Toggle => "toggle",
            Self::Unsupported(name) => name,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }

    pub fn line_break(&self) -> LineBreak {
        match self {
            Self::Paragraph | Self::Quote | Self::Code => LineBreak::Lines,
            Self::Heading1 | Self::Heading2 | Self::Heading3 => LineBreak::Framed,
            _ => LineBreak::Spaces,
        }
    }
}

/// Type-specific payload of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockContent {
    /// Formatted text runs (paragraphs, headings, list items, ...).
    RichText(Vec<TextRun>),
    /// Literal code segments and the language label.
    Code {
        language: String,
        segments: Vec<String>,
    },
    /// Nothing extractable (unsupported types, or a missing payload).
    Empty,
}

/// Expansion state of a block's child collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Children {
    /// The block owns no children.
    None,
    /// The block owns children that were not fetched (non-recursive fetch
    /// or depth cap).
    Pending,
    Loaded(Vec<Block>),
    /// Fetching the children failed; the block is rendered without them.
    Failed { reason: String },
}

/// A typed node of rich content, as retrieved from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    pub has_children: bool,
    pub content: BlockContent,
    pub children: Children,
}

impl Block {
    pub fn new(id: BlockId, kind: BlockKind, content: BlockContent) -> Self {
        Self {
            id,
            kind,
            has_children: false,
            content,
            children: Children::None,
        }
    }

    /// A block of the given kind whose payload is rich text.
    pub fn text(id: BlockId, kind: BlockKind, runs: Vec<TextRun>) -> Self {
        Self::new(id, kind, BlockContent::RichText(runs))
    }

    pub fn paragraph(id: BlockId, runs: Vec<TextRun>) -> Self {
        Self::text(id, BlockKind::Paragraph, runs)
    }

    pub fn code(id: BlockId, language: impl Into<String>, segments: Vec<String>) -> Self {
        Self::new(
            id,
            BlockKind::Code,
            BlockContent::Code {
                language: language.into(),
                segments,
            },
        )
    }

    pub fn unsupported(id: BlockId, type_name: impl Into<String>) -> Self {
        Self::new(
            id,
            BlockKind::Unsupported(type_name.into()),
            BlockContent::Empty,
        )
    }

    /// Marks the block as owning children that have not been fetched yet.
    pub fn with_pending_children(mut self) -> Self {
        self.has_children = true;
        self.children = Children::Pending;
        self
    }

    /// Attaches an already-resolved child sequence.
    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        self.set_children(children);
        self
    }

    pub fn set_children(&mut self, children: Vec<Block>) {
        self.has_children = true;
        self.children = Children::Loaded(children);
    }

    pub fn mark_expansion_failed(&mut self, reason: impl Into<String>) {
        self.children = Children::Failed {
            reason: reason.into(),
        };
    }

    /// The resolved children, or an empty slice when none are available.
    pub fn child_blocks(&self) -> &[Block] {
        match &self.children {
            Children::Loaded(children) => children,
            _ => &[],
        }
    }

    pub fn expansion_failed(&self) -> bool {
        matches!(self.children, Children::Failed { .. })
    }

    pub fn block_type(&self) -> &str {
        self.kind.type_name()
    }
}
