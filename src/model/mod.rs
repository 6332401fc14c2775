//! Domain model: the block tree retrieved for a document, and the
//! document record itself.

mod block;
mod document;

pub use block::{Block, BlockContent, BlockKind, Children, LineBreak};
pub use document::Document;
