// src/formatting/flatten.rs
//! Block tree to plain text.
//!
//! Pure functions of the tree: no I/O, and identical trees always produce
//! identical text. Children must already be resolved by the fetcher.

use super::markup::EmphasisRenderer;
use crate::model::{Block, BlockContent, BlockKind, LineBreak};

/// Flattens one block and its resolved children.
pub fn flatten(block: &Block) -> String {
    if let BlockKind::Unsupported(type_name) = &block.kind {
        return flatten_unsupported(block, type_name);
    }

    let mut buffer = own_content(block);
    buffer.extend(block.child_blocks().iter().map(flatten));

    match block.kind.line_break() {
        LineBreak::Lines => buffer.join("\n"),
        LineBreak::Framed => format!("\n{}\n", buffer.join("\n")),
        LineBreak::Spaces => buffer.join(" "),
    }
}

/// Flattens a sequence of top-level blocks: non-blank results joined by a
/// newline, the whole trimmed.
pub fn flatten_all(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(flatten)
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// The placeholder names the type; children are still flattened after it.
fn flatten_unsupported(block: &Block, type_name: &str) -> String {
    let placeholder = format!("\n[Unsupported block type: {}]\n", type_name);
    let children: Vec<String> = block.child_blocks().iter().map(flatten).collect();

    if children.is_empty() {
        placeholder
    } else {
        format!("{} {}", placeholder, children.join(" "))
    }
}

/// Buffer entries contributed by the block's own payload.
fn own_content(block: &Block) -> Vec<String> {
    match &block.content {
        BlockContent::RichText(runs) => {
            let text: String = runs
                .iter()
                .filter(|run| !run.is_empty())
                .map(EmphasisRenderer::render_run)
                .collect();
            if text.is_empty() {
                Vec::new()
            } else {
                vec![text]
            }
        }
        BlockContent::Code { language, segments } => {
            if segments.iter().all(|segment| segment.is_empty()) {
                return Vec::new();
            }
            vec![format!("```{}\n{}\n```", language, segments.concat())]
        }
        BlockContent::Empty => Vec::new(),
    }
}
