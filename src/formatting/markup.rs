// src/formatting/markup.rs
//! Emphasis markup for text runs.

use crate::types::{Annotations, TextRun};

/// Renderer for run annotations to Markdown emphasis.
///
/// Only bold and italic survive flattening; the other annotations carry
/// no meaning for a summarizer.
pub struct EmphasisRenderer;

impl EmphasisRenderer {
    /// Bold first, then italic: bold-and-italic renders as `***text***`.
    pub fn apply(content: &str, annotations: &Annotations) -> String {
        let mut result = content.to_string();

        if annotations.bold {
            result = format!("**{}**", result);
        }

        if annotations.italic {
            result = format!("*{}*", result);
        }

        result
    }

    pub fn render_run(run: &TextRun) -> String {
        Self::apply(&run.text, &run.annotations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emphasis_nests_bold_inside_italic() {
        let both = Annotations {
            bold: true,
            italic: true,
            ..Default::default()
        };
        assert_eq!(EmphasisRenderer::apply("text", &both), "***text***");
        assert_eq!(EmphasisRenderer::render_run(&TextRun::bold("b")), "**b**");
        assert_eq!(EmphasisRenderer::render_run(&TextRun::italic("i")), "*i*");
    }

    #[test]
    fn other_annotations_are_ignored() {
        let styled = Annotations {
            strikethrough: true,
            underline: true,
            code: true,
            ..Default::default()
        };
        assert_eq!(EmphasisRenderer::apply("plain", &styled), "plain");
    }
}
