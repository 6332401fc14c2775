// src/generation/tags.rs
//! Normalization of a raw tag completion.

use indexmap::IndexSet;

/// Turns `"Rust, Async IO，rust"` into `["rust", "asyncio"]`.
///
/// Lowercased, split on ASCII and full-width commas, whitespace removed,
/// empties and repeats dropped (first occurrence wins), then capped.
pub fn parse_tags(raw: &str, max_tags: usize) -> Vec<String> {
    let lowered = raw.to_lowercase();
    let tags: IndexSet<String> = lowered
        .split([',', '，'])
        .map(|tag| tag.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .filter(|tag| !tag.is_empty())
        .collect();

    tags.into_iter().take(max_tags).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalizes_case_spacing_and_separators() {
        assert_eq!(
            parse_tags(" Rust, Async IO，knowledge-base ,", 5),
            vec!["rust", "asyncio", "knowledge-base"]
        );
    }

    #[test]
    fn duplicates_keep_first_position() {
        assert_eq!(parse_tags("ai,Rust,AI,notion", 5), vec!["ai", "rust", "notion"]);
    }

    #[test]
    fn output_is_capped() {
        assert_eq!(parse_tags("a,b,c,d,e,f,g", 3), vec!["a", "b", "c"]);
        assert!(parse_tags("a,b", 0).is_empty());
    }

    #[test]
    fn blank_completion_yields_no_tags() {
        assert!(parse_tags("  ,  ，", 5).is_empty());
    }
}
