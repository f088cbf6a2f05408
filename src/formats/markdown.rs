//! Markdown format implementation using tree-sitter-md.
//!
//! Callouts are block quotes; group and title headings are ATX headings (`#` syntax) and
//! key/value tables are GFM pipe tables.

use crate::formats::Format;

/// Tree-sitter queries for infobox callouts in markdown.
pub struct MarkdownFormat;

impl Format for MarkdownFormat {
    fn language(&self) -> tree_sitter::Language {
        tree_sitter_md::LANGUAGE.into()
    }

    fn callout_query(&self) -> &'static str {
        "(block_quote) @callout"
    }

    fn block_query(&self) -> &'static str {
        "[(atx_heading) @heading (pipe_table) @table (paragraph) @paragraph]"
    }
}
