//! Format trait describing how a document type exposes infobox structure to tree-sitter.
//!
//! The renderer only needs three things from a format: the grammar, a query that captures
//! candidate callout containers, and a query that captures the blocks inside a callout that the
//! infobox cares about (headings, tables and paragraphs).

pub mod markdown;

/// Tree-sitter grammar and queries for one document format.
pub trait Format {
    /// Grammar used to parse the whole document.
    fn language(&self) -> tree_sitter::Language;
    /// Query capturing blockquote-like containers as `@callout`.
    fn callout_query(&self) -> &str;
    /// Query capturing `@heading`, `@table` and `@paragraph` blocks.
    fn block_query(&self) -> &str;
}
