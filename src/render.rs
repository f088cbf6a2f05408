//! Rendered element tree for infobox callouts.
//!
//! This plays the part of the host's rendering pipeline: it turns markdown into a small tree of
//! elements (headings with their level and text, tables and their rows) for each infobox callout.
//! The rest of the crate reads only structure and identity from these elements; the text truth
//! always comes from the document lines.

use crate::error::{Error, Result};
use crate::formats::Format;
use crate::locate::INFOBOX_CALLOUT;
use serde::Serialize;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Parser, Query, QueryCursor};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
/// Identity of a rendered element within one render pass.
pub struct ElementId(pub u32);

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
/// What a rendered element is.
pub enum ElementKind {
    /// Content container of an infobox callout.
    Callout,
    /// ATX heading.
    Heading {
        /// Heading level, 1 to 6.
        level: u8,
        /// Heading text without markers.
        text: String,
    },
    /// Pipe table.
    Table,
    /// Body row of a pipe table.
    TableRow,
    /// Any paragraph.
    Paragraph,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// Node of the rendered tree.
pub struct Element {
    /// Identity used for wiring affordances.
    pub id: ElementId,
    /// Structural kind.
    pub kind: ElementKind,
    /// Child elements in document order.
    pub children: Vec<Element>,
}

impl Element {
    #[must_use]
    /// Element with the given identity, kind and children.
    pub fn new(id: ElementId, kind: ElementKind, children: Vec<Element>) -> Self {
        Self { id, kind, children }
    }

    #[must_use]
    /// Heading level and text, if this is a heading.
    pub fn heading(&self) -> Option<(u8, &str)> {
        match &self.kind {
            ElementKind::Heading { level, text } => Some((*level, text.as_str())),
            _ => None,
        }
    }

    #[must_use]
    /// Whether this element is a table.
    pub fn is_table(&self) -> bool {
        self.kind == ElementKind::Table
    }

    #[must_use]
    /// The leading level-1 heading of a callout, which serves as its title.
    pub fn title(&self) -> Option<&Element> {
        self.children
            .first()
            .filter(|child| matches!(child.heading(), Some((1, _))))
    }

    #[must_use]
    /// Title text of a callout.
    pub fn title_text(&self) -> Option<&str> {
        self.title().and_then(Element::heading).map(|(_, text)| text)
    }
}

#[derive(Default)]
struct IdSource(u32);

impl IdSource {
    fn next(&mut self) -> ElementId {
        self.0 += 1;
        ElementId(self.0)
    }
}

/// Render every infobox callout of `text` into an element tree.
///
/// Callouts are returned in document order. Block quotes that do not start with the infobox
/// marker are ignored.
///
/// # Errors
///
/// Returns [`Error::Render`] if the grammar or the queries cannot be loaded.
pub fn render_callouts(text: &str, format: &impl Format) -> Result<Vec<Element>> {
    let language = format.language();
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| Error::Render(e.to_string()))?;
    let tree = parser
        .parse(text, None)
        .ok_or_else(|| Error::Render("parser produced no tree".to_string()))?;
    let callout_query =
        Query::new(&language, format.callout_query()).map_err(|e| Error::Render(e.to_string()))?;
    let block_query =
        Query::new(&language, format.block_query()).map_err(|e| Error::Render(e.to_string()))?;

    let source = text.as_bytes();
    let lines: Vec<&str> = text.split('\n').collect();
    let mut ids = IdSource::default();
    let mut callouts = Vec::new();

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&callout_query, tree.root_node(), source);
    while let Some(m) = matches.next() {
        for capture in m.captures {
            let row = capture.node.start_position().row;
            let is_infobox = lines
                .get(row)
                .is_some_and(|line| line.trim_start().starts_with(INFOBOX_CALLOUT));
            if is_infobox {
                callouts.push(capture.node);
            }
        }
    }
    callouts.sort_by_key(Node::start_byte);
    callouts.dedup_by_key(|node| node.id());

    Ok(callouts
        .into_iter()
        .map(|node| render_callout(node, &block_query, source, &lines, &mut ids))
        .collect())
}

fn render_callout(
    callout: Node,
    block_query: &Query,
    source: &[u8],
    lines: &[&str],
    ids: &mut IdSource,
) -> Element {
    let id = ids.next();
    let marker_row = callout.start_position().row;
    let names = block_query.capture_names();

    let mut blocks: Vec<(Node, &str)> = Vec::new();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(block_query, callout, source);
    while let Some(m) = matches.next() {
        for capture in m.captures {
            blocks.push((capture.node, names[capture.index as usize]));
        }
    }
    blocks.sort_by_key(|(node, _)| node.start_byte());
    blocks.dedup_by_key(|(node, _)| node.id());

    let children = blocks
        .into_iter()
        .filter_map(|(node, name)| match name {
            "heading" => Some(Element::new(
                ids.next(),
                ElementKind::Heading {
                    level: heading_level(node),
                    text: heading_text(node, source, lines),
                },
                Vec::new(),
            )),
            "table" => {
                let table_id = ids.next();
                let mut walker = node.walk();
                let rows = node
                    .named_children(&mut walker)
                    .filter(|child| child.kind() == "pipe_table_row")
                    .map(|_| Element::new(ids.next(), ElementKind::TableRow, Vec::new()))
                    .collect();
                Some(Element::new(table_id, ElementKind::Table, rows))
            }
            // the callout's own `[!infobox]` title paragraph is not content
            "paragraph" if node.start_position().row != marker_row => {
                Some(Element::new(ids.next(), ElementKind::Paragraph, Vec::new()))
            }
            _ => None,
        })
        .collect();

    Element::new(id, ElementKind::Callout, children)
}

fn heading_level(node: Node) -> u8 {
    let mut walker = node.walk();
    let level = node.children(&mut walker).find_map(|child| match child.kind() {
        "atx_h1_marker" => Some(1),
        "atx_h2_marker" => Some(2),
        "atx_h3_marker" => Some(3),
        "atx_h4_marker" => Some(4),
        "atx_h5_marker" => Some(5),
        "atx_h6_marker" => Some(6),
        _ => None,
    });
    level.unwrap_or(1)
}

fn heading_text(node: Node, source: &[u8], lines: &[&str]) -> String {
    if let Some(text) = node
        .child_by_field_name("heading_content")
        .and_then(|content| content.utf8_text(source).ok())
    {
        return text.trim().to_string();
    }
    // fall back to the raw line: drop quote markers, then the hashes
    let line = lines.get(node.start_position().row).copied().unwrap_or("");
    line.trim_start_matches(|c: char| c == '>' || c.is_whitespace())
        .trim_start_matches('#')
        .trim()
        .to_string()
}

#[cfg(test)]
#[path = "tests/render.rs"]
mod tests;
