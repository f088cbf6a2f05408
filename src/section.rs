//! Line-range records for the parts of an infobox.
//!
//! A section is a contiguous run of document lines: the whole callout, its title, a group, the
//! group's header line, the group's content, or a single table row. Sections live in an arena
//! ([`SectionTree`]) and refer to each other by index, so the tree can be rebuilt wholesale on
//! every render pass without any ownership juggling. Ranges are half-open everywhere.

use crate::render::ElementId;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
/// Half-open, 0-based range of document lines (`start..end`).
pub struct LineRange {
    /// First line of the range.
    pub start: usize,
    /// One past the last line of the range.
    pub end: usize,
}

impl LineRange {
    #[must_use]
    /// Range covering `start..end`; `end` is clamped so the range is never inverted.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    #[must_use]
    /// Range covering exactly one line.
    pub fn line(line: usize) -> Self {
        Self::new(line, line + 1)
    }

    #[must_use]
    /// Number of lines spanned.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    /// Whether the range spans no lines.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[must_use]
    /// Whether `other` lies within this range.
    pub fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    #[must_use]
    /// Lines of the range, clamped to the document.
    pub fn slice<'a>(&self, lines: &'a [String]) -> &'a [String] {
        let end = self.end.min(lines.len());
        &lines[self.start.min(end)..end]
    }

    #[must_use]
    /// Exact text spanned by the range.
    pub fn text(&self, lines: &[String]) -> String {
        self.slice(lines).join("\n")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
/// Structural role of a section.
pub enum SectionKind {
    /// Whole callout, marker line included.
    Callout,
    /// The `> # Title` line.
    Title,
    /// Group header through group content.
    Group,
    /// The `> ###### Label` line.
    GroupHeader,
    /// Lines after the group header up to the next heading or the callout end.
    GroupContent,
    /// A single table body row.
    Row,
}

#[derive(Clone, Debug, Serialize)]
/// One line-range record, linked to its parent and children by arena index.
pub struct Section {
    /// Structural role.
    pub kind: SectionKind,
    /// Human label: callout title, group label or row label.
    pub label: String,
    /// Lines covered by the section.
    pub range: LineRange,
    /// Exact text of `range` at the time of the render pass.
    pub text: String,
    /// Index of the enclosing section.
    pub parent_index: Option<usize>,
    /// Indices of directly nested sections, in document order.
    pub children_indices: Vec<usize>,
    /// Rendered element this section is wired to, if any.
    pub element: Option<ElementId>,
}

#[derive(Clone, Debug, Default, Serialize)]
/// Arena of sections built fresh for one render pass.
pub struct SectionTree {
    sections: Vec<Section>,
}

impl SectionTree {
    #[must_use]
    /// Empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a section under `parent` and return its index.
    ///
    /// Children are expected in document order and inside their parent's range.
    pub fn push(
        &mut self,
        parent: Option<usize>,
        kind: SectionKind,
        label: &str,
        range: LineRange,
        lines: &[String],
        element: Option<ElementId>,
    ) -> usize {
        let index = self.sections.len();
        if let Some(parent_index) = parent {
            debug_assert!(self.sections[parent_index].range.contains(&range));
            self.sections[parent_index].children_indices.push(index);
        }
        self.sections.push(Section {
            kind,
            label: label.to_string(),
            range,
            text: range.text(lines),
            parent_index: parent,
            children_indices: Vec::new(),
            element,
        });
        index
    }

    #[must_use]
    /// Section at `index`.
    pub fn get(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    /// Direct children of `index` in document order.
    pub fn children(&self, index: usize) -> impl Iterator<Item = &Section> {
        self.get(index)
            .map(|s| s.children_indices.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|&c| self.get(c))
    }

    #[must_use]
    /// All sections in insertion order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    /// Whether no section has been recorded.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
