//! Infobox records built from one render pass.
//!
//! An [`Infobox`] joins a rendered callout element with the line ranges of its parts. The
//! rendered tree decides *which* groups and rows exist (level-6 headings and the tables that
//! follow them); the locator decides *where* they are in the text.

use crate::key::Key;
use crate::locate::{
    is_unlocked, key_path_in, locate_callout_ref, locate_group, locate_rows, locate_title,
    row_label, CalloutRef,
};
use crate::render::{Element, ElementId};
use crate::section::{SectionKind, SectionTree};
use crate::session::Affordance;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
/// Content shape of a group.
pub enum GroupKind {
    /// A key/value table.
    Table,
    /// Anything else, e.g. free text.
    Text,
}

impl GroupKind {
    #[must_use]
    /// Parse the group type entered in a prompt (`table` or `text`).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "" | "table" => Some(Self::Table),
            "text" => Some(Self::Text),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
/// One table row of a group.
pub struct InfoboxRow {
    /// Arena index of the row section.
    pub section: usize,
    /// Rendered table row, if the renderer produced one for this line.
    pub element: Option<ElementId>,
    /// Text of the first cell.
    pub label: String,
    /// Frontmatter path of the row's formula reference.
    pub key: Option<Key>,
}

#[derive(Clone, Debug, Serialize)]
/// One named group of an infobox.
pub struct InfoboxGroup {
    /// Heading text.
    pub label: String,
    /// Content shape.
    pub kind: GroupKind,
    /// Arena index of the whole group (header through content).
    pub section: usize,
    /// Rendered level-6 heading.
    pub header: ElementId,
    /// Arena index of the header line.
    pub header_section: usize,
    /// Rendered table following the heading, if any.
    pub content: Option<ElementId>,
    /// Arena index of the content range.
    pub content_section: usize,
    /// Body rows of a table group.
    pub rows: Vec<InfoboxRow>,
}

#[derive(Clone, Debug, Serialize)]
/// One infobox callout of a document.
pub struct Infobox {
    /// Title text of the leading level-1 heading.
    pub title: Option<String>,
    /// Identity used by every action and drag on this callout.
    pub callout_ref: CalloutRef,
    /// Rendered callout content element.
    pub element: ElementId,
    /// Rendered title heading.
    pub header: Option<ElementId>,
    /// Arena index of the whole callout.
    pub callout: usize,
    /// Whether the unlocked sentinel is missing.
    pub locked: bool,
    /// Groups in document order.
    pub groups: Vec<InfoboxGroup>,
    /// Source document.
    pub file: PathBuf,
    /// Affordances attached during the render pass.
    pub affordances: Vec<Affordance>,
}

impl Infobox {
    #[must_use]
    /// Group with the given label.
    pub fn group(&self, label: &str) -> Option<&InfoboxGroup> {
        self.groups.iter().find(|group| group.label == label)
    }
}

/// Locate `rendered` in `lines` and record its sections in `tree`.
///
/// `ordinal` is the number of callouts with the same title rendered before this one. Returns
/// `None` when the callout cannot be found in the text, which happens when the render ran ahead
/// of a write; groups that cannot be located are skipped.
pub fn build_infobox(
    lines: &[String],
    rendered: &Element,
    ordinal: usize,
    file: &Path,
    tree: &mut SectionTree,
) -> Option<Infobox> {
    let title = rendered.title_text().map(str::to_string);
    let callout_ref = CalloutRef {
        title: title.clone(),
        ordinal,
    };
    let Some(range) = locate_callout_ref(lines, &callout_ref) else {
        tracing::info!(
            file = %file.display(),
            ?title,
            ordinal,
            "callout not in text yet, skipping"
        );
        return None;
    };
    let callout = tree.push(
        None,
        SectionKind::Callout,
        title.as_deref().unwrap_or_default(),
        range,
        lines,
        Some(rendered.id),
    );

    let header = rendered.title().map(|heading| heading.id);
    if let (Some(element), Some(line)) = (header, locate_title(lines, range)) {
        let label = title.as_deref().unwrap_or_default();
        tree.push(Some(callout), SectionKind::Title, label, line, lines, Some(element));
    }

    let mut groups = Vec::new();
    for (index, child) in rendered.children.iter().enumerate() {
        let Some((6, label)) = child.heading() else {
            continue;
        };
        let Some(found) = locate_group(lines, range, label) else {
            tracing::warn!(file = %file.display(), label, "group not found in text");
            continue;
        };
        let table = rendered
            .children
            .get(index + 1)
            .filter(|next| next.is_table());

        let section = tree.push(
            Some(callout),
            SectionKind::Group,
            label,
            found.whole(),
            lines,
            None,
        );
        let header_section = tree.push(
            Some(section),
            SectionKind::GroupHeader,
            label,
            found.header,
            lines,
            Some(child.id),
        );
        let content_section = tree.push(
            Some(section),
            SectionKind::GroupContent,
            label,
            found.content,
            lines,
            table.map(|t| t.id),
        );

        let rows = locate_rows(lines, found.content)
            .into_iter()
            .enumerate()
            .map(|(row_index, row)| {
                let line = &lines[row.start];
                let cell = row_label(line).unwrap_or_default().to_string();
                let element = table
                    .and_then(|t| t.children.get(row_index))
                    .map(|r| r.id);
                InfoboxRow {
                    section: tree.push(
                        Some(content_section),
                        SectionKind::Row,
                        &cell,
                        row,
                        lines,
                        element,
                    ),
                    element,
                    key: key_path_in(line).and_then(Key::new),
                    label: cell,
                }
            })
            .collect();

        groups.push(InfoboxGroup {
            label: label.to_string(),
            kind: if table.is_some() {
                GroupKind::Table
            } else {
                GroupKind::Text
            },
            section,
            header: child.id,
            header_section,
            content: table.map(|t| t.id),
            content_section,
            rows,
        });
    }

    Some(Infobox {
        title,
        callout_ref,
        element: rendered.id,
        header,
        callout,
        locked: !is_unlocked(lines, range),
        groups,
        file: file.to_path_buf(),
        affordances: Vec::new(),
    })
}

#[cfg(test)]
#[path = "tests/infobox.rs"]
mod tests;
