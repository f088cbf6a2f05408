//! Line scanner that finds infobox structure in raw document lines.
//!
//! Nothing here looks at a parse tree: callouts, groups and rows are found purely from the
//! markers embedded in the text, which keeps every edit a minimal splice of the user's own lines.
//! All functions are pure over the lines they are given and must be re-run against the freshest
//! text before any mutation, since every edit shifts the lines below it.
//!
//! Boundary rules:
//!
//! - a *quote line* starts with `>`;
//! - a *quote heading* is a quote line whose content (after `>` and spaces) is one to six `#`
//!   followed by a space or the end of the line, so `> #tag` is not a heading;
//! - a *table line* is a quote line whose content starts with `|`; a *delimiter row* is a table
//!   line made only of `|`, `-`, `:` and spaces.

use crate::key::FORMULA_PREFIX;
use crate::section::LineRange;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// First line of every infobox callout.
pub const INFOBOX_CALLOUT: &str = "> [!infobox]";
/// Prefix of a group header line.
pub const GROUP_PREFIX: &str = "> ###### ";
/// Prefix of the callout title line.
pub const TITLE_PREFIX: &str = "> # ";
/// Sentinel line that marks a callout as editable.
pub const UNLOCKED_SENTINEL: &str = "> %% unlocked %%";

static FORMULA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"`{}([^`]+)`", regex::escape(FORMULA_PREFIX)))
        .expect("formula pattern is valid")
});

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
/// Identity of one infobox callout.
///
/// Several callouts may share a title, or have none, so a callout is named by its title plus its
/// position among the callouts carrying that same title.
pub struct CalloutRef {
    /// Title text of the `> # <title>` line; `None` for untitled callouts.
    pub title: Option<String>,
    /// Zero-based position among callouts with this title, in document order.
    pub ordinal: usize,
}

impl CalloutRef {
    #[must_use]
    /// The first callout titled `title`.
    pub fn titled(title: &str) -> Self {
        Self {
            title: Some(title.trim().to_string()),
            ordinal: 0,
        }
    }

    #[must_use]
    /// The `ordinal`-th callout without a title.
    pub fn untitled(ordinal: usize) -> Self {
        Self {
            title: None,
            ordinal,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Line ranges of one group.
pub struct GroupRange {
    /// The `> ###### Label` line.
    pub header: LineRange,
    /// Lines after the header up to the next heading or the callout end; may be empty.
    pub content: LineRange,
}

impl GroupRange {
    #[must_use]
    /// Header through content end.
    pub fn whole(&self) -> LineRange {
        LineRange::new(self.header.start, self.content.end)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// How to pick a row inside a group's content.
pub enum RowRef<'a> {
    /// The n-th line of the content, counted from the line after the header.
    Index(usize),
    /// The row whose formula path equals this segment or ends in `.segment`.
    Suffix(&'a str),
    /// The row whose formula path is exactly this dotted path.
    Path(&'a str),
    /// The n-th table body row, matching the n-th rendered row.
    Body(usize),
}

fn quote_content(line: &str) -> Option<&str> {
    line.strip_prefix('>').map(str::trim_start)
}

#[must_use]
/// Whether `line` belongs to a blockquote.
pub fn is_quote_line(line: &str) -> bool {
    line.starts_with('>')
}

#[must_use]
/// Heading level of a blockquote heading line, if it is one.
pub fn quote_heading_level(line: &str) -> Option<usize> {
    let content = quote_content(line)?;
    let hashes = content.chars().take_while(|&c| c == '#').count();
    let rest = &content[hashes..];
    ((1..=6).contains(&hashes) && (rest.is_empty() || rest.starts_with(' '))).then_some(hashes)
}

#[must_use]
/// Whether `line` is a blockquote table line.
pub fn is_table_line(line: &str) -> bool {
    quote_content(line).is_some_and(|content| content.starts_with('|'))
}

#[must_use]
/// Whether `line` is a table delimiter row such as `> | --- | :-: |`.
pub fn is_delimiter_row(line: &str) -> bool {
    is_table_line(line)
        && quote_content(line).is_some_and(|content| {
            content.contains('-')
                && content
                    .chars()
                    .all(|c| matches!(c, '|' | '-' | ':') || c.is_whitespace())
        })
}

fn callout_end(lines: &[String], marker: usize) -> usize {
    lines
        .iter()
        .enumerate()
        .skip(marker + 1)
        .find(|(_, line)| !is_quote_line(line))
        .map_or(lines.len(), |(index, _)| index)
}

#[must_use]
/// Title of the callout at `range`: its first heading, when that is `> # <title>`.
pub fn callout_title(lines: &[String], range: LineRange) -> Option<&str> {
    range
        .slice(lines)
        .iter()
        .skip(1)
        .find(|line| quote_heading_level(line).is_some())
        .and_then(|line| line.strip_prefix(TITLE_PREFIX))
        .map(str::trim)
}

#[must_use]
/// Find the infobox callout, marker line included.
///
/// With a `title`, the first callout whose first heading is `> # <title>` is chosen; without
/// one, the first callout in the document. `None` usually means the host rendered before the
/// text write landed and the caller should simply wait for the next render.
pub fn locate_callout(lines: &[String], title: Option<&str>) -> Option<LineRange> {
    locate_callouts(lines)
        .into_iter()
        .find(|range| title.is_none_or(|t| callout_title(lines, *range) == Some(t.trim())))
}

#[must_use]
/// Every infobox callout in document order.
pub fn locate_callouts(lines: &[String]) -> Vec<LineRange> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.starts_with(INFOBOX_CALLOUT))
        .map(|(marker, _)| LineRange::new(marker, callout_end(lines, marker)))
        .collect()
}

#[must_use]
/// Find the callout named by `callout`.
///
/// Unlike [`locate_callout`], a missing title matches only untitled callouts, so two untitled
/// callouts (or two sharing a title) each resolve to their own lines.
pub fn locate_callout_ref(lines: &[String], callout: &CalloutRef) -> Option<LineRange> {
    let title = callout.title.as_deref().map(str::trim);
    locate_callouts(lines)
        .into_iter()
        .filter(|range| callout_title(lines, *range) == title)
        .nth(callout.ordinal)
}

#[must_use]
/// Line of the callout title (`> # Title`), if present.
pub fn locate_title(lines: &[String], callout: LineRange) -> Option<LineRange> {
    (callout.start + 1..callout.end)
        .find(|&index| quote_heading_level(&lines[index]).is_some())
        .filter(|&index| quote_heading_level(&lines[index]) == Some(1))
        .map(LineRange::line)
}

#[must_use]
/// Whether the unlocked sentinel sits directly under the callout marker.
pub fn is_unlocked(lines: &[String], callout: LineRange) -> bool {
    callout.len() > 1
        && lines
            .get(callout.start + 1)
            .is_some_and(|line| line.trim_end() == UNLOCKED_SENTINEL)
}

fn group_at(lines: &[String], callout: LineRange, header: usize) -> GroupRange {
    let end = (header + 1..callout.end)
        .find(|&index| quote_heading_level(&lines[index]).is_some())
        .unwrap_or(callout.end);
    GroupRange {
        header: LineRange::line(header),
        content: LineRange::new(header + 1, end),
    }
}

#[must_use]
/// Find the group whose header line is exactly `> ###### <label>` inside `callout`.
pub fn locate_group(lines: &[String], callout: LineRange, label: &str) -> Option<GroupRange> {
    let wanted = format!("{GROUP_PREFIX}{label}");
    (callout.start..callout.end.min(lines.len()))
        .find(|&index| lines[index].trim_end() == wanted)
        .map(|header| group_at(lines, callout, header))
}

#[must_use]
/// Every level-6 group inside `callout`, in document order, with its label.
pub fn locate_groups(lines: &[String], callout: LineRange) -> Vec<(String, GroupRange)> {
    (callout.start..callout.end.min(lines.len()))
        .filter(|&index| quote_heading_level(&lines[index]) == Some(6))
        .map(|header| {
            let label = lines[header]
                .strip_prefix(GROUP_PREFIX)
                .unwrap_or_default()
                .trim()
                .to_string();
            (label, group_at(lines, callout, header))
        })
        .collect()
}

#[must_use]
/// Table body rows of a group's content: table lines after the delimiter row.
pub fn locate_rows(lines: &[String], content: LineRange) -> Vec<LineRange> {
    let Some(delimiter) =
        (content.start..content.end).find(|&index| is_delimiter_row(&lines[index]))
    else {
        return Vec::new();
    };
    (delimiter + 1..content.end)
        .take_while(|&index| is_table_line(&lines[index]))
        .map(LineRange::line)
        .collect()
}

#[must_use]
/// Find a single row line inside a group's content.
pub fn locate_row(lines: &[String], content: LineRange, row: RowRef<'_>) -> Option<LineRange> {
    match row {
        RowRef::Index(n) => {
            let index = content.start + n;
            (index < content.end).then(|| LineRange::line(index))
        }
        RowRef::Body(n) => locate_rows(lines, content).get(n).copied(),
        RowRef::Suffix(segment) => (content.start..content.end)
            .find(|&index| {
                key_path_in(&lines[index]).is_some_and(|path| {
                    path == segment
                        || path
                            .strip_suffix(segment)
                            .is_some_and(|head| head.ends_with('.'))
                })
            })
            .map(LineRange::line),
        RowRef::Path(path) => (content.start..content.end)
            .find(|&index| key_path_in(&lines[index]) == Some(path))
            .map(LineRange::line),
    }
}

#[must_use]
/// Dotted path of the formula reference in a single line (`` `=this.<path>` ``).
pub fn key_path_in(line: &str) -> Option<&str> {
    FORMULA
        .captures(line)
        .and_then(|captures| captures.get(1))
        .map(|path| path.as_str())
}

#[must_use]
/// Dotted path of the formula reference in the `row_index`-th line of a group's content.
pub fn extract_key_path(lines: &[String], content: LineRange, row_index: usize) -> Option<String> {
    let row = locate_row(lines, content, RowRef::Index(row_index))?;
    key_path_in(&lines[row.start]).map(str::to_string)
}

#[must_use]
/// Display label of a table row: the text of its first cell.
pub fn row_label(line: &str) -> Option<&str> {
    let content = quote_content(line)?.strip_prefix('|')?;
    let label = content.split('|').next()?.trim();
    (!label.is_empty()).then_some(label)
}

#[cfg(test)]
#[path = "tests/locate.rs"]
mod tests;
