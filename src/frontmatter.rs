//! YAML frontmatter block at the top of a document.
//!
//! The block is the `---` line at index 0 and everything up to the next literal `---` line.
//! Reading parses the enclosed lines into a [`serde_yaml::Value`] mapping; writing replaces only
//! that bounded region, so content after the closing delimiter is never touched.

use crate::error::{Error, Result};
use serde_yaml::{Mapping, Value};

/// Opening and closing line of a frontmatter block.
pub const DELIMITER: &str = "---";

#[derive(Clone, Debug, PartialEq)]
/// Parsed frontmatter and the position of its closing delimiter.
pub struct Frontmatter {
    /// Parsed mapping; an empty block is an empty mapping.
    pub doc: Value,
    /// Line index of the closing `---`.
    pub end: usize,
}

#[must_use]
/// Index of the closing delimiter, if the document starts with a complete block.
pub fn frontmatter_end(lines: &[String]) -> Option<usize> {
    if lines.first().map(|line| line.trim_end()) != Some(DELIMITER) {
        return None;
    }
    lines
        .iter()
        .skip(1)
        .position(|line| line.trim_end() == DELIMITER)
        .map(|offset| offset + 1)
}

/// Parse the frontmatter block of `lines`.
///
/// Returns `Ok(None)` when the document has no complete block.
///
/// # Errors
///
/// Returns [`Error::Yaml`] for malformed YAML and [`Error::FrontmatterShape`] when the block is
/// valid YAML but not a mapping.
pub fn read_frontmatter(lines: &[String]) -> Result<Option<Frontmatter>> {
    let Some(end) = frontmatter_end(lines) else {
        return Ok(None);
    };
    let block = lines[1..end].join("\n");
    let doc = if block.trim().is_empty() {
        Value::Mapping(Mapping::new())
    } else {
        match serde_yaml::from_str::<Value>(&block)? {
            Value::Null => Value::Mapping(Mapping::new()),
            doc @ Value::Mapping(_) => doc,
            _ => return Err(Error::FrontmatterShape),
        }
    };
    Ok(Some(Frontmatter { doc, end }))
}

#[must_use]
/// Frontmatter for display purposes: anything unreadable is an empty mapping.
pub fn frontmatter_or_empty(lines: &[String]) -> Value {
    match read_frontmatter(lines) {
        Ok(Some(frontmatter)) => frontmatter.doc,
        Ok(None) => Value::Mapping(Mapping::new()),
        Err(e) => {
            tracing::warn!("ignoring unreadable frontmatter: {e}");
            Value::Mapping(Mapping::new())
        }
    }
}

/// Serialise `doc` into the lines between the delimiters.
///
/// An empty mapping produces no lines rather than `{}`.
///
/// # Errors
///
/// Returns [`Error::Yaml`] if the value cannot be serialised.
pub fn serialize(doc: &Value) -> Result<Vec<String>> {
    if doc.is_null() || doc.as_mapping().is_some_and(Mapping::is_empty) {
        return Ok(Vec::new());
    }
    let yaml = serde_yaml::to_string(doc)?;
    let trimmed = yaml.trim_end();
    let body = trimmed.strip_prefix("---\n").unwrap_or(trimmed);
    Ok(body.split('\n').map(str::to_string).collect())
}

// `"\r"` when `lines` were split from CRLF text
fn carriage_return(lines: &[String]) -> &'static str {
    if lines.first().is_some_and(|line| line.ends_with('\r')) {
        "\r"
    } else {
        ""
    }
}

/// Replace the frontmatter block ending at `end` with the serialised `doc`.
///
/// With no existing block (`end == None`) a non-empty `doc` is inserted as a new block at the
/// top of the document and an empty one leaves the lines untouched. Written lines follow the
/// document's line ending.
///
/// # Errors
///
/// Returns [`Error::Yaml`] if the value cannot be serialised.
pub fn write_frontmatter(lines: &mut Vec<String>, doc: &Value, end: Option<usize>) -> Result<()> {
    let body = serialize(doc)?;
    let replaced = match end {
        Some(end) => 0..end + 1,
        None if body.is_empty() => return Ok(()),
        None => 0..0,
    };
    let cr = carriage_return(lines);
    let mut block = Vec::with_capacity(body.len() + 2);
    block.push(format!("{DELIMITER}{cr}"));
    block.extend(body.into_iter().map(|line| line + cr));
    block.push(format!("{DELIMITER}{cr}"));
    lines.splice(replaced, block);
    Ok(())
}

#[cfg(test)]
#[path = "tests/frontmatter.rs"]
mod tests;
