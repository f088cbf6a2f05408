//! The edit protocol: one mutation of frontmatter and body lines, committed as one write.
//!
//! Every user-facing operation is expressed as a closure over the parsed frontmatter document
//! and the document lines. [`apply_change`] runs it against a given base text and rebuilds the
//! whole text, rewriting the frontmatter last by its original bounds. [`commit_change`] runs the
//! same thing inside a store's read-modify-write so the closure always sees the latest text.

use crate::error::{Error, Missing, Result};
use crate::frontmatter::{read_frontmatter, write_frontmatter};
use crate::store::DocumentStore;
use serde_yaml::{Mapping, Value};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq)]
/// How an action or a drop ended.
pub enum Outcome {
    /// A new text was written.
    Committed,
    /// The mutation left the text as it was; nothing was written.
    Unchanged,
    /// The target could not be re-located; nothing was written.
    Aborted(Missing),
    /// The user dismissed the prompt.
    Cancelled,
}

#[must_use]
/// Split text into lines such that joining with `\n` restores it exactly.
///
/// CRLF text keeps its `\r` at the end of each line.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

/// Apply `mutate` to `text` and return the new text.
///
/// `mutate` receives the frontmatter document (an empty mapping when there is no block) and the
/// document lines. It may edit the document and splice lines below the frontmatter block; the
/// block itself is only ever changed through the document.
///
/// # Errors
///
/// Returns the error of `mutate`, a frontmatter parse error (so a malformed block is never
/// overwritten), or [`Error::FrontmatterClobbered`] if a splice moved the frontmatter block.
pub fn apply_change<F>(text: &str, mutate: F) -> Result<String>
where
    F: FnOnce(&mut Value, &mut Vec<String>) -> Result<()>,
{
    let mut lines = split_lines(text);
    let (mut doc, end) = match read_frontmatter(&lines)? {
        Some(frontmatter) => (frontmatter.doc, Some(frontmatter.end)),
        None => (Value::Mapping(Mapping::new()), None),
    };
    let block: Vec<String> = end.map_or_else(Vec::new, |end| lines[..=end].to_vec());
    let original = doc.clone();
    let crlf = lines.len() > 1 && lines[..lines.len() - 1].iter().all(|l| l.ends_with('\r'));

    mutate(&mut doc, &mut lines)?;

    if lines.get(..block.len()) != Some(block.as_slice()) {
        return Err(Error::FrontmatterClobbered);
    }
    // an untouched document keeps the user's own yaml formatting
    if doc != original {
        write_frontmatter(&mut lines, &doc, end)?;
    }
    // spliced-in lines follow a CRLF document's line ending
    if crlf {
        let last = lines.len().saturating_sub(1);
        for line in &mut lines[..last] {
            if !line.ends_with('\r') {
                line.push('\r');
            }
        }
    }
    Ok(lines.join("\n"))
}

/// Apply `mutate` to the latest text of `path` and commit the result through `store`.
///
/// Location failures reported by `mutate` become [`Outcome::Aborted`] after a warning; no
/// partial change is ever written.
///
/// # Errors
///
/// Returns store and frontmatter errors.
pub fn commit_change<S, F>(store: &S, path: &Path, mutate: F) -> Result<Outcome>
where
    S: DocumentStore,
    F: FnOnce(&mut Value, &mut Vec<String>) -> Result<()>,
{
    let mut changed = false;
    let result = store.process(path, |current| {
        let updated = apply_change(current, mutate)?;
        changed = updated != current;
        Ok(updated)
    });
    match result {
        Ok(_) if changed => Ok(Outcome::Committed),
        Ok(_) => Ok(Outcome::Unchanged),
        Err(Error::NotFound(missing)) => {
            tracing::warn!(path = %path.display(), "{missing} not found, change aborted");
            Ok(Outcome::Aborted(missing))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[path = "tests/change.rs"]
mod tests;
