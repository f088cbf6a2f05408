//! Error taxonomy shared by the locator, the change applier and the action handlers.
//!
//! Location failures are expected whenever the document changed under a stale render pass, so
//! they carry a [`Missing`] describing what could not be found and are downgraded to an aborted
//! outcome by the callers that commit changes.

use std::fmt;
use std::io;

#[derive(Clone, Debug, PartialEq, Eq)]
/// The structural target that could not be found in the current text.
pub enum Missing {
    /// No `> [!infobox]` callout (with the requested title, if any).
    Callout(Option<String>),
    /// No `> ###### <label>` group header inside the callout.
    Group(String),
    /// No table row bound to the requested key inside the group.
    Row(String),
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callout(Some(title)) => write!(f, "infobox callout `{title}`"),
            Self::Callout(None) => write!(f, "infobox callout"),
            Self::Group(label) => write!(f, "group `{label}`"),
            Self::Row(key) => write!(f, "row `{key}`"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
/// Failures surfaced by the library.
pub enum Error {
    /// Reading or writing the document failed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// The frontmatter block could not be parsed or serialised.
    #[error("frontmatter yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The frontmatter block parsed, but not to a mapping.
    #[error("frontmatter is not a mapping")]
    FrontmatterShape,
    /// A body splice landed inside the frontmatter region.
    #[error("body edit touched the frontmatter block")]
    FrontmatterClobbered,
    /// A marker, group or row could not be located in the current text.
    #[error("{0} not found")]
    NotFound(Missing),
    /// The tree-sitter renderer could not be set up.
    #[error("render failed: {0}")]
    Render(String),
}

/// Library result type.
pub type Result<T> = std::result::Result<T, Error>;
