//! Drag-and-drop reordering of groups and rows.
//!
//! While a drag is in progress only the visual order held by [`Drag`] changes; the document is
//! untouched. On drop, [`commit_move`] re-locates every sibling from the current text and moves
//! the dragged block of lines in a single change.
//!
//! A drag moves through three phases:
//!
//! ```text
//! None -> Selected -> Moved -> None (after drop or cancel)
//!             |                 ^
//!             |_________________|
//!                  (cancel)
//! ```

use crate::change::{commit_change, Outcome};
use crate::error::{Error, Missing, Result};
use crate::locate::{locate_callout_ref, locate_group, locate_groups, locate_rows, CalloutRef};
use crate::section::LineRange;
use crate::store::DocumentStore;
use serde::Serialize;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
/// The container whose children are being reordered.
pub enum Container {
    /// The groups of one callout.
    Groups {
        /// Owning callout.
        callout: CalloutRef,
    },
    /// The table rows of one group.
    Rows {
        /// Owning callout.
        callout: CalloutRef,
        /// Group label.
        group: String,
    },
}

impl Container {
    /// Sibling ranges of this container in the given lines, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the callout or group is gone.
    pub fn siblings(&self, lines: &[String]) -> Result<Vec<LineRange>> {
        let target = match self {
            Self::Groups { callout } | Self::Rows { callout, .. } => callout,
        };
        let callout = locate_callout_ref(lines, target)
            .ok_or_else(|| Error::NotFound(Missing::Callout(target.title.clone())))?;
        match self {
            Self::Groups { .. } => Ok(locate_groups(lines, callout)
                .into_iter()
                .map(|(_, group)| group.whole())
                .collect()),
            Self::Rows { group, .. } => {
                let range = locate_group(lines, callout, group)
                    .ok_or_else(|| Error::NotFound(Missing::Group(group.clone())))?;
                Ok(locate_rows(lines, range.content))
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Lifecycle of a drag gesture.
pub enum DragPhase {
    /// No drag in progress.
    None,
    /// An element has been picked up but not moved yet.
    Selected,
    /// The element has been moved; the new order is not yet written.
    Moved,
}

#[derive(Clone, Debug)]
/// An in-progress drag: the container, the picked-up sibling and the live visual order.
pub struct Drag {
    /// Container whose children are being reordered.
    pub container: Container,
    /// Index of the dragged sibling when the drag began.
    pub origin: usize,
    /// Visual order as original sibling indices.
    pub order: Vec<usize>,
    /// Current phase.
    pub phase: DragPhase,
}

impl Drag {
    #[must_use]
    /// Pick up sibling `origin` among `count` siblings.
    pub fn begin(container: Container, count: usize, origin: usize) -> Option<Self> {
        (origin < count).then(|| Self {
            container,
            origin,
            order: (0..count).collect(),
            phase: DragPhase::Selected,
        })
    }

    #[must_use]
    /// Current visual index of the dragged sibling.
    pub fn position(&self) -> usize {
        self.order
            .iter()
            .position(|&index| index == self.origin)
            .unwrap_or(self.origin)
    }

    /// Move the dragged sibling to visual index `target` (clamped to the last slot).
    pub fn move_to(&mut self, target: usize) -> bool {
        let from = self.position();
        let target = target.min(self.order.len().saturating_sub(1));
        if from == target {
            return false;
        }
        let dragged = self.order.remove(from);
        self.order.insert(target, dragged);
        self.phase = DragPhase::Moved;
        true
    }

    /// Move the dragged sibling one slot up.
    pub fn move_up(&mut self) -> bool {
        match self.position() {
            0 => false,
            from => self.move_to(from - 1),
        }
    }

    /// Move the dragged sibling one slot down.
    pub fn move_down(&mut self) -> bool {
        self.move_to(self.position() + 1)
    }
}

/// Move the sibling at `from` so that it lands at visual index `to`, splicing `lines`.
///
/// `siblings` must be the current ranges in document order. The dragged block is removed first;
/// it is then inserted before the sibling now occupying index `to`, or after the last sibling
/// when `to` is past the end. Returns `false` when nothing moves.
pub fn move_sibling(lines: &mut Vec<String>, siblings: &[LineRange], from: usize, to: usize) -> bool {
    let Some(&dragged) = siblings.get(from) else {
        return false;
    };
    if from == to || siblings.len() < 2 {
        return false;
    }

    let shift = |range: LineRange| {
        if range.start >= dragged.end {
            LineRange::new(range.start - dragged.len(), range.end - dragged.len())
        } else {
            range
        }
    };
    let remaining: Vec<LineRange> = siblings
        .iter()
        .enumerate()
        .filter(|&(index, _)| index != from)
        .map(|(_, &range)| shift(range))
        .collect();
    let target = match remaining.get(to) {
        Some(next) => next.start,
        None => remaining.last().map_or(dragged.start, |last| last.end),
    };

    let block: Vec<String> = lines.drain(dragged.start..dragged.end).collect();
    lines.splice(target..target, block);
    true
}

/// Commit a drop: move sibling `from` of `container` to visual index `to` in the document.
///
/// # Errors
///
/// Returns store and frontmatter errors; a vanished container becomes [`Outcome::Aborted`].
pub fn commit_move<S: DocumentStore>(
    store: &S,
    path: &Path,
    container: &Container,
    from: usize,
    to: usize,
) -> Result<Outcome> {
    if from == to {
        return Ok(Outcome::Unchanged);
    }
    commit_change(store, path, |_, lines| {
        let siblings = container.siblings(lines)?;
        if from >= siblings.len() {
            return Err(Error::NotFound(match container {
                Container::Groups { .. } => Missing::Group(format!("#{from}")),
                Container::Rows { group, .. } => Missing::Row(format!("{group}[{from}]")),
            }));
        }
        move_sibling(lines, &siblings, from, to);
        Ok(())
    })
}

/// Drop the active drag, committing its new position.
///
/// # Errors
///
/// See [`commit_move`].
pub fn drop_drag<S: DocumentStore>(store: &S, path: &Path, drag: &Drag) -> Result<Outcome> {
    if drag.phase != DragPhase::Moved {
        return Ok(Outcome::Unchanged);
    }
    commit_move(store, path, &drag.container, drag.origin, drag.position())
}

#[cfg(test)]
#[path = "tests/reorder.rs"]
mod tests;
