//! Render passes and the affordances attached to them.
//!
//! Every time a document is shown, [`Session::render`] throws away the previous pass for that
//! document and builds a fresh one: frontmatter, rendered callouts, section tree, infobox
//! records, and the affordances (the things a user can press) bound to each part. Affordances
//! refer to their targets by callout title, group label and key, so they stay meaningful even
//! if the text shifts before they are used.
//!
//! The session also holds the single active drag.

use crate::actions::Action;
use crate::change::{split_lines, Outcome};
use crate::error::Result;
use crate::formats::Format;
use crate::frontmatter::frontmatter_or_empty;
use crate::infobox::{build_infobox, GroupKind, Infobox};
use crate::key::Key;
use crate::render::{render_callouts, ElementId};
use crate::reorder::{drop_drag, Container, Drag};
use crate::section::SectionTree;
use crate::store::DocumentStore;
use serde::Serialize;
use serde_yaml::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
/// What pressing an affordance does.
pub enum Binding {
    /// Run an action.
    Run {
        /// The action to run.
        action: Action,
    },
    /// Pick up a sibling for reordering.
    DragHandle {
        /// Container of the sibling.
        container: Container,
        /// Index of the sibling among its container's children.
        index: usize,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// An interactive control attached to a located part of an infobox.
pub struct Affordance {
    /// Section the control sits on.
    pub section: usize,
    /// Rendered element the control is wired to, if there is one.
    pub element: Option<ElementId>,
    /// What the control does.
    pub binding: Binding,
}

impl Affordance {
    fn run(section: usize, element: Option<ElementId>, action: Action) -> Self {
        Self {
            section,
            element,
            binding: Binding::Run { action },
        }
    }

    fn drag(section: usize, element: Option<ElementId>, container: Container, index: usize) -> Self {
        Self {
            section,
            element,
            binding: Binding::DragHandle { container, index },
        }
    }

    #[must_use]
    /// The action this control runs, if it is not a drag handle.
    pub fn action(&self) -> Option<&Action> {
        match &self.binding {
            Binding::Run { action } => Some(action),
            Binding::DragHandle { .. } => None,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
/// Everything derived from one document text.
pub struct RenderPass {
    /// Document lines the pass was built from.
    pub lines: Vec<String>,
    /// Parsed frontmatter, empty when missing or malformed.
    pub frontmatter: Value,
    /// Line ranges of every located part.
    pub tree: SectionTree,
    /// Infoboxes in document order.
    pub infoboxes: Vec<Infobox>,
}

impl RenderPass {
    #[must_use]
    /// Number of affordances attached across all infoboxes.
    pub fn affordance_count(&self) -> usize {
        self.infoboxes.iter().map(|i| i.affordances.len()).sum()
    }

    #[must_use]
    /// Display text of the value behind `key`, if it resolves.
    pub fn value(&self, key: &Key) -> Option<String> {
        key.get(&self.frontmatter).map(display_value)
    }
}

#[must_use]
/// Plain text for a frontmatter value, as shown in a table cell.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|text| text.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Attach the affordances an infobox offers in its current lock state.
///
/// A locked infobox only offers the unlock toggle, and so does an untitled one. Every row can be
/// dragged; rows whose key does not resolve in the frontmatter get no edit or delete.
pub fn attach_affordances(infobox: &mut Infobox, frontmatter: &Value) {
    let callout = infobox.callout_ref.clone();
    let anchor = infobox.header.or(Some(infobox.element));
    let toggle = if infobox.locked {
        Action::Unlock {
            callout: callout.clone(),
        }
    } else {
        Action::Lock {
            callout: callout.clone(),
        }
    };
    let mut affordances = vec![Affordance::run(infobox.callout, anchor, toggle)];

    if !infobox.locked && infobox.title.is_some() {
        affordances.push(Affordance::run(
            infobox.callout,
            anchor,
            Action::AddGroup {
                callout: callout.clone(),
            },
        ));
        let groups = Container::Groups {
            callout: callout.clone(),
        };
        for (index, group) in infobox.groups.iter().enumerate() {
            let header = Some(group.header);
            affordances.push(Affordance::run(
                group.header_section,
                header,
                Action::DeleteGroup {
                    callout: callout.clone(),
                    group: group.label.clone(),
                },
            ));
            affordances.push(Affordance::drag(
                group.header_section,
                header,
                groups.clone(),
                index,
            ));
            if group.kind != GroupKind::Table {
                continue;
            }
            affordances.push(Affordance::run(
                group.content_section,
                group.content,
                Action::AddKeyValue {
                    callout: callout.clone(),
                    group: group.label.clone(),
                },
            ));

            let rows = Container::Rows {
                callout: callout.clone(),
                group: group.label.clone(),
            };
            for (index, row) in group.rows.iter().enumerate() {
                affordances.push(Affordance::drag(
                    row.section,
                    row.element,
                    rows.clone(),
                    index,
                ));
                let Some(key) = &row.key else { continue };
                let Some(current) = key.get(frontmatter).map(display_value) else {
                    tracing::debug!(key = %key, "orphaned row, no edit or delete");
                    continue;
                };
                affordances.push(Affordance::run(
                    row.section,
                    row.element,
                    Action::EditKeyValue {
                        callout: callout.clone(),
                        group: group.label.clone(),
                        label: row.label.clone(),
                        key: key.clone(),
                        current: current.clone(),
                    },
                ));
                affordances.push(Affordance::run(
                    row.section,
                    row.element,
                    Action::DeleteKeyValue {
                        callout: callout.clone(),
                        group: group.label.clone(),
                        label: row.label.clone(),
                        key: key.clone(),
                        current,
                    },
                ));
            }
        }
    }
    infobox.affordances = affordances;
}

#[derive(Debug, Default)]
/// Render passes per document plus the active drag.
pub struct Session {
    passes: HashMap<PathBuf, RenderPass>,
    drag: Option<Drag>,
}

impl Session {
    #[must_use]
    /// Session with nothing rendered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh render pass for `path` from `text`, replacing the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Render`] if the parser cannot be set up.
    pub fn render<F: Format>(&mut self, path: &Path, text: &str, format: &F) -> Result<&RenderPass> {
        let disposed = self.close(path);
        if disposed > 0 {
            tracing::debug!(path = %path.display(), disposed, "disposed previous affordances");
        }

        let lines = split_lines(text);
        let frontmatter = frontmatter_or_empty(&lines);
        let mut tree = SectionTree::new();
        let mut infoboxes = Vec::new();
        let mut seen: HashMap<Option<String>, usize> = HashMap::new();
        for rendered in render_callouts(text, format)? {
            let ordinal = seen
                .entry(rendered.title_text().map(str::to_string))
                .or_default();
            let built = build_infobox(&lines, &rendered, *ordinal, path, &mut tree);
            *ordinal += 1;
            if let Some(mut infobox) = built {
                attach_affordances(&mut infobox, &frontmatter);
                infoboxes.push(infobox);
            }
        }
        tracing::debug!(path = %path.display(), infoboxes = infoboxes.len(), "render pass built");

        let pass = RenderPass {
            lines,
            frontmatter,
            tree,
            infoboxes,
        };
        Ok(self.passes.entry(path.to_path_buf()).or_insert(pass))
    }

    #[must_use]
    /// Latest render pass of `path`.
    pub fn pass(&self, path: &Path) -> Option<&RenderPass> {
        self.passes.get(path)
    }

    /// Drop the render pass of `path`, returning how many affordances it held.
    pub fn close(&mut self, path: &Path) -> usize {
        self.passes
            .remove(path)
            .map_or(0, |pass| pass.affordance_count())
    }

    /// Start dragging sibling `origin` of `container`.
    ///
    /// Returns `false` if another drag is active or `origin` is out of range.
    pub fn begin_drag(&mut self, container: Container, count: usize, origin: usize) -> bool {
        if self.drag.is_some() {
            return false;
        }
        self.drag = Drag::begin(container, count, origin);
        self.drag.is_some()
    }

    #[must_use]
    /// The active drag.
    pub fn drag(&self) -> Option<&Drag> {
        self.drag.as_ref()
    }

    /// The active drag, for moving it.
    pub fn drag_mut(&mut self) -> Option<&mut Drag> {
        self.drag.as_mut()
    }

    /// Abandon the active drag without touching the document.
    pub fn cancel_drag(&mut self) -> bool {
        self.drag.take().is_some()
    }

    /// End the active drag and commit its position to `path`.
    ///
    /// # Errors
    ///
    /// See [`crate::reorder::commit_move`].
    pub fn drop_drag<S: DocumentStore>(&mut self, store: &S, path: &Path) -> Result<Outcome> {
        match self.drag.take() {
            Some(drag) => drop_drag(store, path, &drag),
            None => Ok(Outcome::Unchanged),
        }
    }
}

#[cfg(test)]
#[path = "tests/session.rs"]
mod tests;
