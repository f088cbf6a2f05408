//! The state machine behind the terminal front-end.
//!
//! The TUI shows one document as a flattened tree of infoboxes, groups and rows built from the
//! latest render pass. Every key the user presses is resolved to one of the affordances attached
//! to the entry under the cursor, so the TUI can never offer an operation the render pass did
//! not, e.g. editing a locked infobox or an orphaned row. After any write the document is read
//! back and rendered again.

use crate::actions::{self, Action, ActionState, Context, Prompt};
use crate::change::Outcome;
use crate::config::Config;
use crate::error::Result;
use crate::formats::markdown::MarkdownFormat;
use crate::reorder::{Container, Drag, DragPhase};
use crate::session::{Binding, RenderPass, Session};
use crate::store::{DocumentStore, FsStore};
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// What a list entry stands for.
pub enum EntryKind {
    /// A whole infobox callout.
    Infobox,
    /// A group of an infobox.
    Group,
    /// A table row of a group.
    Row,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// One line of the flattened infobox tree.
pub struct Entry {
    /// What the entry stands for.
    pub kind: EntryKind,
    /// Index of the infobox in the render pass.
    pub infobox: usize,
    /// Index of the group within its infobox.
    pub group: Option<usize>,
    /// Index of the row within its group.
    pub row: Option<usize>,
    /// Section the entry's affordances sit on.
    pub section: usize,
    /// Nesting depth for drawing.
    pub depth: usize,
    /// Main text.
    pub label: String,
    /// Secondary text: lock state, group kind or row value.
    pub detail: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Operation requested by a key press, resolved against the current entry.
pub enum Verb {
    /// Add a group (on an infobox) or a row (on a table group or row).
    Add,
    /// Edit the value behind a row.
    Edit,
    /// Delete a group or a row.
    Delete,
    /// Lock or unlock the infobox.
    ToggleLock,
}

#[derive(PartialEq, Eq, Debug)]
/// Determines how input is interpreted.
pub enum View {
    /// Shows the infobox tree with navigation.
    List,
    /// Captures vim-style command input after ':' keystroke.
    Command,
}

/// Everything the TUI knows about the open document.
pub struct AppState {
    /// Document being edited.
    pub path: PathBuf,
    /// Where `:escape` persists settings.
    pub config_path: PathBuf,
    /// Settings.
    pub config: Config,
    /// Render passes and the active drag.
    pub session: Session,
    /// Flattened tree of the latest render pass.
    pub entries: Vec<Entry>,
    /// Cursor into `entries`.
    pub current_entry_index: usize,
    /// Active UI screen determining input handling.
    pub current_view: View,
    /// Where the action machinery is.
    pub action_state: ActionState,
    /// Accumulates vim-style command input after ':' is pressed.
    pub command_buffer: String,
    /// Status feedback displayed in the help bar.
    pub message: Option<String>,
    moving_section: Option<usize>,
}

fn ordered(count: usize, drag: Option<&Drag>, container: &Container) -> Vec<usize> {
    match drag {
        Some(drag) if &drag.container == container && drag.order.len() == count => {
            drag.order.clone()
        }
        _ => (0..count).collect(),
    }
}

#[must_use]
/// Flatten a render pass into list entries, showing `drag`'s visual order if there is one.
pub fn build_entries(pass: &RenderPass, drag: Option<&Drag>) -> Vec<Entry> {
    let mut entries = Vec::new();
    for (infobox_index, infobox) in pass.infoboxes.iter().enumerate() {
        entries.push(Entry {
            kind: EntryKind::Infobox,
            infobox: infobox_index,
            group: None,
            row: None,
            section: infobox.callout,
            depth: 0,
            label: infobox
                .title
                .clone()
                .unwrap_or_else(|| "(untitled)".to_string()),
            detail: if infobox.locked { "locked" } else { "unlocked" }.to_string(),
        });

        let groups = Container::Groups {
            callout: infobox.callout_ref.clone(),
        };
        for group_index in ordered(infobox.groups.len(), drag, &groups) {
            let group = &infobox.groups[group_index];
            entries.push(Entry {
                kind: EntryKind::Group,
                infobox: infobox_index,
                group: Some(group_index),
                row: None,
                section: group.header_section,
                depth: 1,
                label: group.label.clone(),
                detail: format!("{:?}", group.kind).to_lowercase(),
            });

            let rows = Container::Rows {
                callout: infobox.callout_ref.clone(),
                group: group.label.clone(),
            };
            for row_index in ordered(group.rows.len(), drag, &rows) {
                let row = &group.rows[row_index];
                let value = row.key.as_ref().map(|key| pass.value(key));
                entries.push(Entry {
                    kind: EntryKind::Row,
                    infobox: infobox_index,
                    group: Some(group_index),
                    row: Some(row_index),
                    section: row.section,
                    depth: 2,
                    label: row.label.clone(),
                    detail: match value {
                        Some(Some(value)) => value,
                        Some(None) => "(missing)".to_string(),
                        None => String::new(),
                    },
                });
            }
        }
    }
    entries
}

#[must_use]
/// Status bar text for the end of an action or a drop.
pub fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Committed => "Saved".to_string(),
        Outcome::Unchanged => "No changes".to_string(),
        Outcome::Aborted(missing) => format!("{missing} not found, nothing written"),
        Outcome::Cancelled => "Cancelled".to_string(),
    }
}

impl AppState {
    /// Open `path` and build the first render pass.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or rendered.
    pub fn new(path: PathBuf, config: Config, config_path: PathBuf) -> Result<Self> {
        let mut state = Self {
            path,
            config_path,
            config,
            session: Session::new(),
            entries: Vec::new(),
            current_entry_index: 0,
            current_view: View::List,
            action_state: ActionState::Idle,
            command_buffer: String::new(),
            message: None,
            moving_section: None,
        };
        state.reload()?;
        Ok(state)
    }

    /// Read the document again and rebuild the render pass and the entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or rendered.
    pub fn reload(&mut self) -> Result<()> {
        let text = FsStore.read(&self.path)?;
        self.session.render(&self.path, &text, &MarkdownFormat)?;
        self.rebuild_entries();
        Ok(())
    }

    fn rebuild_entries(&mut self) {
        self.entries = self
            .session
            .pass(&self.path)
            .map(|pass| build_entries(pass, self.session.drag()))
            .unwrap_or_default();
        if let Some(index) = self
            .moving_section
            .and_then(|section| self.entries.iter().position(|e| e.section == section))
        {
            self.current_entry_index = index;
        }
        self.current_entry_index = self
            .current_entry_index
            .min(self.entries.len().saturating_sub(1));
    }

    #[must_use]
    /// The latest render pass.
    pub fn pass(&self) -> Option<&RenderPass> {
        self.session.pass(&self.path)
    }

    #[must_use]
    /// Entry under the cursor.
    pub fn current_entry(&self) -> Option<&Entry> {
        self.entries.get(self.current_entry_index)
    }

    /// Move the cursor up.
    pub fn select_prev(&mut self) {
        self.current_entry_index = self.current_entry_index.saturating_sub(1);
    }

    /// Move the cursor down.
    pub fn select_next(&mut self) {
        if self.current_entry_index + 1 < self.entries.len() {
            self.current_entry_index += 1;
        }
    }

    #[must_use]
    /// Jump target: the entry one level up.
    pub fn navigate_to_parent(&self) -> Option<usize> {
        let depth = self.current_entry()?.depth;
        (0..self.current_entry_index)
            .rev()
            .find(|&i| self.entries[i].depth < depth)
    }

    #[must_use]
    /// Phase of the active drag.
    pub fn move_state(&self) -> DragPhase {
        self.session.drag().map_or(DragPhase::None, |drag| drag.phase)
    }

    #[must_use]
    /// Whether `entry` is the one being dragged.
    pub fn is_moving(&self, entry: &Entry) -> bool {
        self.moving_section == Some(entry.section)
    }

    #[must_use]
    /// The action the current entry offers for `verb`, if any.
    pub fn action_for(&self, verb: Verb) -> Option<Action> {
        let entry = self.current_entry()?;
        let pass = self.pass()?;
        let infobox = pass.infoboxes.get(entry.infobox)?;
        let group_label = entry
            .group
            .and_then(|index| infobox.groups.get(index))
            .map(|group| group.label.as_str());

        infobox
            .affordances
            .iter()
            .filter_map(|affordance| Some((affordance.section, affordance.action()?)))
            .find(|(section, action)| match (verb, action) {
                (Verb::ToggleLock, Action::Lock { .. } | Action::Unlock { .. }) => true,
                (Verb::Add, Action::AddGroup { .. }) => entry.kind == EntryKind::Infobox,
                (Verb::Add, Action::AddKeyValue { group, .. }) => {
                    group_label == Some(group.as_str())
                }
                (Verb::Delete, Action::DeleteGroup { .. }) => {
                    entry.kind == EntryKind::Group && *section == entry.section
                }
                (Verb::Edit, Action::EditKeyValue { .. })
                | (Verb::Delete, Action::DeleteKeyValue { .. }) => *section == entry.section,
                _ => false,
            })
            .map(|(_, action)| action.clone())
    }

    /// Run `action` through `prompt`, then render the document again.
    ///
    /// # Errors
    ///
    /// Returns store, frontmatter and render errors.
    pub fn run_action(&mut self, action: &Action, prompt: &mut dyn Prompt) -> Result<Outcome> {
        let ctx = Context {
            store: &FsStore,
            path: &self.path,
            config: &self.config,
        };
        let outcome = actions::run(&ctx, action, prompt, &mut self.action_state)?;
        self.message = Some(describe(&outcome));
        if outcome != Outcome::Cancelled {
            self.reload()?;
        }
        Ok(outcome)
    }

    // --- Reordering ---

    /// Pick up the current group or row.
    pub fn start_move(&mut self) -> bool {
        let Some(entry) = self.current_entry().cloned() else {
            return false;
        };
        let Some(pass) = self.pass() else {
            return false;
        };
        let Some(infobox) = pass.infoboxes.get(entry.infobox) else {
            return false;
        };
        let Some(group) = entry.group.and_then(|index| infobox.groups.get(index)) else {
            return false;
        };
        let count = match entry.kind {
            EntryKind::Row => group.rows.len(),
            _ => infobox.groups.len(),
        };
        let handle = infobox.affordances.iter().find_map(|a| match &a.binding {
            Binding::DragHandle { container, index } if a.section == entry.section => {
                Some((container.clone(), *index))
            }
            _ => None,
        });
        let Some((container, index)) = handle else {
            self.message = Some("Nothing to move here".to_string());
            return false;
        };
        if !self.session.begin_drag(container, count, index) {
            return false;
        }
        self.moving_section = Some(entry.section);
        true
    }

    /// Move the picked-up entry one slot up.
    pub fn move_up(&mut self) -> bool {
        let moved = self.session.drag_mut().is_some_and(Drag::move_up);
        self.rebuild_entries();
        moved
    }

    /// Move the picked-up entry one slot down.
    pub fn move_down(&mut self) -> bool {
        let moved = self.session.drag_mut().is_some_and(Drag::move_down);
        self.rebuild_entries();
        moved
    }

    /// Put the picked-up entry back where it was.
    pub fn cancel_move(&mut self) {
        self.session.cancel_drag();
        self.moving_section = None;
        self.rebuild_entries();
    }

    /// Write the new position of the picked-up entry to the document.
    ///
    /// # Errors
    ///
    /// Returns store, frontmatter and render errors.
    pub fn save_move(&mut self) -> Result<Outcome> {
        let outcome = self.session.drop_drag(&FsStore, &self.path)?;
        self.moving_section = None;
        self.message = Some(describe(&outcome));
        self.reload()?;
        Ok(outcome)
    }

    // --- </Reordering> ---

    /// Flip `escape_strings` and persist the settings.
    pub fn toggle_escape_strings(&mut self) {
        self.config.escape_strings = !self.config.escape_strings;
        let state = if self.config.escape_strings { "on" } else { "off" };
        self.message = Some(match self.config.save_to(&self.config_path) {
            Ok(()) => format!("String escaping {state}"),
            Err(e) => format!("String escaping {state} (not saved: {e})"),
        });
    }

    /// Execute the command in the buffer and return to the list.
    ///
    /// Returns `true` if the command asks to quit.
    pub fn execute_command(&mut self) -> bool {
        let command = std::mem::take(&mut self.command_buffer);
        self.current_view = View::List;
        match command.as_str() {
            "w" => {
                if self.move_state() == DragPhase::None {
                    self.message = Some("Nothing to save".to_string());
                } else if let Err(e) = self.save_move() {
                    self.message = Some(format!("Error saving: {e}"));
                }
            }
            "q" | "q!" => {
                if self.move_state() == DragPhase::None {
                    return true;
                }
                self.cancel_move();
            }
            "escape" => self.toggle_escape_strings(),
            "e" | "reload" => {
                if let Err(e) = self.reload() {
                    self.message = Some(format!("Error reloading: {e}"));
                }
            }
            _ => self.message = Some(format!("Unknown command: {command}")),
        }
        false
    }

    #[must_use]
    /// Path of the document being edited.
    pub fn document(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "tests/app_state.rs"]
mod tests;
