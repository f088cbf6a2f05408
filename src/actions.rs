//! User-facing infobox operations.
//!
//! An [`Action`] is what an affordance is bound to: it names its target by [`CalloutRef`], group
//! label and key, never by line number, because the document may change while the user is busy
//! with a prompt. Running an action goes through three steps:
//!
//! 1. ask the [`Prompt`] collaborator for input (skipped by lock/unlock),
//! 2. turn the answers into a [`Request`],
//! 3. commit the request, which re-locates its target in the latest text and applies the line
//!    splice and the frontmatter mutation as one change.

use crate::change::{commit_change, Outcome};
use crate::config::Config;
use crate::error::{Error, Missing, Result};
use crate::infobox::GroupKind;
use crate::key::{slug, Key};
use crate::locate::{
    is_delimiter_row, is_unlocked, key_path_in, locate_callout_ref, locate_group, locate_row,
    locate_rows, CalloutRef, GroupRange, RowRef, GROUP_PREFIX, UNLOCKED_SENTINEL,
};
use crate::section::LineRange;
use crate::store::DocumentStore;
use serde::Serialize;
use serde_yaml::Value;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
/// An operation offered on an infobox, bound to its target by identity.
pub enum Action {
    /// Append a new group to the callout.
    AddGroup {
        /// Target callout.
        callout: CalloutRef,
    },
    /// Delete a group and its frontmatter mapping.
    DeleteGroup {
        /// Target callout.
        callout: CalloutRef,
        /// Group label.
        group: String,
    },
    /// Append a key/value row to a table group.
    AddKeyValue {
        /// Target callout.
        callout: CalloutRef,
        /// Group label.
        group: String,
    },
    /// Change the frontmatter value behind a row.
    EditKeyValue {
        /// Target callout.
        callout: CalloutRef,
        /// Group label.
        group: String,
        /// Row label shown to the user.
        label: String,
        /// Frontmatter path of the row.
        key: Key,
        /// Value at render time, offered as the initial input.
        current: String,
    },
    /// Delete a row and its frontmatter value.
    DeleteKeyValue {
        /// Target callout.
        callout: CalloutRef,
        /// Group label.
        group: String,
        /// Row label shown to the user.
        label: String,
        /// Frontmatter path of the row.
        key: Key,
        /// Value at render time, shown for confirmation.
        current: String,
    },
    /// Remove the unlocked sentinel.
    Lock {
        /// Target callout.
        callout: CalloutRef,
    },
    /// Insert the unlocked sentinel.
    Unlock {
        /// Target callout.
        callout: CalloutRef,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A confirmed operation with all user input collected.
pub enum Request {
    /// Insert a group header (and table skeleton) at the end of the callout.
    AddGroup {
        /// Group label.
        name: String,
        /// Content shape.
        kind: GroupKind,
    },
    /// Remove a group's lines and its frontmatter mapping.
    DeleteGroup {
        /// Group label.
        label: String,
    },
    /// Insert a row bound to `key` and store `value`.
    AddKeyValue {
        /// Group label.
        group: String,
        /// Row label.
        label: String,
        /// Frontmatter path.
        key: Key,
        /// Raw user input.
        value: String,
    },
    /// Store a new value for an existing row.
    EditKeyValue {
        /// Group label.
        group: String,
        /// Frontmatter path.
        key: Key,
        /// Raw user input.
        value: String,
    },
    /// Remove a row and its value.
    DeleteKeyValue {
        /// Group label.
        group: String,
        /// Frontmatter path.
        key: Key,
    },
    /// Remove the unlocked sentinel.
    Lock,
    /// Insert the unlocked sentinel.
    Unlock,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// One input of a prompt form.
pub struct Field {
    /// Name shown next to the input.
    pub label: &'static str,
    /// Initial value.
    pub value: String,
    /// Shown for reference only; the answer is the initial value.
    pub locked: bool,
}

impl Field {
    fn input(label: &'static str, value: &str) -> Self {
        Self {
            label,
            value: value.to_string(),
            locked: false,
        }
    }

    fn shown(label: &'static str, value: &str) -> Self {
        Self {
            locked: true,
            ..Self::input(label, value)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A modal request for input or confirmation.
pub struct Form {
    /// Question or heading.
    pub title: String,
    /// Inputs, possibly none for a plain confirmation.
    pub fields: Vec<Field>,
}

/// The modal prompt collaborator.
pub trait Prompt {
    /// Show `form` and wait for the user.
    ///
    /// Returns one answer per field, or `None` if the user cancelled.
    fn prompt(&mut self, form: &Form) -> Option<Vec<String>>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Where the action machinery currently is.
pub enum ActionState {
    /// Nothing in flight.
    Idle,
    /// Waiting on the prompt for this action.
    AwaitingInput(&'static str),
    /// Applying the change to the document.
    Committing,
}

/// Everything a handler needs besides the action itself.
pub struct Context<'a, S> {
    /// File content access.
    pub store: &'a S,
    /// Document being edited.
    pub path: &'a Path,
    /// Settings.
    pub config: &'a Config,
}

impl Action {
    #[must_use]
    /// Short name for logs and the status bar.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddGroup { .. } => "add group",
            Self::DeleteGroup { .. } => "delete group",
            Self::AddKeyValue { .. } => "add item",
            Self::EditKeyValue { .. } => "edit item",
            Self::DeleteKeyValue { .. } => "delete item",
            Self::Lock { .. } => "lock",
            Self::Unlock { .. } => "unlock",
        }
    }

    #[must_use]
    /// The callout the action targets.
    pub fn callout(&self) -> &CalloutRef {
        match self {
            Self::AddGroup { callout }
            | Self::DeleteGroup { callout, .. }
            | Self::AddKeyValue { callout, .. }
            | Self::EditKeyValue { callout, .. }
            | Self::DeleteKeyValue { callout, .. }
            | Self::Lock { callout }
            | Self::Unlock { callout } => callout,
        }
    }

    #[must_use]
    /// The form to show before committing, if the action needs one.
    pub fn form(&self) -> Option<Form> {
        let (title, fields) = match self {
            Self::AddGroup { .. } => (
                "Create new group".to_string(),
                vec![Field::input("Name", ""), Field::input("Type", "table")],
            ),
            Self::DeleteGroup { group, .. } => (
                "Are you sure you want to delete this group?".to_string(),
                vec![Field::shown("Group", group)],
            ),
            Self::AddKeyValue { group, .. } => (
                format!("Add item to {group}"),
                vec![
                    Field::input("Label", ""),
                    Field::input("Key", ""),
                    Field::input("Value", ""),
                ],
            ),
            Self::EditKeyValue { label, current, .. } => (
                "Edit item".to_string(),
                vec![Field::shown("Item", label), Field::input("Value", current)],
            ),
            Self::DeleteKeyValue { label, current, .. } => (
                "Are you sure you want to delete this item?".to_string(),
                vec![Field::shown("Item", label), Field::shown("Value", current)],
            ),
            Self::Lock { .. } | Self::Unlock { .. } => return None,
        };
        Some(Form { title, fields })
    }

    #[must_use]
    /// Turn prompt answers into a request; `None` if the input is unusable.
    pub fn request(&self, answers: &[String]) -> Option<Request> {
        let answer = |index: usize| answers.get(index).map_or("", |a| a.trim());
        match self {
            Self::AddGroup { .. } => {
                let name = answer(0);
                if name.is_empty() {
                    return None;
                }
                Some(Request::AddGroup {
                    name: name.to_string(),
                    kind: GroupKind::parse(answer(1))?,
                })
            }
            Self::DeleteGroup { group, .. } => Some(Request::DeleteGroup {
                label: group.clone(),
            }),
            Self::AddKeyValue { group, .. } => {
                let label = answer(0);
                if label.is_empty() {
                    return None;
                }
                let key = Some(answer(1)).filter(|key| !key.is_empty());
                Some(Request::AddKeyValue {
                    group: group.clone(),
                    label: label.to_string(),
                    key: key_for(group, label, key)?,
                    value: answer(2).to_string(),
                })
            }
            Self::EditKeyValue { group, key, .. } => Some(Request::EditKeyValue {
                group: group.clone(),
                key: key.clone(),
                value: answer(1).to_string(),
            }),
            Self::DeleteKeyValue { group, key, .. } => Some(Request::DeleteKeyValue {
                group: group.clone(),
                key: key.clone(),
            }),
            Self::Lock { .. } => Some(Request::Lock),
            Self::Unlock { .. } => Some(Request::Unlock),
        }
    }
}

#[must_use]
/// Frontmatter path for a new row.
///
/// Without an explicit key the path is `<slug(group)>.<slug(label)>`; a key containing `.` is
/// taken as a full path from the root, any other key replaces the label part.
pub fn key_for(group: &str, label: &str, key: Option<&str>) -> Option<Key> {
    match key {
        Some(key) if key.contains('.') => Key::new(key),
        Some(key) => Key::from_segments(vec![slug(group), slug(key)]),
        None => Key::from_segments(vec![slug(group), slug(label)]),
    }
}

#[must_use]
/// Frontmatter value for user input: a string, or parsed YAML when escaping is off.
pub fn frontmatter_value(input: &str, escape_strings: bool) -> Value {
    if escape_strings {
        return Value::String(input.to_string());
    }
    match serde_yaml::from_str::<Value>(input) {
        Ok(Value::Null) | Err(_) => Value::String(input.to_string()),
        Ok(value) => value,
    }
}

fn callout_range(lines: &[String], callout: &CalloutRef) -> Result<LineRange> {
    locate_callout_ref(lines, callout)
        .ok_or_else(|| Error::NotFound(Missing::Callout(callout.title.clone())))
}

fn group_range(lines: &[String], callout: &CalloutRef, label: &str) -> Result<GroupRange> {
    let range = callout_range(lines, callout)?;
    locate_group(lines, range, label).ok_or_else(|| Error::NotFound(Missing::Group(label.into())))
}

// Rows in one group may share a last segment (`stats.strength`, `base.strength`), so match the
// whole path.
fn row_line(lines: &[String], group: &GroupRange, key: &Key) -> Result<usize> {
    locate_row(lines, group.content, RowRef::Path(&key.dotted()))
        .map(|row| row.start)
        .ok_or_else(|| Error::NotFound(Missing::Row(key.dotted())))
}

fn new_row_position(lines: &[String], content: LineRange) -> usize {
    if let Some(last) = locate_rows(lines, content).last() {
        return last.end;
    }
    (content.start..content.end)
        .find(|&index| is_delimiter_row(&lines[index]))
        .map_or(content.end, |delimiter| delimiter + 1)
}

/// Apply `request` to a parsed document and its lines.
///
/// Every target is located afresh in `lines`.
///
/// # Errors
///
/// Returns [`Error::NotFound`] when the callout, group or row is gone.
pub fn apply_request(
    doc: &mut Value,
    lines: &mut Vec<String>,
    callout: &CalloutRef,
    request: &Request,
    config: &Config,
) -> Result<()> {
    match request {
        Request::AddGroup { name, kind } => {
            let range = callout_range(lines, callout)?;
            if locate_group(lines, range, name).is_some() {
                tracing::info!(name = %name, "group already exists, not adding");
                return Ok(());
            }
            let mut insert = vec![format!("{GROUP_PREFIX}{name}")];
            if *kind == GroupKind::Table {
                insert.extend(config.table_skeleton());
            }
            lines.splice(range.end..range.end, insert);
        }
        Request::DeleteGroup { label } => {
            let group = group_range(lines, callout, label)?;
            crate::key::remove(doc, &[slug(label)]);
            lines.drain(group.header.start..group.content.end);
        }
        Request::AddKeyValue {
            group,
            label,
            key,
            value,
        } => {
            let range = group_range(lines, callout, group)?;
            let exists = locate_rows(lines, range.content)
                .iter()
                .any(|row| key_path_in(&lines[row.start]) == Some(key.dotted().as_str()));
            if !exists {
                let at = new_row_position(lines, range.content);
                lines.insert(at, format!("> | {label} | `{}` |", key.formula()));
            }
            key.set(doc, frontmatter_value(value, config.escape_strings));
        }
        Request::EditKeyValue { group, key, value } => {
            let range = group_range(lines, callout, group)?;
            row_line(lines, &range, key)?;
            key.set(doc, frontmatter_value(value, config.escape_strings));
        }
        Request::DeleteKeyValue { group, key } => {
            let range = group_range(lines, callout, group)?;
            let row = row_line(lines, &range, key)?;
            key.delete(doc);
            lines.remove(row);
        }
        Request::Lock => {
            let range = callout_range(lines, callout)?;
            if is_unlocked(lines, range) {
                lines.remove(range.start + 1);
            }
        }
        Request::Unlock => {
            let range = callout_range(lines, callout)?;
            if !is_unlocked(lines, range) {
                lines.insert(range.start + 1, UNLOCKED_SENTINEL.to_string());
            }
        }
    }
    Ok(())
}

/// Commit `request` against the latest text of the document.
///
/// # Errors
///
/// Returns store and frontmatter errors; a vanished target becomes [`Outcome::Aborted`].
pub fn commit<S: DocumentStore>(
    ctx: &Context<'_, S>,
    callout: &CalloutRef,
    request: &Request,
) -> Result<Outcome> {
    commit_change(ctx.store, ctx.path, |doc, lines| {
        apply_request(doc, lines, callout, request, ctx.config)
    })
}

/// Run `action`: prompt, then re-locate and commit.
///
/// `state` follows the action through [`ActionState`] and is back to `Idle` on return.
///
/// # Errors
///
/// See [`commit`].
pub fn run<S, P>(
    ctx: &Context<'_, S>,
    action: &Action,
    prompt: &mut P,
    state: &mut ActionState,
) -> Result<Outcome>
where
    S: DocumentStore,
    P: Prompt + ?Sized,
{
    let answers = match action.form() {
        Some(form) => {
            *state = ActionState::AwaitingInput(action.name());
            let answers = prompt.prompt(&form);
            *state = ActionState::Idle;
            match answers {
                Some(answers) => answers,
                None => return Ok(Outcome::Cancelled),
            }
        }
        None => Vec::new(),
    };
    let Some(request) = action.request(&answers) else {
        tracing::info!(action = action.name(), "incomplete input, nothing to do");
        return Ok(Outcome::Cancelled);
    };

    *state = ActionState::Committing;
    let outcome = commit(ctx, action.callout(), &request);
    *state = ActionState::Idle;
    let outcome = outcome?;
    tracing::debug!(action = action.name(), ?outcome, "action finished");
    Ok(outcome)
}

#[cfg(test)]
#[path = "tests/actions.rs"]
mod tests;
