use super::{display_value, Binding, Session};
use crate::actions::Action;
use crate::change::Outcome;
use crate::formats::markdown::MarkdownFormat;
use crate::locate::CalloutRef;
use crate::reorder::Container;
use crate::store::FsStore;
use serde_yaml::Value;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

const DOC: &str = "\
---
stats:
  strength: '10'
---
> [!infobox]
> %% unlocked %%
> # Ada
> ###### Stats
> | Type | Stat |
> | --- | --- |
> | Strength | `=this.stats.strength` |
> | Luck | `=this.stats.luck` |

> [!infobox]
> # Notes box
> ###### Notes
> free text
";

fn names(session: &Session, path: &Path, infobox: usize) -> Vec<&'static str> {
    session.pass(path).unwrap().infoboxes[infobox]
        .affordances
        .iter()
        .map(|a| match &a.binding {
            Binding::Run { action } => action.name(),
            Binding::DragHandle { .. } => "drag",
        })
        .collect()
}

#[test]
fn test_unlocked_infobox_affordances() {
    let path = Path::new("ada.md");
    let mut session = Session::new();
    session.render(path, DOC, &MarkdownFormat).unwrap();

    // the Luck row has no frontmatter value, so it can only be dragged
    assert_eq!(
        names(&session, path, 0),
        [
            "lock",
            "add group",
            "delete group",
            "drag",
            "add item",
            "drag",
            "edit item",
            "delete item",
            "drag",
        ]
    );
    let pass = session.pass(path).unwrap();
    let edit = pass.infoboxes[0]
        .affordances
        .iter()
        .find_map(|a| match a.action() {
            Some(Action::EditKeyValue { current, key, .. }) => Some((current, key)),
            _ => None,
        })
        .unwrap();
    assert_eq!(edit.0, "10");
    assert_eq!(edit.1.dotted(), "stats.strength");
}

#[test]
fn test_locked_infobox_only_offers_unlock() {
    let path = Path::new("ada.md");
    let mut session = Session::new();
    session.render(path, DOC, &MarkdownFormat).unwrap();
    assert_eq!(names(&session, path, 1), ["unlock"]);
    assert!(session.pass(path).unwrap().infoboxes[1].locked);
}

#[test]
fn test_render_replaces_previous_pass() {
    let path = Path::new("ada.md");
    let mut session = Session::new();
    session.render(path, DOC, &MarkdownFormat).unwrap();
    let first = session.pass(path).unwrap().affordance_count();
    assert_eq!(first, 10);

    let locked = DOC.replace("> %% unlocked %%\n", "");
    let pass = session.render(path, &locked, &MarkdownFormat).unwrap();
    assert_eq!(pass.affordance_count(), 2);
    assert_eq!(session.close(path), 2);
    assert!(session.pass(path).is_none());
    assert_eq!(session.close(path), 0);
}

#[test]
fn test_malformed_frontmatter_renders_as_empty() {
    let path = Path::new("ada.md");
    let broken = DOC.replace("  strength: '10'", "  strength: [unclosed");
    let mut session = Session::new();
    let pass = session.render(path, &broken, &MarkdownFormat).unwrap();
    assert_eq!(pass.frontmatter, Value::Mapping(serde_yaml::Mapping::new()));
    // every row is now an orphan
    let names = names(&session, path, 0);
    assert!(!names.contains(&"edit item"));
    assert_eq!(names.iter().filter(|&&name| name == "drag").count(), 3);
}

#[test]
fn test_single_active_drag() {
    let mut session = Session::new();
    let groups = Container::Groups {
        callout: CalloutRef::titled("Ada"),
    };
    assert!(session.begin_drag(groups.clone(), 2, 0));
    assert!(!session.begin_drag(groups.clone(), 2, 1));
    assert!(session.cancel_drag());
    assert!(!session.cancel_drag());
    assert!(!session.begin_drag(groups, 2, 5));
    assert!(session.drag().is_none());
}

#[test]
fn test_drop_commits_and_clears_drag() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{DOC}").unwrap();
    let path = file.path();
    let mut session = Session::new();

    assert_eq!(
        session.drop_drag(&FsStore, path).unwrap(),
        Outcome::Unchanged
    );

    let rows = Container::Rows {
        callout: CalloutRef::titled("Ada"),
        group: "Stats".to_string(),
    };
    assert!(session.begin_drag(rows, 2, 1));
    assert!(session.drag_mut().unwrap().move_up());
    assert_eq!(
        session.drop_drag(&FsStore, path).unwrap(),
        Outcome::Committed
    );
    assert!(session.drag().is_none());

    let text = fs::read_to_string(path).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines[10], "> | Luck | `=this.stats.luck` |");
    assert_eq!(lines[11], "> | Strength | `=this.stats.strength` |");
    // frontmatter untouched by a pure reorder
    assert!(text.starts_with("---\nstats:\n  strength: '10'\n---\n"));
}

#[test]
fn test_display_value() {
    assert_eq!(display_value(&Value::from(10)), "10");
    assert_eq!(display_value(&Value::Null), "");
    let list: Value = serde_yaml::from_str("[a, b]").unwrap();
    assert_eq!(display_value(&list), "- a\n- b");
}

const UNTITLED: &str = "\
> [!infobox]
> ###### First
> free text

> [!infobox]
> %% unlocked %%
> ###### Second
> | Type | Stat |
> | --- | --- |
";

#[test]
fn test_untitled_callouts_resolve_to_their_own_lines() {
    let path = Path::new("ada.md");
    let mut session = Session::new();
    let pass = session.render(path, UNTITLED, &MarkdownFormat).unwrap();
    assert_eq!(pass.infoboxes.len(), 2);

    let first = &pass.infoboxes[0];
    let second = &pass.infoboxes[1];
    assert_eq!(first.callout_ref, CalloutRef::untitled(0));
    assert_eq!(second.callout_ref, CalloutRef::untitled(1));
    assert!(first.locked);
    assert!(!second.locked);
    assert_eq!(first.groups[0].label, "First");
    assert_eq!(second.groups[0].label, "Second");
    assert_eq!(pass.tree.get(second.callout).unwrap().range.start, 4);

    assert!(matches!(
        second.affordances[0].action(),
        Some(Action::Lock { callout }) if *callout == CalloutRef::untitled(1)
    ));
}
