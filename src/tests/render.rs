use super::{render_callouts, ElementKind};
use crate::formats::markdown::MarkdownFormat;

const DOC: &str = "\
---
stats:
  strength: '10'
---
# Character

> [!infobox]
> # Ada
> ###### Stats
> | Type | Stat |
> | --- | --- |
> | Strength | `=this.stats.strength` |
> | Dexterity | `=this.stats.dexterity` |

> A plain quote
";

#[test]
fn test_renders_only_infobox_callouts() {
    let callouts = render_callouts(DOC, &MarkdownFormat).unwrap();
    assert_eq!(callouts.len(), 1);
    assert_eq!(callouts[0].kind, ElementKind::Callout);
}

#[test]
fn test_callout_title_and_group_heading() {
    let callouts = render_callouts(DOC, &MarkdownFormat).unwrap();
    let callout = &callouts[0];
    assert_eq!(callout.title_text(), Some("Ada"));

    let headings: Vec<_> = callout
        .children
        .iter()
        .filter_map(|child| child.heading())
        .collect();
    assert_eq!(headings, [(1, "Ada"), (6, "Stats")]);
}

#[test]
fn test_group_table_rows() {
    let callouts = render_callouts(DOC, &MarkdownFormat).unwrap();
    let table = callouts[0]
        .children
        .iter()
        .find(|child| child.is_table())
        .expect("table rendered");
    assert_eq!(table.children.len(), 2);
    assert!(table
        .children
        .iter()
        .all(|row| row.kind == ElementKind::TableRow));
}

#[test]
fn test_element_ids_are_unique() {
    let callouts = render_callouts(DOC, &MarkdownFormat).unwrap();
    let mut ids = vec![callouts[0].id];
    for child in &callouts[0].children {
        ids.push(child.id);
        ids.extend(child.children.iter().map(|row| row.id));
    }
    let count = ids.len();
    ids.sort_by_key(|id| id.0);
    ids.dedup();
    assert_eq!(ids.len(), count);
}

#[test]
fn test_document_without_callout() {
    let callouts = render_callouts("# Title\n\nJust text.\n", &MarkdownFormat).unwrap();
    assert!(callouts.is_empty());
}
