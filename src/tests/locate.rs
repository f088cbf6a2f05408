use super::{
    extract_key_path, is_delimiter_row, is_unlocked, key_path_in, locate_callout,
    locate_callout_ref, locate_callouts, locate_group, locate_groups, locate_row, locate_rows,
    locate_title, quote_heading_level, row_label, CalloutRef, GroupRange, RowRef,
};
use crate::section::LineRange;

fn lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

const DOC: &str = "\
---
name: Ada
---
Intro paragraph.

> [!infobox]
> # Ada
> ###### Stats
> | Type | Stat |
> | --- | --- |
> | Strength | `=this.stats.strength` |
> | Dexterity | `=this.stats.dexterity` |
> ###### Notes
> Free text here.

Outro.";

#[test]
fn test_locate_callout_reconstructs_text() {
    let lines = lines(DOC);
    let callout = locate_callout(&lines, None).unwrap();
    assert_eq!(callout, LineRange::new(5, 14));
    let text = callout.text(&lines);
    assert!(text.starts_with("> [!infobox]\n> # Ada"));
    assert!(text.ends_with("> Free text here."));
    assert_eq!(lines[callout.start..callout.end].join("\n"), text);
}

#[test]
fn test_locate_callout_runs_to_end_of_document() {
    let lines = lines("> [!infobox]\n> # Box\n> ###### Stats");
    assert_eq!(locate_callout(&lines, None), Some(LineRange::new(0, 3)));
}

#[test]
fn test_locate_callout_missing_marker() {
    let lines = lines("> [!note]\n> # Ada\n");
    assert_eq!(locate_callout(&lines, None), None);
}

#[test]
fn test_locate_callout_by_title() {
    let lines = lines("> [!infobox]\n> # First\n\n> [!infobox]\n> %% unlocked %%\n> # Second\n");
    assert_eq!(
        locate_callout(&lines, Some("Second")),
        Some(LineRange::new(3, 6))
    );
    assert_eq!(
        locate_callout(&lines, Some("First")),
        Some(LineRange::new(0, 2))
    );
    assert_eq!(locate_callout(&lines, Some("Third")), None);
}

#[test]
fn test_locate_callout_ref_by_ordinal() {
    let lines = lines(
        "> [!infobox]\n> ###### A\n\n> [!infobox]\n> # Box\n\n> [!infobox]\n> %% unlocked %%\n\n\
         > [!infobox]\n> # Box",
    );
    assert_eq!(locate_callouts(&lines).len(), 4);
    assert_eq!(
        locate_callout_ref(&lines, &CalloutRef::untitled(0)),
        Some(LineRange::new(0, 2))
    );
    assert_eq!(
        locate_callout_ref(&lines, &CalloutRef::untitled(1)),
        Some(LineRange::new(6, 8))
    );
    assert_eq!(locate_callout_ref(&lines, &CalloutRef::untitled(2)), None);

    let second_box = CalloutRef {
        title: Some("Box".to_string()),
        ordinal: 1,
    };
    assert_eq!(
        locate_callout_ref(&lines, &CalloutRef::titled("Box")),
        Some(LineRange::new(3, 5))
    );
    assert_eq!(
        locate_callout_ref(&lines, &second_box),
        Some(LineRange::new(9, 11))
    );
}

#[test]
fn test_locate_title() {
    let doc = lines(DOC);
    let callout = locate_callout(&doc, None).unwrap();
    assert_eq!(locate_title(&doc, callout), Some(LineRange::line(6)));

    let untitled = lines("> [!infobox]\n> ###### Stats\n> | a | b |");
    let callout = locate_callout(&untitled, None).unwrap();
    assert_eq!(locate_title(&untitled, callout), None);
}

#[test]
fn test_locate_group_header_and_content() {
    let lines = lines(DOC);
    let callout = locate_callout(&lines, None).unwrap();
    let stats = locate_group(&lines, callout, "Stats").unwrap();
    assert_eq!(
        stats,
        GroupRange {
            header: LineRange::line(7),
            content: LineRange::new(8, 12),
        }
    );
    let notes = locate_group(&lines, callout, "Notes").unwrap();
    assert_eq!(notes.content, LineRange::new(13, 14));
    assert_eq!(notes.whole(), LineRange::new(12, 14));
    assert!(stats.content.end <= notes.header.start);
}

#[test]
fn test_locate_group_requires_exact_label() {
    let lines = lines(DOC);
    let callout = locate_callout(&lines, None).unwrap();
    assert_eq!(locate_group(&lines, callout, "Stat"), None);
    assert_eq!(locate_group(&lines, callout, "stats"), None);
}

#[test]
fn test_locate_group_with_empty_content() {
    let lines = lines("> [!infobox]\n> # Box\n> ###### Empty\n> ###### Stats\n> | a | b |");
    let callout = locate_callout(&lines, None).unwrap();
    let empty = locate_group(&lines, callout, "Empty").unwrap();
    assert!(empty.content.is_empty());
    assert_eq!(empty.whole(), LineRange::line(2));
}

#[test]
fn test_locate_groups_in_order() {
    let lines = lines(DOC);
    let callout = locate_callout(&lines, None).unwrap();
    let labels: Vec<_> = locate_groups(&lines, callout)
        .into_iter()
        .map(|(label, _)| label)
        .collect();
    assert_eq!(labels, ["Stats", "Notes"]);
}

#[test]
fn test_heading_boundary_rules() {
    assert_eq!(quote_heading_level("> # Title"), Some(1));
    assert_eq!(quote_heading_level("> ###### Stats"), Some(6));
    assert_eq!(quote_heading_level(">###"), Some(3));
    assert_eq!(quote_heading_level("> #tag"), None);
    assert_eq!(quote_heading_level("> ####### Seven"), None);
    assert_eq!(quote_heading_level("# Not quoted"), None);
}

#[test]
fn test_delimiter_rows() {
    assert!(is_delimiter_row("> | --- | --- |"));
    assert!(is_delimiter_row("> |:---|---:|"));
    assert!(!is_delimiter_row("> | Type | Stat |"));
    assert!(!is_delimiter_row("> ---"));
}

#[test]
fn test_locate_rows_and_row_refs() {
    let lines = lines(DOC);
    let callout = locate_callout(&lines, None).unwrap();
    let stats = locate_group(&lines, callout, "Stats").unwrap();

    assert_eq!(
        locate_rows(&lines, stats.content),
        [LineRange::line(10), LineRange::line(11)]
    );
    assert_eq!(
        locate_row(&lines, stats.content, RowRef::Index(0)),
        Some(LineRange::line(8))
    );
    assert_eq!(
        locate_row(&lines, stats.content, RowRef::Body(1)),
        Some(LineRange::line(11))
    );
    assert_eq!(
        locate_row(&lines, stats.content, RowRef::Suffix("strength")),
        Some(LineRange::line(10))
    );
    assert_eq!(
        locate_row(&lines, stats.content, RowRef::Suffix("stats.dexterity")),
        Some(LineRange::line(11))
    );
    assert_eq!(locate_row(&lines, stats.content, RowRef::Suffix("ength")), None);
    assert_eq!(
        locate_row(&lines, stats.content, RowRef::Path("stats.dexterity")),
        Some(LineRange::line(11))
    );
    assert_eq!(locate_row(&lines, stats.content, RowRef::Path("dexterity")), None);
    assert_eq!(locate_row(&lines, stats.content, RowRef::Index(4)), None);
    assert_eq!(locate_row(&lines, stats.content, RowRef::Body(2)), None);
}

#[test]
fn test_extract_key_path() {
    let lines = lines(DOC);
    let callout = locate_callout(&lines, None).unwrap();
    let stats = locate_group(&lines, callout, "Stats").unwrap();
    assert_eq!(
        extract_key_path(&lines, stats.content, 2).as_deref(),
        Some("stats.strength")
    );
    assert_eq!(extract_key_path(&lines, stats.content, 0), None);
    assert_eq!(key_path_in("> | Name | `=this.name` |"), Some("name"));
    assert_eq!(key_path_in("> | Name | =this.name |"), None);
}

#[test]
fn test_row_label() {
    assert_eq!(
        row_label("> | Strength | `=this.stats.strength` |"),
        Some("Strength")
    );
    assert_eq!(row_label("> |  | x |"), None);
    assert_eq!(row_label("> plain"), None);
}

#[test]
fn test_unlocked_sentinel() {
    let locked = lines("> [!infobox]\n> # Box");
    let unlocked = lines("> [!infobox]\n> %% unlocked %%\n> # Box");
    assert!(!is_unlocked(&locked, locate_callout(&locked, None).unwrap()));
    assert!(is_unlocked(&unlocked, locate_callout(&unlocked, None).unwrap()));
}
