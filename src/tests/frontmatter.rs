use super::{frontmatter_end, frontmatter_or_empty, read_frontmatter, write_frontmatter};
use crate::error::Error;
use serde_yaml::Value;

fn lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

#[test]
fn test_read_frontmatter() {
    let doc = lines("---\nname: Ada\nstats:\n  strength: 10\n---\nBody");
    let frontmatter = read_frontmatter(&doc).unwrap().unwrap();
    assert_eq!(frontmatter.end, 4);
    assert_eq!(
        frontmatter.doc,
        serde_yaml::from_str::<Value>("name: Ada\nstats:\n  strength: 10").unwrap()
    );
}

#[test]
fn test_missing_or_unclosed_block_is_absent() {
    assert!(read_frontmatter(&lines("Body\n---\nname: x\n---"))
        .unwrap()
        .is_none());
    assert!(read_frontmatter(&lines("---\nname: Ada\nBody"))
        .unwrap()
        .is_none());
    assert_eq!(frontmatter_end(&lines("")), None);
}

#[test]
fn test_empty_block_is_empty_mapping() {
    let frontmatter = read_frontmatter(&lines("---\n---\nBody")).unwrap().unwrap();
    assert_eq!(frontmatter.end, 1);
    assert_eq!(frontmatter.doc, Value::Mapping(serde_yaml::Mapping::new()));
}

#[test]
fn test_malformed_block_is_an_error() {
    let doc = lines("---\nname: [unclosed\n---\nBody");
    assert!(matches!(read_frontmatter(&doc), Err(Error::Yaml(_))));
    assert_eq!(
        frontmatter_or_empty(&doc),
        Value::Mapping(serde_yaml::Mapping::new())
    );

    let scalar = lines("---\njust a string\n---");
    assert!(matches!(
        read_frontmatter(&scalar),
        Err(Error::FrontmatterShape)
    ));
}

#[test]
fn test_unchanged_write_is_noop() {
    let original = lines("---\nname: Ada\nstats:\n  strength: 10\n  dexterity: 8\n---\n# Body\n");
    let mut rewritten = original.clone();
    let frontmatter = read_frontmatter(&original).unwrap().unwrap();
    write_frontmatter(&mut rewritten, &frontmatter.doc, Some(frontmatter.end)).unwrap();
    assert_eq!(rewritten, original);
}

#[test]
fn test_write_then_read_round_trips() {
    let mut doc = lines("---\nold: value\n---\nBody\nMore");
    let value: Value =
        serde_yaml::from_str("title: Hero\nstats:\n  strength: '10'\n  tags:\n  - a\n  - b")
            .unwrap();
    write_frontmatter(&mut doc, &value, Some(2)).unwrap();
    let frontmatter = read_frontmatter(&doc).unwrap().unwrap();
    assert_eq!(frontmatter.doc, value);
    assert_eq!(&doc[frontmatter.end + 1..], ["Body", "More"]);
}

#[test]
fn test_write_inserts_block_when_absent() {
    let mut doc = lines("Body");
    let value: Value = serde_yaml::from_str("name: Ada").unwrap();
    write_frontmatter(&mut doc, &value, None).unwrap();
    assert_eq!(doc, ["---", "name: Ada", "---", "Body"]);

    let mut untouched = lines("Body");
    write_frontmatter(&mut untouched, &Value::Mapping(serde_yaml::Mapping::new()), None).unwrap();
    assert_eq!(untouched, ["Body"]);
}

#[test]
fn test_empty_mapping_writes_bare_delimiters() {
    let mut doc = lines("---\nname: Ada\n---\nBody");
    write_frontmatter(&mut doc, &Value::Mapping(serde_yaml::Mapping::new()), Some(2)).unwrap();
    assert_eq!(doc, ["---", "---", "Body"]);
}

#[test]
fn test_write_keeps_crlf_line_endings() {
    let mut doc = lines("---\r\nname: Ada\r\n---\r\nBody");
    let value: Value = serde_yaml::from_str("name: Grace\nlevel: 3").unwrap();
    write_frontmatter(&mut doc, &value, Some(2)).unwrap();
    assert_eq!(doc, ["---\r", "name: Grace\r", "level: 3\r", "---\r", "Body"]);
}
