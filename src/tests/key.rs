use super::{assign, remove, resolve, slug, Key};
use serde_yaml::Value;

fn doc(yaml: &str) -> Value {
    serde_yaml::from_str(yaml).unwrap()
}

fn path(dotted: &str) -> Vec<String> {
    dotted.split('.').map(str::to_string).collect()
}

#[test]
fn test_key_from_formula() {
    let key = Key::from_formula("`=this.stats.strength`").unwrap();
    assert_eq!(key.segments(), ["stats", "strength"]);
    assert_eq!(key.formula(), "=this.stats.strength");
    assert_eq!(key.to_string(), "stats.strength");
}

#[test]
fn test_key_rejects_empty_segments() {
    assert!(Key::new("").is_none());
    assert!(Key::new("stats..strength").is_none());
    assert!(Key::new(".stats").is_none());
    assert!(Key::from_formula("=that.stats").is_none());
    assert!(Key::from_segments(vec![]).is_none());
}

#[test]
fn test_key_equality_is_structural() {
    let a = Key::new("stats.strength").unwrap();
    let b = Key::from_segments(vec!["stats".into(), "strength".into()]).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_resolve_missing_intermediate_is_absent() {
    let d = doc("name: Ada\nstats:\n  strength: 10\n");
    assert_eq!(resolve(&d, &path("name")), Some(&Value::from("Ada")));
    assert_eq!(resolve(&d, &path("stats.strength")), Some(&Value::from(10)));
    assert_eq!(resolve(&d, &path("stats.dexterity")), None);
    assert_eq!(resolve(&d, &path("skills.climb")), None);
    // scalars have no children
    assert_eq!(resolve(&d, &path("name.first")), None);
}

#[test]
fn test_resolve_keeps_falsy_values() {
    let d = doc("stats:\n  luck: 0\n  title: ''\n");
    assert_eq!(resolve(&d, &path("stats.luck")), Some(&Value::from(0)));
    assert_eq!(resolve(&d, &path("stats.title")), Some(&Value::from("")));
}

#[test]
fn test_assign_then_resolve() {
    let mut d = doc("{}");
    assign(&mut d, &path("stats.strength"), Value::from("10"));
    assert_eq!(resolve(&d, &path("stats.strength")), Some(&Value::from("10")));

    assign(&mut d, &path("a.b.c.d"), Value::from(true));
    assert_eq!(resolve(&d, &path("a.b.c.d")), Some(&Value::from(true)));

    assign(&mut d, &path("stats.strength"), Value::from("12"));
    assert_eq!(resolve(&d, &path("stats.strength")), Some(&Value::from("12")));
}

#[test]
fn test_assign_into_null_document() {
    let mut d = Value::Null;
    assign(&mut d, &path("title"), Value::from("Hero"));
    assert_eq!(d, doc("title: Hero"));
}

#[test]
fn test_assign_replaces_scalar_intermediate() {
    let mut d = doc("stats: none\n");
    assign(&mut d, &path("stats.strength"), Value::from(3));
    assert_eq!(resolve(&d, &path("stats.strength")), Some(&Value::from(3)));
}

#[test]
fn test_remove_keeps_siblings_and_empty_parent() {
    let mut d = doc("stats:\n  strength: 10\n  dexterity: 8\n");
    assert_eq!(
        remove(&mut d, &path("stats.strength")),
        Some(Value::from(10))
    );
    assert_eq!(resolve(&d, &path("stats.strength")), None);
    assert_eq!(resolve(&d, &path("stats.dexterity")), Some(&Value::from(8)));

    remove(&mut d, &path("stats.dexterity"));
    assert_eq!(resolve(&d, &path("stats")), Some(&doc("{}")));
}

#[test]
fn test_remove_missing_intermediate_is_noop() {
    let mut d = doc("stats:\n  strength: 10\n");
    let before = d.clone();
    assert_eq!(remove(&mut d, &path("skills.climb")), None);
    assert_eq!(d, before);
}

#[test]
fn test_remove_preserves_order() {
    let mut d = doc("a: 1\nb: 2\nc: 3\n");
    Key::new("a").unwrap().delete(&mut d);
    let keys: Vec<_> = d
        .as_mapping()
        .unwrap()
        .keys()
        .map(|k| k.as_str().unwrap().to_string())
        .collect();
    assert_eq!(keys, ["b", "c"]);
}

#[test]
fn test_slug() {
    assert_eq!(slug("Stats"), "stats");
    assert_eq!(slug("  Base   Stats "), "base_stats");
}
