use pretty_assertions::assert_eq;

use super::*;

fn tagged(tag: &str, level: u32) -> CheckFunction {
    CheckFunction::builder("f", |_| Ok(true))
        .tag(tag)
        .ruid(format!("{tag}_r"))
        .phase("p1")
        .level(level)
        .build()
        .unwrap()
}

#[test]
fn str_list_splits_on_whitespace() {
    assert_eq!(param_str_list(["foo fum", "bar"]).unwrap(), vec!["foo", "fum", "bar"]);
    assert_eq!(param_str_list(["  "]).unwrap(), Vec::<String>::new());
    assert_eq!(param_str_list(Vec::<String>::new()).unwrap(), Vec::<String>::new());
}

#[test]
fn str_list_rejects_disallowed_characters() {
    for bad in ["a,b", "x!", "t-1", "q'", "(p)"] {
        assert!(
            matches!(param_str_list([bad]), Err(RuleCheckError::InvalidParameter(_))),
            "{bad}"
        );
    }
}

#[test]
fn int_list_accepts_numbers_and_strings() {
    assert_eq!(param_int_list([1, 2]).unwrap(), vec![1, 2]);
    assert_eq!(param_int_list(["1 2", "3"]).unwrap(), vec![1, 2, 3]);
    assert!(param_int_list(["1.5"]).is_err());
    assert!(param_int_list(["a"]).is_err());
    assert!(param_int_list([-1]).is_err());
}

#[test]
fn keep_and_exclude_are_complements() {
    let f = tagged("t1", 2);
    assert!(keep_tags(["t1"]).unwrap()(&f));
    assert!(!exclude_tags(["t1"]).unwrap()(&f));
    assert!(keep_ruids(["t1_r"]).unwrap()(&f));
    assert!(!exclude_ruids(["t1_r"]).unwrap()(&f));
    assert!(keep_phases(["p1 p2"]).unwrap()(&f));
    assert!(!exclude_phases(["p1"]).unwrap()(&f));
    assert!(keep_levels(["1 2"]).unwrap()(&f));
    assert!(!exclude_levels([2]).unwrap()(&f));
    assert!(!keep_levels([3]).unwrap()(&f));
}

#[test]
fn filter_construction_fails_fast() {
    assert!(keep_tags(["bad,tag"]).is_err());
    assert!(exclude_levels(["two"]).is_err());
}

#[test]
fn selection_normalizes_each_category() {
    let selection = AttributeSelection::new()
        .tags(["t1 t2"])
        .and_then(|s| s.ruids(["r1"]))
        .and_then(|s| s.levels([1, 2]))
        .and_then(|s| s.phases(["p1"]))
        .unwrap();
    assert!(!selection.is_empty());
    assert!(selection.any_match(&tagged("t2", 9)));
    assert!(selection.any_match(&tagged("t9", 2)));
    assert!(!selection.any_match(&CheckFunction::builder("g", |_| Ok(true)).level(5).build().unwrap()));
    assert!(AttributeSelection::new().is_empty());
}

#[test]
fn selection_rejects_entries_as_they_are_added() {
    let err = AttributeSelection::new().tags(["bad!tag"]).unwrap_err();
    assert_eq!(err.to_string(), "Invalid parameter list: Invalid character '!' in 'bad!tag'");
    assert!(AttributeSelection::new().phases(["ok"]).and_then(|s| s.levels(["x"])).is_err());
}
