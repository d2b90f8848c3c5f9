use indexmap::IndexMap;
use serde_json::{Value, json};

use super::*;

fn map(pairs: &[(&str, Value)]) -> IndexMap<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

#[test]
fn env_from_map_preserves_order() {
    let env = Env::from(map(&[("b", json!(1)), ("a", json!(2))]));
    assert_eq!(env.keys().collect::<Vec<_>>(), vec!["b", "a"]);
    assert_eq!(env.get("a"), Some(&json!(2)));
    assert_eq!(env.len(), 2);
}

#[test]
fn env_nulls_lists_null_keys() {
    let env = Env::from(map(&[("x", Value::Null), ("y", json!("v")), ("z", Value::Null)]));
    assert_eq!(env.nulls(), vec!["x".to_string(), "z".to_string()]);
}

#[test]
fn layered_last_writer_wins() {
    let base = Env::from(map(&[("k", json!(1))]));
    let next = base.layered(map(&[("k", json!(2)), ("n", json!(3))]), "env_test");
    assert_eq!(next.get("k"), Some(&json!(2)));
    assert_eq!(next.get("n"), Some(&json!(3)));
    // base is untouched
    assert_eq!(base.get("k"), Some(&json!(1)));
    assert!(!base.contains_key("n"));
}

#[test]
fn env_function_requires_prefix() {
    let err = EnvFunction::new("setup", |_| Ok(IndexMap::new())).unwrap_err();
    assert!(matches!(err, RuleCheckError::InvalidAttribute { .. }));
    assert!(EnvFunction::new("env_setup", |_| Ok(IndexMap::new())).is_ok());
}

#[test]
fn load_environment_chains_functions() {
    let first = EnvFunction::new("env_first", |_| {
        let mut out = IndexMap::new();
        out.insert("root".to_string(), json!("/tmp"));
        Ok(out)
    })
    .unwrap();
    let second = EnvFunction::new("env_second", |env: &Env| {
        let root = env.get("root").and_then(Value::as_str).unwrap_or_default();
        let mut out = IndexMap::new();
        out.insert("logs".to_string(), json!(format!("{root}/logs")));
        out.insert("missing".to_string(), Value::Null);
        Ok(out)
    })
    .unwrap();

    let env = load_environment(&Env::new(), [&first, &second]).unwrap();
    assert_eq!(env.get("logs"), Some(&json!("/tmp/logs")));
    assert_eq!(env.nulls(), vec!["missing".to_string()]);
}

#[test]
fn load_environment_reports_failing_function() {
    let broken = EnvFunction::new("env_broken", |_| anyhow::bail!("db offline")).unwrap();
    let err = load_environment(&Env::new(), [&broken]).unwrap_err();
    assert!(err.to_string().contains("env_broken"));
    assert!(err.to_string().contains("db offline"));
}

#[derive(Debug, PartialEq)]
struct Pool {
    url: String,
}

#[test]
fn handles_are_read_back_by_type() {
    let env = Env::new()
        .with("pool", EnvValue::handle(Pool { url: "db://main".to_string() }))
        .with("retries", json!(3));

    assert_eq!(env.handle::<Pool>("pool").map(|p| p.url.as_str()), Some("db://main"));
    assert!(env.handle::<String>("pool").is_none());
    assert!(env.handle::<Pool>("retries").is_none());
    assert_eq!(env.get("pool"), None);
    assert_eq!(env.get("retries"), Some(&json!(3)));
    assert!(env.nulls().is_empty());
}

#[test]
fn env_function_can_supply_handles() {
    let connect = EnvFunction::with_handles("env_connect", |env: &Env| {
        let url = env.get("url").and_then(Value::as_str).unwrap_or("db://none");
        Ok(IndexMap::from([
            ("pool".to_string(), EnvValue::handle(Pool { url: url.to_string() })),
            ("schema".to_string(), EnvValue::Json(Value::Null)),
        ]))
    })
    .unwrap();

    let base = Env::new().with("url", json!("db://replica"));
    let env = load_environment(&base, [&connect]).unwrap();

    assert_eq!(env.handle::<Pool>("pool").unwrap().url, "db://replica");
    assert_eq!(env.nulls(), vec!["schema".to_string()]);
}
