use super::*;

#[test]
fn exit_codes_are_distinct() {
    assert_ne!(EXIT_SUCCESS, EXIT_CHECK_FAILED);
    assert_ne!(EXIT_SUCCESS, EXIT_CONFIG_ERROR);
    assert_ne!(EXIT_CHECK_FAILED, EXIT_CONFIG_ERROR);
}

#[test]
fn root_exports_cover_a_basic_run() {
    let check = CheckFunction::new("always", |_| Ok(true)).unwrap();
    let mut checker = Checker::builder().function(check).auto_setup(true).build().unwrap();
    let results: Vec<CheckResult> = checker.stream().unwrap().collect();
    assert_eq!(results.len(), 1);
    assert!((checker.score() - 100.0).abs() < 1e-9);
}
