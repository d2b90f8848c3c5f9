use super::*;

fn br(status: bool, func: &str, weight: f64, skipped: bool) -> CheckResult {
    CheckResult {
        func_name: func.to_string(),
        weight,
        skipped,
        ..CheckResult::new(status, "No RUID")
    }
}

fn weights_with_skip() -> Vec<CheckResult> {
    vec![
        br(false, "func1", 100.0, false),
        br(false, "func1", 100.0, false),
        br(true, "func2", 200.0, false),
        br(true, "func2", 200.0, true),
        br(false, "func3", 300.0, false),
        br(true, "func3", 300.0, false),
    ]
}

fn half_pass() -> Vec<CheckResult> {
    vec![
        br(true, "func3", 300.0, false),
        br(false, "func3", 300.0, false),
        br(false, "func3", 300.0, true),
    ]
}

fn all_pass() -> Vec<CheckResult> {
    vec![
        br(true, "func3", 300.0, false),
        br(true, "func3", 300.0, false),
        br(false, "func3", 300.0, true),
    ]
}

fn all_fail() -> Vec<CheckResult> {
    vec![
        br(false, "func3", 300.0, false),
        br(false, "func3", 300.0, false),
        br(true, "func3", 300.0, true),
    ]
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn score_by_result_weights_passes() {
    let total = 2.0 * 100.0 + 200.0 + 2.0 * 300.0;
    let pass = 200.0 + 300.0;
    assert!(approx(
        ScoreByResult.score(&weights_with_skip()),
        100.0 * pass / total
    ));
}

#[test]
fn score_by_function_binary_needs_every_result_to_pass() {
    let total = 100.0 + 200.0 + 300.0;
    assert!(approx(
        ScoreByFunctionBinary.score(&weights_with_skip()),
        100.0 * 200.0 / total
    ));
}

#[test]
fn score_by_function_mean_weights_pass_ratio() {
    let total = 2.0 * 100.0 + 200.0 + 2.0 * 300.0;
    let pass = 0.0 + 200.0 + 300.0;
    assert!(approx(
        ScoreByFunctionMean.score(&weights_with_skip()),
        100.0 * pass / total
    ));
}

#[test]
fn binary_pass_needs_any_pass() {
    assert!(approx(ScoreBinaryPass.score(&all_pass()), 100.0));
    assert!(approx(ScoreBinaryPass.score(&all_fail()), 0.0));
    assert!(approx(ScoreBinaryPass.score(&half_pass()), 100.0));
}

#[test]
fn binary_fail_needs_no_fail() {
    assert!(approx(ScoreBinaryFail.score(&all_pass()), 100.0));
    assert!(approx(ScoreBinaryFail.score(&all_fail()), 0.0));
    assert!(approx(ScoreBinaryFail.score(&half_pass()), 0.0));
}

#[test]
fn every_strategy_scores_empty_as_zero() {
    for kind in [
        StrategyKind::ByResult,
        StrategyKind::ByFunctionBinary,
        StrategyKind::ByFunctionMean,
        StrategyKind::BinaryPass,
        StrategyKind::BinaryFail,
    ] {
        assert!(approx(kind.strategy().score(&[]), 0.0), "{kind}");
    }
}

#[test]
fn only_skipped_results_score_zero() {
    let skipped = vec![br(true, "f", 100.0, true)];
    assert!(approx(ScoreByResult.score(&skipped), 0.0));
    assert!(approx(ScoreBinaryFail.score(&skipped), 0.0));
}

#[test]
fn factory_resolves_names_and_aliases() {
    let cases = [
        ("by_function_mean", "by_function_mean"),
        ("by_function_binary", "by_function_binary"),
        ("by_result", "by_result"),
        ("by_binary_pass", "by_binary_pass"),
        ("by_binary_fail", "by_binary_fail"),
        ("ScoreByFunctionMean", "by_function_mean"),
        ("ScoreByFunctionBinary", "by_function_binary"),
        ("ScoreByResult", "by_result"),
        ("ScoreBinaryPass", "by_binary_pass"),
        ("ScoreBinaryFail", "by_binary_fail"),
        ("BY-RESULT", "by_result"),
    ];
    for (name, expected) in cases {
        assert_eq!(strategy_factory(name).unwrap().name(), expected, "{name}");
    }
}

#[test]
fn factory_rejects_unknown_names() {
    let err = strategy_factory("bad_strategy_name").err().unwrap();
    assert!(matches!(err, RuleCheckError::UnknownStrategy(_)));
}

#[test]
fn strategy_kind_serde_uses_canonical_names() {
    let kind: StrategyKind = serde_json::from_str("\"ScoreByFunctionMean\"").unwrap();
    assert_eq!(kind, StrategyKind::ByFunctionMean);
    assert_eq!(serde_json::to_string(&kind).unwrap(), "\"by_function_mean\"");
    assert!(serde_json::from_str::<StrategyKind>("\"nope\"").is_err());
}
