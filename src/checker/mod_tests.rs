use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::env::{EnvFunction, EnvValue};
use crate::render::{MARKUP, RenderStyle};
use crate::result::CheckResult;
use crate::rule_control::RuleControl;
use crate::score::ScoreBinaryFail;

use super::*;

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuf {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

fn check(name: &str, status: bool) -> CheckFunction {
    CheckFunction::new(name, move |_| Ok(status)).unwrap()
}

fn labelled(name: &str, tag: &str, ruid: &str, level: u32, phase: &str) -> CheckFunction {
    CheckFunction::builder(name, |_| Ok(true))
        .tag(tag)
        .ruid(ruid)
        .level(level)
        .phase(phase)
        .build()
        .unwrap()
}

fn labelled_checker() -> Checker {
    Checker::builder()
        .functions([
            labelled("f1", "t1", "r1", 1, "p1"),
            labelled("f2", "t2", "r2", 2, "p1"),
            labelled("f3", "t1", "r3", 3, "p2"),
            labelled("f4", "t3", "r4", 2, "p3"),
        ])
        .auto_setup(true)
        .build()
        .unwrap()
}

fn names(functions: &[CheckFunction]) -> Vec<&str> {
    functions.iter().map(CheckFunction::function_name).collect()
}

fn debug_checker(builder: CheckerBuilder) -> (Checker, SharedBuf) {
    let buf = SharedBuf::default();
    let checker = builder
        .progress(Box::new(DebugProgress::new(buf.clone())))
        .auto_setup(true)
        .build()
        .unwrap();
    (checker, buf)
}

#[test]
fn build_requires_a_source() {
    let err = Checker::builder().build().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Configuration error: You must provide at least one package, module or function to check."
    );
}

#[test]
fn adhoc_functions_get_module_and_index() {
    let mut checker = Checker::builder()
        .functions([check("a", true), check("b", true)])
        .build()
        .unwrap();
    let functions = checker.pre_collect();
    assert!(functions.iter().all(|f| f.module_name() == ADHOC_MODULE));
    let indexes: Vec<_> = functions.iter().map(CheckFunction::index).collect();
    assert_eq!(indexes, vec![1, 2]);
}

#[test]
fn pre_collect_orders_packages_modules_then_adhoc() {
    let pkg_module = CheckModule::builder("check_pkg")
        .function(check("from_package", true))
        .build()
        .unwrap();
    let package = CheckPackage::builder("pkg").module(pkg_module).build().unwrap();
    let module = CheckModule::builder("check_mod")
        .function(check("from_module", true))
        .build()
        .unwrap();
    let mut checker = Checker::builder()
        .function(check("adhoc_fn", true))
        .module(module)
        .package(package)
        .build()
        .unwrap();
    assert_eq!(
        names(checker.pre_collect()),
        vec!["from_package", "from_module", "adhoc_fn"]
    );
    assert_eq!(checker.module_count(), 2);
    assert_eq!(checker.package_count(), 1);
    assert_eq!(checker.module_names(), vec!["check_mod", "check_pkg"]);
}

#[test]
fn filters_are_anded() {
    let mut checker = labelled_checker();
    let filters = vec![keep_tags(["t1 t2"]).unwrap(), exclude_levels([3]).unwrap()];
    assert_eq!(names(checker.prepare(&filters).unwrap()), vec!["f1", "f2"]);
}

#[test]
fn prepare_without_filters_keeps_everything() {
    let mut checker = labelled_checker();
    assert_eq!(checker.prepare(&[]).unwrap().len(), 4);
}

#[test]
fn partial_ruids_are_rejected() {
    let mut checker = Checker::builder()
        .functions([labelled("f1", "", "r1", 1, ""), check("f2", true)])
        .build()
        .unwrap();
    let err = checker.prepare(&[]).unwrap_err();
    assert!(matches!(err, RuleCheckError::RuidIssues(_)));
    assert!(err.to_string().contains("Blank RUIDs are present."));
}

#[test]
fn auto_ruid_fills_blank_ids() {
    let mut checker = Checker::builder()
        .functions([check("f1", true), labelled("f2", "", "mine", 1, ""), check("f3", true)])
        .auto_ruid(true)
        .auto_setup(true)
        .build()
        .unwrap();
    assert_eq!(checker.ruids(), vec!["__ruid__0001", "__ruid__0002", "mine"]);
    assert_eq!(checker.prepare(&[]).unwrap().len(), 3);
}

#[test]
fn auto_ruid_counts_only_filled_ids() {
    let mut checker = Checker::builder()
        .functions([labelled("a", "", "r1", 1, ""), check("b", true), check("c", true)])
        .auto_ruid(true)
        .auto_setup(true)
        .build()
        .unwrap();
    let by_name: Vec<(&str, &str)> = checker
        .collected()
        .iter()
        .map(|f| (f.function_name(), f.ruid()))
        .collect();
    assert_eq!(by_name, vec![("a", "r1"), ("b", "__ruid__0001"), ("c", "__ruid__0002")]);

    // A second prepare keeps the ids already handed out.
    checker.prepare(&[]).unwrap();
    assert_eq!(checker.ruids(), vec!["__ruid__0001", "__ruid__0002", "r1"]);
}

#[test]
fn rule_control_narrows_collection() {
    let rc = RuleControl::from_value(json!({"tags": "t1", "levels": "-3"})).unwrap();
    let mut checker = Checker::builder()
        .functions([
            labelled("f1", "t1", "r1", 1, "p1"),
            labelled("f2", "t2", "r2", 2, "p1"),
            labelled("f3", "t1", "r3", 3, "p2"),
        ])
        .rule_control(rc)
        .build()
        .unwrap();
    assert_eq!(names(checker.prepare(&[]).unwrap()), vec!["f1"]);
    assert!(checker.rule_control().is_some());
}

#[test]
fn include_by_attribute_is_or_across_categories() {
    let mut checker = labelled_checker();
    let selection = AttributeSelection::new().tags(["t3"]).unwrap().levels(["3"]).unwrap();
    assert_eq!(
        names(checker.include_by_attribute(&selection)),
        vec!["f3", "f4"]
    );
}

#[test]
fn empty_include_keeps_everything() {
    let mut checker = labelled_checker();
    let kept = checker.include_by_attribute(&AttributeSelection::new());
    assert_eq!(kept.len(), 4);
}

#[test]
fn exclude_by_attribute_drops_any_match() {
    let mut checker = labelled_checker();
    let selection = AttributeSelection::new().ruids(["r1"]).unwrap().phases(["p2"]).unwrap();
    assert_eq!(
        names(checker.exclude_by_attribute(&selection)),
        vec!["f2", "f4"]
    );
}

#[test]
fn malformed_selection_is_rejected_when_built() {
    assert!(matches!(
        AttributeSelection::new().levels(["1,2"]),
        Err(RuleCheckError::InvalidParameter(_))
    ));
    assert!(matches!(
        AttributeSelection::new().tags(["bad!tag"]),
        Err(RuleCheckError::InvalidParameter(_))
    ));
}

#[test]
fn attribute_queries_are_sorted_and_unique() {
    let checker = labelled_checker();
    assert_eq!(checker.tags(), vec!["t1", "t2", "t3"]);
    assert_eq!(checker.levels(), vec![1, 2, 3]);
    assert_eq!(checker.phases(), vec!["p1", "p2", "p3"]);
    assert_eq!(checker.ruids(), vec!["r1", "r2", "r3", "r4"]);
    assert_eq!(checker.function_count(), 4);
}

#[test]
fn run_all_collects_results_and_scores() {
    let mut checker = Checker::builder()
        .functions([check("func1", true), check("func2", true)])
        .auto_setup(true)
        .build()
        .unwrap();
    let results = checker.run_all().unwrap();
    assert_eq!(results.len(), 2);
    assert!((checker.score() - 100.0).abs() < f64::EPSILON);
    assert!(checker.perfect_run());
    assert!(checker.clean_run());
    assert_eq!(checker.pass_count(), 2);
    assert_eq!(checker.fail_count(), 0);
    assert_eq!(checker.result_count(), 2);
    assert!(checker.end_time() >= checker.start_time());
}

#[test]
fn debug_progress_reports_each_step() {
    let (mut checker, buf) =
        debug_checker(Checker::builder().functions([check("func1", true), check("func2", true)]));
    checker.run_all().unwrap();
    assert_eq!(
        buf.text(),
        "Start Rule Check\nFunc Start func1\n+Func done.\nFunc Start func2\n+Func done.\nRule Check Complete.\nScore = 100.0\n"
    );
}

#[test]
fn finish_on_fail_stops_the_function_only() {
    let stops = CheckFunction::builder("f1", |_| {
        Ok(vec![CheckResult::fail("first"), CheckResult::pass("never")])
    })
    .finish_on_fail(true)
    .build()
    .unwrap();
    let (mut checker, buf) = debug_checker(Checker::builder().functions([stops, check("f2", true)]));
    let results = checker.run_all().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(
        buf.text(),
        "Start Rule Check\nFunc Start f1\nEarly exit. f1 failed.\nFunc done.\nFunc Start f2\n+Func done.\nRule Check Complete.\nScore = 50.0\n"
    );
}

#[test]
fn abort_on_fail_ends_the_run() {
    let (mut checker, buf) = debug_checker(
        Checker::builder()
            .functions([check("f1", false), check("f2", true)])
            .abort_on_fail(true),
    );
    assert_eq!(checker.run_all().unwrap().len(), 1);
    assert_eq!(
        buf.text(),
        "Start Rule Check\nFunc Start f1\nAbort on fail: f1\nRule Check Complete.\nScore = 0.0\n"
    );
}

#[test]
fn abort_on_exception_ends_the_run() {
    let boom = CheckFunction::new("f1", |_| -> anyhow::Result<bool> { anyhow::bail!("boom") }).unwrap();
    let (mut checker, buf) = debug_checker(
        Checker::builder()
            .functions([boom, check("f2", true)])
            .abort_on_exception(true),
    );
    let results = checker.run_all().unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].except.is_some());
    assert!(!checker.clean_run());
    assert!(buf.text().contains("Abort on exception: f1\nRule Check Complete.\n"));
}

#[test]
fn both_abort_policies_report_both_notices() {
    let boom = CheckFunction::new("f1", |_| -> anyhow::Result<bool> { anyhow::bail!("boom") }).unwrap();
    let (mut checker, buf) = debug_checker(
        Checker::builder()
            .functions([boom, check("f2", true)])
            .abort_on_fail(true)
            .abort_on_exception(true),
    );
    assert_eq!(checker.run_all().unwrap().len(), 1);
    assert!(
        buf.text()
            .contains("Abort on fail: f1\nAbort on exception: f1\nRule Check Complete.\n")
    );
}

#[test]
fn exceptions_do_not_stop_the_run_by_default() {
    let boom = CheckFunction::new("f1", |_| -> anyhow::Result<bool> { anyhow::bail!("boom") }).unwrap();
    let mut checker = Checker::builder()
        .functions([boom, check("f2", true)])
        .auto_setup(true)
        .build()
        .unwrap();
    let results = checker.run_all().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].msg, "Exception 'boom' occurred while running adhoc.f1");
    assert_eq!(checker.fail_count(), 1);
}

#[test]
fn missing_parameter_fails_the_run_start() {
    let needs = CheckFunction::builder("f1", |_| Ok(true))
        .param("absent")
        .build()
        .unwrap();
    let mut checker = Checker::builder().function(needs).auto_setup(true).build().unwrap();
    let err = checker.run_all().unwrap_err();
    assert!(matches!(err, RuleCheckError::MissingParameter { .. }));
}

#[test]
fn environment_functions_feed_parameters() {
    let env_fn = EnvFunction::new("env_setup", |env| {
        let base = env.get("base").and_then(Value::as_i64).unwrap_or_default();
        let mut out = IndexMap::new();
        out.insert("answer".to_string(), json!(base + 40));
        out.insert("nothing".to_string(), Value::Null);
        Ok(out)
    })
    .unwrap();
    let uses = CheckFunction::builder("check_answer", |args| Ok(args.get::<i64>("answer")? == 42))
        .param("answer")
        .build()
        .unwrap();
    let module = CheckModule::builder("check_env")
        .function(uses)
        .env_function(env_fn)
        .build()
        .unwrap();
    let mut checker = Checker::builder()
        .module(module)
        .env(std::iter::once(("base".to_string(), json!(2))).collect())
        .auto_setup(true)
        .build()
        .unwrap();
    let results = checker.run_all().unwrap();
    assert_eq!(results[0].status, Some(true));
    assert_eq!(checker.env_nulls(), ["nothing".to_string()]);
}

struct Inventory {
    hosts: Vec<&'static str>,
}

#[test]
fn environment_handles_reach_check_functions() {
    let env_fn = EnvFunction::with_handles("env_inventory", |_| {
        let inventory = Inventory { hosts: vec!["web1", "web2"] };
        Ok(IndexMap::from([("inventory".to_string(), EnvValue::handle(inventory))]))
    })
    .unwrap();
    let uses = CheckFunction::builder("check_hosts", |args| {
        let inventory = args.handle::<Inventory>("inventory")?;
        Ok(CheckResult::new(inventory.hosts.len() == 2, "two hosts"))
    })
    .param("inventory")
    .build()
    .unwrap();
    let module = CheckModule::builder("check_inventory")
        .function(uses)
        .env_function(env_fn)
        .build()
        .unwrap();
    let mut checker = Checker::builder().module(module).auto_setup(true).build().unwrap();

    let results = checker.run_all().unwrap();
    assert_eq!(results[0].status, Some(true));
    assert!(checker.env_nulls().is_empty());
}

#[test]
fn messages_are_rendered() {
    let f = CheckFunction::new("f1", |_| Ok(CheckResult::pass(MARKUP.bold("ok")))).unwrap();
    let mut checker = Checker::builder()
        .function(f)
        .renderer(Arc::new(MarkupRenderer::new(RenderStyle::Markdown)))
        .auto_setup(true)
        .build()
        .unwrap();
    let results = checker.run_all().unwrap();
    assert_eq!(results[0].msg, "<<b>>ok<</b>>");
    assert_eq!(results[0].msg_rendered, "**ok**");
}

#[test]
fn stream_yields_lazily_and_scores_on_drop() {
    let mut checker = Checker::builder()
        .functions([check("f1", true), check("f2", false)])
        .score_strategy(Box::new(ScoreBinaryFail))
        .auto_setup(true)
        .build()
        .unwrap();
    {
        let mut stream = checker.stream().unwrap();
        let first = stream.next().unwrap();
        assert_eq!(first.func_name, "f1");
    }
    assert_eq!(checker.result_count(), 1);
    assert!((checker.score() - 100.0).abs() < f64::EPSILON);
}

#[test]
fn skipped_function_needs_no_parameters() {
    let skipped = CheckFunction::builder("f1", |_| Ok(true))
        .param("absent")
        .skip(true)
        .build()
        .unwrap();
    let mut checker = Checker::builder().function(skipped).auto_setup(true).build().unwrap();
    let results = checker.run_all().unwrap();
    assert!(results[0].skipped);
    assert_eq!(checker.skip_count(), 1);
    assert!(!checker.perfect_run());
}

#[test]
fn report_carries_header_and_counts() {
    let mut checker = Checker::builder()
        .functions([
            labelled("f1", "t1", "r1", 1, "p1"),
            CheckFunction::builder("f2", |_| Ok(CheckResult::pass("x").with_warning("careful")))
                .ruid("r2")
                .build()
                .unwrap(),
        ])
        .auto_setup(true)
        .build()
        .unwrap();
    checker.run_all().unwrap();
    let report = checker.report();
    assert_eq!(report.header.function_count, 2);
    assert_eq!(report.header.ruids, vec!["r1", "r2"]);
    assert_eq!(report.header.score_strategy, "by_result");
    assert_eq!(report.functions, vec!["f1", "f2"]);
    assert_eq!(report.passed_count, 2);
    assert_eq!(report.total_count, 2);
    assert_eq!(report.results.len(), 2);
    assert_eq!(checker.warn_count(), 1);
    assert!(!checker.perfect_run());
}
