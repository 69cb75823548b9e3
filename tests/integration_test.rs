// Integration tests for the playground pipeline

use std::time::Duration;

use algoviz::config::Config;
use algoviz::session::{InitOutcome, Playground, RunOutcome, EXAMPLE_BUBBLE_SORT, SUCCESS_MESSAGE};
use algoviz::snapshot::FrameKind;
use algoviz::visual::observed::InterceptPolicy;

fn playground(source: &str) -> Playground {
    let mut playground = Playground::new(Config::default());
    playground.set_source(source);
    playground
}

fn error_lines(playground: &Playground) -> Vec<&String> {
    playground
        .state()
        .log
        .iter()
        .filter(|line| line.starts_with("Error:"))
        .collect()
}

#[test]
fn test_bubble_sort_with_explicit_hooks() {
    let source = r#"
const list = [3, 1, 2];
async function sort() {
    for (let i = 0; i < list.length - 1; i++) {
        for (let j = 0; j < list.length - i - 1; j++) {
            await highlightElement(j);
            if (list[j] > list[j + 1]) {
                const t = list[j];
                list[j] = list[j + 1];
                list[j + 1] = t;
                await updateArrayData(list);
            }
        }
    }
}
await sort();
"#;
    let mut playground = playground(source);
    let session = playground.run();

    assert_eq!(session.outcome, RunOutcome::Success);
    assert_eq!(session.initial_array, vec![3.0, 1.0, 2.0]);
    assert_eq!(playground.state().array, vec![1.0, 2.0, 3.0]);
    assert_eq!(playground.state().highlighted, Some(0));
    assert_eq!(
        playground.state().log,
        vec![
            "Initialized array: [3,1,2]",
            "Highlighting element at index 0: 3",
            "Highlighting element at index 1: 3",
            "Highlighting element at index 0: 1",
            SUCCESS_MESSAGE,
        ]
    );
    // Three highlights and two updates, each followed by the pause
    assert_eq!(playground.visualizer().now(), Duration::from_millis(2500));
}

#[test]
fn test_runtime_error_inside_instrumented_loop() {
    let source = "const a = [1, 2, 3];
for (let i = 0; i < a.length; i++) {
  a[i] = a[i] * 10;
  if (i == 1) { missing; }
}";
    let mut playground = playground(source);
    let session = playground.run();

    assert!(matches!(session.outcome, RunOutcome::Failed(_)));
    let errors = error_lines(&playground);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0], "Error: Undefined variable 'missing' at line 4");
    // The first iteration's update reached the display, the second never ran
    assert_eq!(playground.state().array, vec![10.0, 2.0, 3.0]);
    assert_eq!(playground.state().log.last(), Some(errors[0]));
    assert!(!playground.state().log.iter().any(|l| l == SUCCESS_MESSAGE));
}

#[test]
fn test_example_sorts_descending_literal() {
    let mut playground = Playground::default();
    assert!(matches!(playground.load_example(), InitOutcome::Initialized(_)));
    assert_eq!(playground.source(), EXAMPLE_BUBBLE_SORT);

    let session = playground.run();

    assert!(session.outcome.is_success());
    assert_eq!(
        playground.state().array,
        vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]
    );
    assert_eq!(playground.state().log.last().map(String::as_str), Some(SUCCESS_MESSAGE));
    // 45 comparisons, each highlighting two elements
    let highlights = playground
        .timeline()
        .frames()
        .iter()
        .filter(|f| matches!(f.kind, FrameKind::Highlight(_)))
        .count();
    assert_eq!(highlights, 90);
}

#[test]
fn test_wrapper_access_waits_for_visualization() {
    let source = "const a = [4, 5];\nconst x = arrayData[1];\narrayData[0] = x;";

    let mut serialized = playground(source);
    serialized.run();
    // Read: highlight pause plus read pause; write: update pause
    assert_eq!(serialized.visualizer().now(), Duration::from_millis(1500));
    assert_eq!(serialized.state().array, vec![5.0, 5.0]);
    assert_eq!(serialized.state().highlighted, Some(1));

    let mut detached = Playground::new(Config {
        intercept: InterceptPolicy::Detached,
        ..Config::default()
    });
    detached.set_source(source);
    detached.run();
    assert_eq!(detached.visualizer().now(), Duration::ZERO);
    assert_eq!(detached.state().array, serialized.state().array);
    assert_eq!(detached.state().log, serialized.state().log);
}

#[test]
fn test_timeline_orders_highlight_before_update() {
    let mut playground = playground(
        "const a = [7];\nfor (let i = 0; i < a.length; i++) {\n  a[i] = 8;\n}",
    );
    playground.run();

    let kinds: Vec<(FrameKind, Duration)> = playground
        .timeline()
        .frames()
        .iter()
        .map(|f| (f.kind, f.at))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (FrameKind::Reset, Duration::ZERO),
            (FrameKind::Seeded, Duration::ZERO),
            (FrameKind::Log, Duration::ZERO),
            (FrameKind::Highlight(0), Duration::ZERO),
            // highlight pause, then the inserted delay
            (FrameKind::Update, Duration::from_millis(1000)),
            (FrameKind::Log, Duration::from_millis(1500)),
        ]
    );
}

#[test]
fn test_no_array_runs_against_previous_values() {
    let mut playground = playground("const a = [1, 2];");
    playground.initialize_array();
    playground.set_source("log(arrayData.length, 'items');");

    let session = playground.run();

    assert!(session.outcome.is_success());
    assert_eq!(session.initial_array, vec![1.0, 2.0]);
    assert_eq!(
        playground.state().log,
        vec![
            "No array found in the code for visualization.",
            "2 items",
            SUCCESS_MESSAGE,
        ]
    );
}

#[test]
fn test_infinite_loop_hits_step_limit() {
    let mut playground = Playground::new(Config {
        max_steps: 1_000,
        ..Config::default()
    });
    playground.set_source("const a = [1];\nwhile (true) {}");

    let session = playground.run();

    assert_eq!(
        session.outcome,
        RunOutcome::Failed("Execution step limit exceeded (1000 steps)".to_string())
    );
    assert_eq!(error_lines(&playground).len(), 1);
}

#[test]
fn test_self_containing_array_logs_without_overflow() {
    let mut playground = playground("const data = [2, 1];\nconst b = [0];\nb[0] = b;\nlog(b);");

    let session = playground.run();

    assert!(session.outcome.is_success());
    assert!(playground.state().log.contains(&"[[Circular]]".to_string()));
}

#[test]
fn test_deeply_nested_source_is_a_parse_error() {
    let source = format!("log({}1{});", "(".repeat(20_000), ")".repeat(20_000));
    let mut playground = playground(&source);

    let session = playground.run();

    assert!(!session.outcome.is_success());
    let errors = error_lines(&playground);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Error: Parse error at line 1"));
}

#[test]
fn test_unbounded_recursion_hits_call_depth() {
    let mut playground = playground(
        "function f(n){ if (n > 0) { return f(n - 1); } return 0; } log(f(100000));",
    );

    playground.run();

    let errors = error_lines(&playground);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0], "Error: Maximum call depth of 48 exceeded at line 1");
}

#[test]
fn test_recursion_through_deep_expressions_hits_nesting_limit() {
    let expression = format!("{}f(n + 1){}", "0 + (".repeat(40), ")".repeat(40));
    let source = format!("function f(n) {{ return {}; }}\nf(0);", expression);
    let mut playground = playground(&source);

    playground.run();

    let errors = error_lines(&playground);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Error: Maximum nesting depth of 192 exceeded"));
}
