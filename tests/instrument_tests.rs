// Integration tests for loop instrumentation

use algoviz::instrument::{find_counted_loops, instrument, instrument_with_pause};

const NESTED: &str = "const a = [1, 2];
const b = [3];
for (let i = 0; i < a.length; i++) {
  for (let j = 0; j < b.length; j++) {
    log(a[i] + b[j]);
  }
}";

#[test]
fn test_instrumenting_twice_changes_nothing() {
    let once = instrument(NESTED);
    let twice = instrument(&once.text);

    assert_eq!(once.loops.len(), 1);
    assert!(twice.is_unchanged());
    assert_eq!(twice.text, once.text);
}

#[test]
fn test_nested_loop_is_covered_by_outer_match() {
    let result = instrument(NESTED);

    assert_eq!(result.loops[0].iter_var, "i");
    assert_eq!(result.loops[0].array_name, "a");
    assert_eq!(result.loops[0].line, 3);
    assert_eq!(result.text.matches("highlightElement").count(), 1);
    assert!(result
        .text
        .contains("  for (let j = 0; j < b.length; j++) {\n    log(a[i] + b[j]);\n  }"));
    assert!(result.text.ends_with("await updateArrayData(a); }"));
}

#[test]
fn test_sequential_loops_are_all_rewritten() {
    let text = "for (let i = 0; i < a.length; i++) { x(); }\nfor (let k = 0; k < b.length; k++) { y(); }";
    let result = instrument_with_pause(text, 10);

    assert_eq!(result.loops.len(), 2);
    assert_eq!(result.loops[1].line, 2);
    assert_eq!(result.text.matches("await delay(10);").count(), 2);
    assert!(result.text.contains("await highlightElement(k);"));
    assert!(result.text.contains("await updateArrayData(b);"));
}

#[test]
fn test_text_without_counted_loops_passes_through() {
    for text in [
        "",
        "const a = [1, 2, 3];",
        "while (x < 3) { x++; }",
        "const s = 'for (let i = 0; i < a.length; i++) {}';",
        "/* for (let i = 0; i < a.length; i++) { } */",
    ] {
        let result = instrument(text);
        assert!(result.is_unchanged(), "{}", text);
        assert_eq!(result.text, text);
    }
}

#[test]
fn test_line_numbers_survive_rewrite() {
    let text = "const a = [1];\nfor (let i = 0; i < a.length; i++)\n{\n  a[i] = 2;\n}\nlog('done');";
    let result = instrument(text);

    assert_eq!(find_counted_loops(text).len(), 1);
    assert_eq!(result.text.lines().count(), text.lines().count());
    assert_eq!(result.text.lines().nth(3), Some("  a[i] = 2;"));
    assert_eq!(result.text.lines().last(), Some("log('done');"));
}
