mod cases;

/*
 * Problems found before anything runs. Every command here is rejected as a
 * whole, with one diagnostic per problem.
 */

use pretty_assertions::assert_eq;
use quip::{DiagnosticKind, render_diagnostics_to_string};

test_case!(
    operator_mismatch,
    input: ":calc 1+\"hello\"",
    output: Err(vec!["E021: operator '+' cannot be applied to (num, string)"]),
);

test_case!(
    call_mismatch,
    input: ":calc sqrt(\"nine\")",
    output: Err(vec!["E021: 'sqrt' cannot be called with (string)"]),
);

test_case!(
    unknown_variable,
    input: ":calc x+1",
    output: Err(vec!["E010: unknown variable 'x'"]),
);

test_case!(
    every_problem_is_reported,
    input: ":calc foo(1) bar",
    output: Err(vec!["E011: unknown function 'foo'", "E010: unknown variable 'bar'"]),
);

test_case!(
    mixed_list,
    input: ":calc {1, \"two\"}",
    output: Err(vec!["E033: list elements have incompatible types"]),
);

test_case!(
    duplicate_parameter,
    input: ":calc \\(a a: a)",
    output: Err(vec!["E041: duplicate parameter 'a'"]),
);

test_case!(
    calling_a_number,
    input: ":calc (5)(1)",
    output: Err(vec!["E020: expression of type num is not a function"]),
);

#[test]
fn test_diagnostic_kinds() {
    let engine = cases::engine();
    let kind = |input: &str| -> Option<DiagnosticKind> {
        cases::evaluate(&engine, input).diagnostics().first().map(|d| d.kind)
    };
    assert_eq!(kind(":calc \"open"), Some(DiagnosticKind::Lexical));
    assert_eq!(kind(":calc (1+2"), Some(DiagnosticKind::Syntax));
    assert_eq!(kind(":calc foo(1)"), Some(DiagnosticKind::Semantic));
    assert_eq!(kind(":calc 1/0"), Some(DiagnosticKind::Runtime));
}

#[test]
fn test_rendered_diagnostic_shows_source() {
    let engine = cases::engine();
    let input = ":calc 1+\"hello\"";
    let diagnostics = cases::evaluate(&engine, input).diagnostics().to_vec();
    let rendered = render_diagnostics_to_string(input, &diagnostics, false);
    assert!(rendered.contains("E021"), "{}", rendered);
    assert!(rendered.contains(input), "{}", rendered);
}
