use pretty_assertions::assert_eq;

use crate::api::{DiagnosticKind, ParseOptions};
use crate::ast::{DirectiveKind, Expr, ExprKind, Root, TypeAnnotation};
use crate::diagnostics::{DiagnosticSink, ProblemCollector};
use crate::parser::OpType;

use super::{parse, parse_expression};

fn command(input: &str) -> (Option<Root>, ProblemCollector) {
    command_with(input, &ParseOptions::default())
}

fn command_with(input: &str, options: &ParseOptions) -> (Option<Root>, ProblemCollector) {
    let mut sink = ProblemCollector::new();
    let root = parse(input, &mut sink, options);
    (root, sink)
}

fn expression(input: &str) -> (Expr, ProblemCollector) {
    expression_with(input, &ParseOptions::default())
}

fn expression_with(input: &str, options: &ParseOptions) -> (Expr, ProblemCollector) {
    let mut sink = ProblemCollector::new();
    let expr = parse_expression(input, &mut sink, options);
    (expr, sink)
}

fn valid_command(input: &str) -> Root {
    let (root, sink) = command(input);
    assert!(!sink.has_problems(), "{}: {:?}", input, sink.problems());
    root.unwrap_or_else(|| panic!("{} did not parse as a command", input))
}

fn valid_expression(input: &str) -> Expr {
    let (expr, sink) = expression(input);
    assert!(!sink.has_problems(), "{}: {:?}", input, sink.problems());
    expr
}

fn codes(sink: &ProblemCollector) -> Vec<&'static str> {
    sink.problems().iter().filter_map(|p| p.code).collect()
}

// ============================================================================
// Commands
// ============================================================================

#[test]
fn test_command_with_arguments() {
    let root = valid_command(":calc 1+2 x");
    assert_eq!(root.command.name, "calc");
    assert_eq!(root.expressions.len(), 2);
    assert!(matches!(
        root.expressions[0].kind,
        ExprKind::OperatorCall { op: OpType::Add, .. }
    ));
    assert_eq!(root.expressions[1].as_var().map(|id| id.name.as_str()), Some("x"));
    assert_eq!(root.span.0, 0..11);
}

#[test]
fn test_command_without_arguments() {
    let root = valid_command(":help");
    assert_eq!(root.command.name, "help");
    assert!(root.expressions.is_empty());
    assert!(root.directives.is_empty());
}

#[test]
fn test_trailing_whitespace_is_tolerated() {
    let root = valid_command(":calc 1 ");
    assert_eq!(root.expressions.len(), 1);
}

#[test]
fn test_not_a_command() {
    let (root, sink) = command("calc 1");
    assert!(root.is_none());
    assert!(!sink.has_problems());

    assert!(command(":").0.is_none());
    assert!(command(": calc").0.is_none());
    assert!(command(":1").0.is_none());
}

#[test]
fn test_command_name_too_short() {
    let options = ParseOptions {
        min_command_length: 3,
        ..ParseOptions::default()
    };
    let (root, sink) = command_with(":D", &options);
    assert!(root.is_none());
    assert!(!sink.has_problems());
    assert!(command_with(":abc", &options).0.is_some());
}

#[test]
fn test_custom_command_prefix() {
    let options = ParseOptions {
        command_prefix: '!',
        ..ParseOptions::default()
    };
    let (root, _) = command_with("!calc 1", &options);
    assert_eq!(root.map(|r| r.command.name), Some("calc".to_string()));
    assert!(command_with(":calc 1", &options).0.is_none());
}

#[test]
fn test_keyword_as_command_name() {
    let root = valid_command(":list 1");
    assert_eq!(root.command.name, "list");
}

// ============================================================================
// Directives
// ============================================================================

#[test]
fn test_directives() {
    let root = valid_command(":calc 1, delay 10m, reinterpret");
    assert_eq!(root.expressions.len(), 1);
    assert_eq!(root.directives.len(), 2);
    match &root.directives[0].kind {
        DirectiveKind::Delay(amount) => assert_eq!(amount.kind, ExprKind::Timespan(600)),
        other => panic!("expected a delay directive, got {:?}", other),
    }
    assert_eq!(root.directives[1].kind, DirectiveKind::Reinterpret);
}

#[test]
fn test_duplicate_directive() {
    let (root, sink) = command(":calc 1, reinterpret, reinterpret");
    let root = root.unwrap();
    assert_eq!(root.directives.len(), 1);
    assert_eq!(sink.len(), 1);
    assert_eq!(sink.problems()[0].kind, DiagnosticKind::Semantic);
    assert_eq!(sink.problems()[0].message, "duplicate directive 'reinterpret'");
}

#[test]
fn test_unknown_directive() {
    let (root, sink) = command(":calc 1, foo");
    assert!(root.unwrap().directives.is_empty());
    assert_eq!(codes(&sink), vec!["P003"]);
}

// ============================================================================
// Error recovery
// ============================================================================

#[test]
fn test_missing_closing_bracket_is_inserted() {
    let (root, sink) = command(":calc (1+2 3");
    let root = root.unwrap();
    // The missing ')' is reported, and `3` still becomes the next argument
    assert_eq!(root.expressions.len(), 2);
    assert_eq!(codes(&sink), vec!["P001"]);
    assert_eq!(sink.problems()[0].message, "expected ')', found number");
}

#[test]
fn test_multiple_errors_are_all_reported() {
    let (root, sink) = command(":calc {1,,2} (3");
    assert!(root.is_some());
    assert_eq!(codes(&sink), vec!["P002", "P001"]);
}

#[test]
fn test_problem_node_always_has_a_report() {
    let (expr, sink) = expression("1 +");
    match expr.kind {
        ExprKind::OperatorCall { op, operands } => {
            assert_eq!(op, OpType::Add);
            assert!(operands[1].is_problem());
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(sink.len(), 1);
    assert_eq!(sink.problems()[0].kind, DiagnosticKind::Syntax);
}

#[test]
fn test_lexical_error_token() {
    let (_, sink) = expression("1 + _");
    assert_eq!(codes(&sink), vec!["L001"]);
    assert_eq!(sink.problems()[0].kind, DiagnosticKind::Lexical);
}

#[test]
fn test_bare_expression_keeps_skipping_whitespace_after_brackets() {
    let expr = valid_expression("(5 + 2) * 8");
    assert!(matches!(expr.kind, ExprKind::OperatorCall { op: OpType::Mul, .. }));
    valid_expression("{1, 2} + {3} ");
    valid_expression("\\(a: a) (1) + f(2) - x[0] * 3");
}

#[test]
fn test_command_whitespace_separates_after_brackets() {
    let root = valid_command(":calc (1 + 2) {3}");
    assert_eq!(root.expressions.len(), 2);
}

#[test]
fn test_garbage_after_expression() {
    let (_, sink) = expression("1 )");
    assert_eq!(sink.problems()[0].message, "expected end of input, found ')'");
}

#[test]
fn test_max_depth_is_reported_once() {
    let options = ParseOptions {
        max_depth: 5,
        ..ParseOptions::default()
    };
    let (_, sink) = expression_with("((((((((1))))))))", &options);
    assert_eq!(codes(&sink), vec!["P004"]);

    let (_, sink) = expression_with("--------1", &options);
    assert_eq!(codes(&sink), vec!["P004"]);
}

#[test]
fn test_operator_chain_counts_towards_depth() {
    let source = vec!["1"; 100].join("+");
    let (_, sink) = expression(&source);
    assert!(!sink.has_problems());

    for operator in ["+", "*", "&&", "<", "^"] {
        let source = vec!["1"; 2000].join(operator);
        let (_, sink) = expression(&source);
        assert_eq!(codes(&sink), vec!["P004"], "operator {}", operator);
    }
}

#[test]
fn test_suffix_chain_counts_towards_depth() {
    let options = ParseOptions {
        max_depth: 5,
        ..ParseOptions::default()
    };
    let (_, sink) = expression_with("x[0][0][0][0][0][0][0]", &options);
    assert_eq!(codes(&sink), vec!["P004"]);

    let (_, sink) = expression_with("f(1)(2)(3)(4)(5)(6)(7)", &options);
    assert_eq!(codes(&sink), vec!["P004"]);
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_untyped_lambda_parameters() {
    let expr = valid_expression("\\(a b: a + b)");
    let ExprKind::Function { params, .. } = expr.kind else {
        panic!("expected a function");
    };
    let names: Vec<_> = params.iter().map(|p| p.name.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert!(params.iter().all(|p| p.annotation.is_none()));
}

#[test]
fn test_typed_lambda_parameters() {
    let expr = valid_expression("\\(num a, b: a)");
    let ExprKind::Function { params, .. } = expr.kind else {
        panic!("expected a function");
    };
    assert_eq!(params.len(), 2);
    assert_eq!(params[0].annotation, Some(TypeAnnotation::Named("num".to_string())));
    assert_eq!(params[0].name.name, "a");
    assert_eq!(params[1].annotation, None);
}

#[test]
fn test_nested_list_type() {
    let expr = valid_expression("\\(list<list<num>> xs: xs)");
    let ExprKind::Function { params, .. } = expr.kind else {
        panic!("expected a function");
    };
    let num = TypeAnnotation::Named("num".to_string());
    assert_eq!(
        params[0].annotation,
        Some(TypeAnnotation::List(Box::new(TypeAnnotation::List(Box::new(num)))))
    );
}

#[test]
fn test_function_type_parameter() {
    let expr = valid_expression("\\((num num -> string) f, ? x: f(x, x))");
    let ExprKind::Function { params, .. } = expr.kind else {
        panic!("expected a function");
    };
    let named = |n: &str| TypeAnnotation::Named(n.to_string());
    assert_eq!(
        params[0].annotation,
        Some(TypeAnnotation::Function(
            vec![named("num"), named("num")],
            Box::new(named("string"))
        ))
    );
    assert_eq!(params[1].annotation, Some(TypeAnnotation::Any));
}

#[test]
fn test_parameterless_lambda() {
    let expr = valid_expression("\\(: 42)");
    assert!(matches!(expr.kind, ExprKind::Function { ref params, .. } if params.is_empty()));
}

#[test]
fn test_assignment_modifiers() {
    let root = valid_command(":calc 1->public x 2->temp y");
    assert_eq!(root.expressions.len(), 2);
    match &root.expressions[0].kind {
        ExprKind::Assignment { name, public, temp, .. } => {
            assert_eq!(name.name, "x");
            assert!(*public);
            assert!(!*temp);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(
        root.expressions[1].kind,
        ExprKind::Assignment { temp: true, public: false, .. }
    ));
}

#[test]
fn test_escaped_identifier() {
    let expr = valid_expression("\\if(1)");
    let ExprKind::Call { callee, .. } = expr.kind else {
        panic!("expected a call");
    };
    let id = callee.as_var().unwrap();
    assert_eq!(id.name, "if");
    assert!(id.escaped);
}

#[test]
fn test_delete_targets() {
    let expr = valid_expression("del a, public b");
    let ExprKind::Delete(targets) = expr.kind else {
        panic!("expected del");
    };
    assert_eq!(targets.len(), 2);
    assert_eq!((targets[0].name.name.as_str(), targets[0].public), ("a", false));
    assert_eq!((targets[1].name.name.as_str(), targets[1].public), ("b", true));
}

#[test]
fn test_inspect_targets() {
    let expr = valid_expression("inspect me.x");
    let ExprKind::Inspect(target) = expr.kind else {
        panic!("expected inspect");
    };
    assert_eq!(target.namespace.map(|n| n.name), Some("me".to_string()));
    assert_eq!(target.name.name, "x");

    let root = valid_command(":calc inspect public y");
    assert!(matches!(
        &root.expressions[0].kind,
        ExprKind::Inspect(t) if t.public && t.name.name == "y"
    ));
}

#[test]
fn test_range_with_step() {
    let expr = valid_expression("1..10$2");
    let ExprKind::OperatorCall { op, operands } = expr.kind else {
        panic!("expected a range");
    };
    assert_eq!(op, OpType::DotDot);
    assert_eq!(operands[2].kind, ExprKind::Number(2.0));

    let expr = valid_expression("1..5");
    let ExprKind::OperatorCall { operands, .. } = expr.kind else {
        panic!("expected a range");
    };
    assert_eq!(operands[2].kind, ExprKind::Number(1.0));
}

#[test]
fn test_help_marker_and_postfix_size() {
    assert_eq!(valid_expression("?").kind, ExprKind::Help);
    assert!(matches!(
        valid_expression("x?!").kind,
        ExprKind::OperatorCall { op: OpType::IsEmpty, .. }
    ));
}

#[test]
fn test_radix_conversion() {
    let expr = valid_expression("0x16:255");
    let ExprKind::OperatorCall { op, operands } = expr.kind else {
        panic!("expected radix");
    };
    assert_eq!(op, OpType::Radix);
    assert_eq!(operands[0].kind, ExprKind::Number(16.0));
    assert_eq!(operands[1].kind, ExprKind::Number(255.0));
}

#[test]
fn test_whitespace_inside_brackets_is_insignificant() {
    let root = valid_command(":calc {1, 2, 3}[ 1 ] (4 + 5)");
    assert_eq!(root.expressions.len(), 2);
}

#[test]
fn test_bare_expression_ignores_whitespace() {
    let expr = valid_expression("5 + 2 * 8");
    assert!(matches!(expr.kind, ExprKind::OperatorCall { op: OpType::Add, .. }));
}
