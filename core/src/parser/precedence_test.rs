use crate::api::ParseOptions;
use crate::ast::Expr;
use crate::diagnostics::{DiagnosticSink, ProblemCollector};

use super::parse_expression;

// Helper function to parse an expression and return the AST.
//
// We test precedence by comparing whether two expressions parenthesized in
// different ways yield the same AST. Equality looks through the `Braced`
// nodes that parentheses leave in the tree.
fn ast(source: &str) -> Expr {
    let mut sink = ProblemCollector::new();
    let expr = parse_expression(source, &mut sink, &ParseOptions::default());
    assert!(
        !sink.has_problems(),
        "Expression parsing failed: {}\n{:?}",
        source,
        sink.problems()
    );
    expr
}

#[test]
fn test_addition_vs_subtraction() {
    assert_eq!(ast("a + b - c"), ast("(a + b) - c"));
    assert_eq!(ast("a - b + c"), ast("(a - b) + c"));
    assert_eq!(
        ast("a + b - c + d - e + f"),
        ast("((((a + b) - c) + d) - e) + f")
    );
}

#[test]
fn test_multiplication_vs_division() {
    assert_eq!(ast("a * b / c"), ast("(a * b) / c"));
    assert_eq!(ast("a / b * c"), ast("(a / b) * c"));
    assert_eq!(ast("a * b % c \\ d"), ast("((a * b) % c) \\ d"));
}

#[test]
fn test_addition_vs_multiplication() {
    assert_eq!(ast("a + b * c"), ast("a + (b * c)"));
    assert_eq!(ast("a * b + c"), ast("(a * b) + c"));
    assert_eq!(ast("5 + 2 * 8"), ast("5 + (2 * 8)"));
}

#[test]
fn test_and_vs_or() {
    assert_eq!(ast("true && false || true"), ast("(true && false) || true"));
    assert_eq!(ast("true || false && true"), ast("true || (false && true)"));
    assert_eq!(ast("a || b ^^ c"), ast("a || (b ^^ c)"));
    assert_eq!(ast("a xor b && c"), ast("(a xor b) && c"));
}

#[test]
fn test_relation_vs_logic() {
    assert_eq!(ast("a < b || c"), ast("a < (b || c)"));
    assert_eq!(ast("a == b + 1"), ast("a == (b + 1)"));
}

#[test]
fn test_bitwise_vs_arithmetic() {
    assert_eq!(ast("a & b * c"), ast("a & (b * c)"));
    assert_eq!(ast("a << b + c"), ast("(a << b) + c"));
}

#[test]
fn test_unary_vs_binary() {
    assert_eq!(ast("--a"), ast("-(-a)"));
    assert_eq!(ast("-a + b"), ast("(-a) + b"));
    assert_eq!(ast("a + -b"), ast("a + (-b)"));
    assert_eq!(ast("!a && b"), ast("(!a) && b"));
}

#[test]
fn test_exponentiation() {
    assert_eq!(ast("a ^ b ^ c"), ast("a ^ (b ^ c)"));
    assert_eq!(ast("a ^ b ^ c ^ d"), ast("a ^ (b ^ (c ^ d))"));
}

#[test]
fn test_exponentiation_vs_multiplication() {
    assert_eq!(ast("a * b ^ c"), ast("a * (b ^ c)"));
    assert_eq!(ast("a ^ b * c"), ast("(a ^ b) * c"));
}

#[test]
fn test_exponentiation_vs_negation() {
    // Unary operators bind tighter than the power operator.
    assert_eq!(ast("-a ^ b"), ast("(-a) ^ b"));
    assert_eq!(ast("a ^ -b"), ast("a ^ (-b)"));
}

#[test]
fn test_range_vs_binary() {
    assert_eq!(ast("1..n + 1"), ast("(1..n) + 1"));
    assert_eq!(ast("-1..5"), ast("(-1)..5"));
}

#[test]
fn test_autolist_vs_index() {
    assert_eq!(ast("a; b; c[1]"), ast("(a; b; c)[1]"));
}

#[test]
fn test_postfix_vs_binary() {
    assert_eq!(ast("a? + 1"), ast("(a?) + 1"));
    assert_eq!(ast("a + arr[0]"), ast("a + (arr[0])"));
    assert_eq!(ast("arr[0] + a"), ast("(arr[0]) + a"));
}

#[test]
fn test_function_call_vs_binary() {
    assert_eq!(ast("a + foo(1, 2)"), ast("a + (foo(1, 2))"));
    assert_eq!(ast("foo(1, 2) + a"), ast("(foo(1, 2)) + a"));
    assert_eq!(ast("-foo(1)"), ast("-(foo(1))"));
}

#[test]
fn test_namespace_access_vs_binary() {
    assert_eq!(ast("a + me.x"), ast("a + (me.x)"));
    assert_eq!(ast("me.f(1)"), ast("(me.f)(1)"));
}

#[test]
fn test_implicit_multiplication() {
    assert_eq!(ast("2x"), ast("2 * x"));
    assert_eq!(ast("3(1 + 2)"), ast("3 * (1 + 2)"));
    assert_eq!(ast("2x ^ 2"), ast("2 * (x ^ 2)"));
}

#[test]
fn test_lambda_body_extends_to_closing_brace() {
    assert_eq!(ast("\\(a: a + b)"), ast("\\(a: (a + b))"));
    assert_eq!(ast("\\(a: a[0])"), ast("\\(a: (a[0]))"));
}

#[test]
fn test_assignment_is_loosest() {
    assert_eq!(ast("1 + 2 -> x"), ast("(1 + 2) -> x"));
}

#[test]
fn test_if_branches() {
    assert_eq!(
        ast("if a : b + 1 : c * 2"),
        ast("if (a) : (b + 1) : (c * 2)")
    );
}
