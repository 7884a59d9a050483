//! Properties that hold for every command, checked over a shared corpus.

mod cases;

use pretty_assertions::assert_eq;
use quip::{EvaluationResult, ExecutionOptions, ParseOptions, Type, Value, unparse};
use quip_core::ast::Root;
use quip_core::diagnostics::{DiagnosticSink, ProblemCollector};
use quip_core::evaluator::Evaluator;
use quip_core::namespace::NamespaceRegistry;
use quip_core::natives::register_all;
use quip_core::parser::parse;
use quip_core::resolver::Resolver;
use quip_core::types::Primitive;

use cases::COMMANDS;

fn parse_command(input: &str) -> Root {
    let mut sink = ProblemCollector::new();
    let root = parse(input, &mut sink, &ParseOptions::default());
    assert!(!sink.has_problems(), "{}: {:?}", input, sink.problems());
    root.unwrap_or_else(|| panic!("{} is not a command", input))
}

/// Whether a runtime value inhabits a resolved type.
fn fits(value: &Value, ty: &Type) -> bool {
    match (value, ty) {
        (_, Type::Var(_)) => true,
        (Value::Number(_), Type::Primitive(Primitive::Num))
        | (Value::String(_), Type::Primitive(Primitive::String))
        | (Value::Bool(_), Type::Primitive(Primitive::Bool))
        | (Value::Date(_), Type::Primitive(Primitive::Date))
        | (Value::Timespan(_), Type::Primitive(Primitive::Timespan))
        | (Value::Channel(_), Type::Primitive(Primitive::Channel))
        | (Value::User(_), Type::Primitive(Primitive::User))
        | (Value::Help, Type::Primitive(Primitive::Help))
        | (Value::Function(_), Type::Map { .. }) => true,
        (Value::List(items), Type::List(element)) => items.iter().all(|v| fits(v, element)),
        _ => false,
    }
}

#[test]
fn test_corpus_evaluates() {
    let engine = cases::engine();
    for input in COMMANDS.iter() {
        let result = cases::evaluate(&engine, input);
        assert!(result.is_success(), "{}: {:?}", input, cases::output(&result));
    }
}

#[test]
fn test_unparse_round_trip() {
    for input in COMMANDS.iter() {
        let first = parse_command(input);
        let text = unparse(&first);
        let second = parse_command(&text);
        assert_eq!(first.expressions, second.expressions, "unparsed: {}", text);
        assert_eq!(first.directives, second.directives, "unparsed: {}", text);
    }
}

#[test]
fn test_unparsed_command_evaluates_the_same() {
    let engine = cases::engine();
    for input in COMMANDS.iter() {
        let result = cases::evaluate(&engine, input);
        let unparsed = result
            .success()
            .map(|e| e.unparsed.clone())
            .unwrap_or_else(|| panic!("{} failed", input));
        let again = cases::evaluate(&engine, &unparsed);
        assert_eq!(cases::output(&result), cases::output(&again), "input: {}", input);
    }
}

#[test]
fn test_evaluation_is_deterministic() {
    for input in COMMANDS.iter() {
        let first = cases::evaluate(&cases::engine(), input);
        let second = cases::evaluate(&cases::engine(), input);
        assert_eq!(cases::output(&first), cases::output(&second), "input: {}", input);
    }
}

#[test]
fn test_diagnostics_are_deterministic() {
    let inputs = [":calc foo(1) bar", ":calc 1+\"a\"", ":calc {1,2,3}[9]", ":calc (1+"];
    for input in inputs {
        let first = cases::evaluate(&cases::engine(), input);
        let second = cases::evaluate(&cases::engine(), input);
        assert!(!first.diagnostics().is_empty(), "input: {}", input);
        assert_eq!(first.diagnostics(), second.diagnostics(), "input: {}", input);
    }
}

#[test]
fn test_values_inhabit_resolved_types() {
    let registry = NamespaceRegistry::new();
    register_all(&registry).unwrap();
    let root = registry.namespace("root");
    let working = registry.namespace("me");
    let parse_options = ParseOptions::default();
    let execution_options = ExecutionOptions::default();

    for input in COMMANDS.iter() {
        let command = parse_command(input);
        let mut sink = ProblemCollector::new();
        let typed: Vec<_> = {
            let mut resolver = Resolver::new(
                &registry,
                root.clone(),
                working.clone(),
                &parse_options,
                &mut sink,
            );
            command
                .expressions
                .iter()
                .map(|e| resolver.resolve(e).unwrap_or_else(|| panic!("{}", input)))
                .collect()
        };
        assert!(sink.is_empty(), "{}: {:?}", input, sink.problems());

        let mut evaluator =
            Evaluator::new(&registry, root.clone(), working.clone(), &execution_options);
        for expr in &typed {
            assert!(!expr.ty.has_vars() || expr.ty.is_map(), "{}: {}", input, expr.ty);
            let value = evaluator.eval(expr).unwrap();
            assert!(fits(&value, &expr.ty), "{}: {:?} is not a {}", input, value, expr.ty);
        }
    }
}

#[test]
fn test_new_overload_leaves_existing_calls_alone() {
    let engine = cases::engine();
    assert!(cases::evaluate(&engine, ":calc \\(num x: x * 2)->f").is_success());
    let before = cases::evaluate(&engine, ":calc f(3)");

    assert!(cases::evaluate(&engine, ":calc \\(string s: s + s)->f").is_success());
    let after = cases::evaluate(&engine, ":calc f(3)");
    assert_eq!(cases::output(&before), Ok("6".to_string()));
    assert_eq!(cases::output(&before), cases::output(&after));
    assert_eq!(cases::output(&cases::evaluate(&engine, ":calc f(\"ab\")")), Ok("\"abab\"".to_string()));
    assert_eq!(engine.registry().namespace("me").lookup("f").len(), 2);
}

#[test]
fn test_overload_in_another_namespace_is_independent() {
    let engine = cases::engine();
    assert!(cases::evaluate(&engine, ":calc 1->public n").is_success());
    assert!(cases::evaluate(&engine, ":calc \"one\"->n").is_success());
    assert_eq!(cases::output(&cases::evaluate(&engine, ":calc n+1")), Ok("2".to_string()));
    assert_eq!(
        cases::output(&cases::evaluate(&engine, ":calc upper(n)")),
        Ok("\"ONE\"".to_string())
    );
}

#[test]
fn test_call_discards_its_scope() {
    let engine = cases::engine();
    assert!(cases::evaluate(&engine, ":calc \\(num secret: secret * 2)->double").is_success());
    assert_eq!(cases::output(&cases::evaluate(&engine, ":calc double(4)")), Ok("8".to_string()));
    assert_eq!(
        cases::output(&cases::evaluate(&engine, ":calc secret")),
        Err(vec!["E010: unknown variable 'secret'".to_string()])
    );
    for name in ["root", "me"] {
        assert!(!engine.registry().namespace(name).contains("secret"));
    }
}

#[test]
fn test_runtime_error_discards_its_scope() {
    let engine = cases::engine();
    assert!(cases::evaluate(&engine, ":calc \\(num i: {1, 2}[i])->pick").is_success());
    let result = cases::evaluate(&engine, ":calc pick(7)");
    assert!(matches!(result, EvaluationResult::Diagnostics(_)));
    assert_eq!(cases::output(&cases::evaluate(&engine, ":calc pick(1)")), Ok("2".to_string()));
    assert!(!engine.registry().namespace("me").contains("i"));
}

#[test]
fn test_polymorphic_uses_are_independent() {
    let engine = cases::engine();
    assert!(cases::evaluate(&engine, ":calc \\(a: a)->id").is_success());
    let result = cases::evaluate(&engine, ":calc {str(id(1)), id(\"a\")}");
    assert_eq!(cases::output(&result), Ok("{\"1\", \"a\"}".to_string()));
}

#[test]
fn test_nested_calls_discard_their_scopes() {
    let engine = cases::engine();
    for line in [":calc \\(num n: n+1)->inc", ":calc \\(num n: inc(inc(n)))->inc2"] {
        assert!(cases::evaluate(&engine, line).is_success(), "{}", line);
    }
    assert_eq!(cases::output(&cases::evaluate(&engine, ":calc inc2(1)")), Ok("3".to_string()));
    assert_eq!(
        cases::output(&cases::evaluate(&engine, ":calc n")),
        Err(vec!["E010: unknown variable 'n'".to_string()])
    );
}
