#![allow(dead_code)]

use once_cell::sync::Lazy;
use quip::{Diagnostic, Engine, EngineOptions, EvaluationResult};

/// Commands that evaluate successfully on a fresh engine.
pub static COMMANDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        ":calc 5+2*8",
        ":calc {1, 2, 3}[1]",
        ":calc 1..5",
        ":calc 10..1$-3",
        ":calc 3(1+2)",
        ":calc 2^3^2",
        ":calc (7 \\ 2)",
        ":calc \"ab\"+\"cd\"",
        ":calc !\"stressed\"",
        ":calc 1h+30m",
        ":calc 24.12.2012+1d",
        ":calc 0x16:255",
        ":calc if 3>2 : \"big\" : \"small\"",
        ":calc \\(a b: a + b)(3, 4)",
        ":calc \\(num x: \\(num y: x * y))(6)(7)",
        ":calc len(1..10) sqrt(16) max(3, 9)",
        ":calc upper(\"quip\") contains({1, 2}, 2)",
        ":calc (true && !false || false)",
        ":calc 1<<4",
        ":calc str(0.25)",
        ":calc 1, delay 10m",
    ]
});

/// One evaluated input, after its setup commands ran on the same engine.
pub struct Case {
    pub input: &'static str,
    pub engine: Engine,
    pub result: EvaluationResult,
}

pub fn engine() -> Engine {
    Engine::new(EngineOptions::default(), |_| Ok(())).expect("natives register")
}

pub fn evaluate(engine: &Engine, input: &str) -> EvaluationResult {
    engine
        .evaluate(input, "utf-8", "root", "me")
        .unwrap_or_else(|e| panic!("{}: {}", input, e))
}

/// `E011: unknown function 'foo'`
pub fn describe(diagnostic: &Diagnostic) -> String {
    format!(
        "{}: {}",
        diagnostic.code.as_deref().unwrap_or("-"),
        diagnostic.message
    )
}

/// Values in debug form separated by spaces, or the diagnostics.
pub fn output(result: &EvaluationResult) -> Result<String, Vec<String>> {
    match result {
        EvaluationResult::Success(evaluation) => Ok(evaluation
            .values
            .iter()
            .map(|v| format!("{:?}", v))
            .collect::<Vec<_>>()
            .join(" ")),
        EvaluationResult::ParseFailed => Err(vec!["not a command".to_string()]),
        EvaluationResult::Diagnostics(diagnostics) => {
            Err(diagnostics.iter().map(describe).collect())
        }
    }
}

pub fn owned(expected: Result<&str, Vec<&str>>) -> Result<String, Vec<String>> {
    expected
        .map(str::to_string)
        .map_err(|errors| errors.into_iter().map(str::to_string).collect())
}

impl Case {
    pub fn run(setup: &[&str], input: &'static str) -> Case {
        let engine = engine();
        for command in setup {
            let result = evaluate(&engine, command);
            assert!(
                result.is_success(),
                "setup {:?} failed: {:?}",
                command,
                output(&result)
            );
        }
        let result = evaluate(&engine, input);
        Case {
            input,
            engine,
            result,
        }
    }

    pub fn output(&self) -> Result<String, Vec<String>> {
        output(&self.result)
    }

    pub fn unparsed(&self) -> Option<&str> {
        self.result.success().map(|e| e.unparsed.as_str())
    }

    /// Declarations made by the input, as `name: type`.
    pub fn declared(&self) -> Vec<String> {
        self.result
            .success()
            .map(|e| {
                e.side_effects
                    .iter()
                    .map(|d| format!("{}: {}", d.name, d.ty))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[macro_export]
macro_rules! test_case {
    (@check $case:ident, output, $expected:expr) => {
        pretty_assertions::assert_eq!(
            $case.output(),
            $crate::cases::owned($expected),
            "input: {}",
            $case.input
        );
    };
    (@check $case:ident, unparsed, $expected:expr) => {
        pretty_assertions::assert_eq!($case.unparsed(), Some($expected), "input: {}", $case.input);
    };
    (@check $case:ident, declared, $expected:expr) => {
        pretty_assertions::assert_eq!(
            $case.declared(),
            $expected.iter().map(|s: &&str| s.to_string()).collect::<Vec<String>>(),
            "input: {}",
            $case.input
        );
    };
    (
        $name:ident,
        $(setup: [$($setup:expr),* $(,)?],)?
        input: $input:expr,
        $($field:ident: $expected:expr),* $(,)?
    ) => {
        #[test]
        fn $name() {
            let case = $crate::cases::Case::run(&[$($($setup),*)?], $input);
            $($crate::test_case!(@check case, $field, $expected);)*
        }
    };
}
