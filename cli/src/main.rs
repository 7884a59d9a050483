mod highlighter;
mod lexer;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use quip::{Engine, EngineOptions, EvaluationResult, ParseOptions, render_diagnostics};
use quip_core::diagnostics::ProblemCollector;
use quip_core::parser;
use quip_core::resolver::Resolver;
use reedline::{
    DefaultCompleter, DefaultPrompt, DefaultPromptSegment, DescriptionMode, EditCommand, Emacs,
    FileBackedHistory, IdeMenu, KeyCode, KeyModifiers, Keybindings, MenuBuilder, Reedline,
    ReedlineEvent, ReedlineMenu, Signal, ValidationResult, Validator, default_emacs_keybindings,
};
use std::io::BufRead;
use std::io::BufReader;
use tracing::debug;

/// Quip - an expression language for chat-bot commands
#[derive(Parser, Debug)]
#[command(name = "quip")]
#[command(about = "Evaluate Quip commands and expressions", long_about = None)]
struct Args {
    /// Working namespace for private assignments
    #[arg(long, default_value = "me")]
    namespace: String,

    /// Root namespace for public assignments
    #[arg(long, default_value = "root")]
    root: String,

    /// Print the parsed AST (for debugging)
    #[arg(long)]
    debug_parse: bool,

    /// Print the typed expressions (for debugging)
    #[arg(long)]
    debug_types: bool,

    /// Print the normalized source of each evaluated command
    #[arg(long)]
    unparse: bool,

    /// Log pipeline stages to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Commands or bare expressions to evaluate (if not provided, reads from stdin)
    expressions: Vec<String>,
}

struct BracketValidator;

impl Validator for BracketValidator {
    fn validate(&self, line: &str) -> ValidationResult {
        match lexer::calculate_depth(line) {
            Some(depth) if depth > 0 => ValidationResult::Incomplete,
            _ => ValidationResult::Complete,
        }
    }
}

fn add_menu_keybindings(keybindings: &mut Keybindings) {
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu("completion_menu".to_string()),
            ReedlineEvent::MenuNext,
        ]),
    );
    keybindings.add_binding(
        KeyModifiers::ALT,
        KeyCode::Enter,
        ReedlineEvent::Edit(vec![EditCommand::InsertNewline]),
    );
}

fn setup_reedline(engine: &Engine) -> Result<(Reedline, DefaultPrompt)> {
    let mut commands: Vec<String> = [
        "if", "xor", "public", "temp", "del", "inspect", "list", "delay", "reinterpret", "now",
        "true", "false",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    commands.extend(
        engine
            .registry()
            .natives()
            .names()
            .into_iter()
            .filter(|name| name.chars().all(|c| c.is_alphanumeric() || c == '_')),
    );

    let completer = Box::new({
        let mut completions = DefaultCompleter::with_inclusions(&['_']);
        completions.insert(commands);
        completions
    });

    // Use the interactive menu to select options from the completer
    let ide_menu = IdeMenu::default()
        .with_name("completion_menu")
        .with_min_completion_width(0)
        .with_max_completion_width(50)
        .with_max_completion_height(u16::MAX)
        .with_padding(0)
        .with_cursor_offset(0)
        .with_description_mode(DescriptionMode::PreferRight)
        .with_min_description_width(0)
        .with_max_description_width(50)
        .with_description_offset(1)
        .with_correct_cursor_pos(false);

    let completion_menu = Box::new(ide_menu);

    let mut keybindings = default_emacs_keybindings();
    add_menu_keybindings(&mut keybindings);

    let edit_mode = Box::new(Emacs::new(keybindings));

    let mut line_editor = Reedline::create()
        .with_highlighter(Box::new(highlighter::Highlighter))
        .with_validator(Box::new(BracketValidator))
        .with_completer(completer)
        .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
        .with_edit_mode(edit_mode);

    if let Some(dir) = dirs::data_dir() {
        let path = dir.join("quip").join("history.txt");
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).into_diagnostic()?;
        }
        let history = FileBackedHistory::with_file(1000, path).into_diagnostic()?;
        line_editor = line_editor.with_history(Box::new(history));
    }

    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic("quip".to_string()),
        DefaultPromptSegment::Empty,
    );

    Ok((line_editor, prompt))
}

fn debug_input(engine: &Engine, input: &str, args: &Args, options: &ParseOptions) {
    let mut sink = ProblemCollector::new();
    let expressions = match parser::parse(input, &mut sink, options) {
        Some(root) => {
            if args.debug_parse {
                println!("=== Parsed AST ===");
                println!("{:#?}", root);
                println!();
            }
            root.expressions
        }
        None => {
            let expr = parser::parse_expression(input, &mut sink, options);
            if args.debug_parse {
                println!("=== Parsed AST ===");
                println!("{:#?}", expr);
                println!();
            }
            vec![expr]
        }
    };

    if args.debug_types && sink.is_empty() {
        let registry = engine.registry();
        let mut resolver = Resolver::new(
            registry,
            registry.namespace(&args.root),
            registry.namespace(&args.namespace),
            options,
            &mut sink,
        );
        println!("=== Typed Expressions ===");
        for expr in &expressions {
            if let Some(typed) = resolver.resolve(expr) {
                println!("{} : {}", typed, typed.ty);
            }
        }
        println!();
    }
}

fn interpret_input(engine: &Engine, input: &str, args: &Args) -> Result<()> {
    let options = ParseOptions {
        require_command: false,
        ..engine.options().default_parse_options.clone()
    };
    debug!(input, root = %args.root, namespace = %args.namespace, "evaluating");
    if args.debug_parse || args.debug_types {
        debug_input(engine, input, args, &options);
    }

    let result = engine.evaluate_with_options(
        input,
        &args.root,
        &args.namespace,
        &options,
        &engine.options().default_execution_options,
    );
    match result {
        EvaluationResult::Success(evaluation) => {
            if args.unparse {
                println!("{}", evaluation.unparsed);
            }
            for value in &evaluation.values {
                // Debug quotes strings, like the literal syntax
                println!("{:?}", value);
            }
            for declaration in &evaluation.side_effects {
                println!("declared {}", declaration);
            }
            if let Some(seconds) = evaluation.delay() {
                println!("(delayed by {}s)", seconds);
            }
        }
        EvaluationResult::ParseFailed => {
            eprintln!("not a command: {}", input);
        }
        EvaluationResult::Diagnostics(diagnostics) => {
            render_diagnostics(input, &diagnostics, &mut std::io::stderr(), true).into_diagnostic()?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging subscriber
    use tracing_subscriber::{EnvFilter, fmt};

    // Use QUIP_LOG or RUST_LOG to control the log level. Default to WARN,
    // or DEBUG with --verbose.
    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("QUIP_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| EnvFilter::try_new(default_level))
        .into_diagnostic()?;

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let engine = Engine::new(EngineOptions::default(), |_| Ok(())).into_diagnostic()?;

    // Evaluate the arguments in order, sharing the namespaces
    if !args.expressions.is_empty() {
        for input in &args.expressions {
            interpret_input(&engine, input, &args)?;
        }
        return Ok(());
    }

    // Otherwise, check if we're in interactive or pipe mode
    let is_interactive = atty::is(atty::Stream::Stdin);

    if is_interactive {
        // Interactive REPL mode
        let (mut line_editor, prompt) = setup_reedline(&engine)?;

        println!("Quip REPL - Type commands or expressions (Ctrl+D or Ctrl+C to exit)");

        loop {
            let sig = match line_editor.read_line(&prompt) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Reedline error: {e}");
                    return Ok(());
                }
            };

            match sig {
                Signal::Success(buffer) => {
                    interpret_input(&engine, buffer.as_ref(), &args)?;
                }
                Signal::CtrlD | Signal::CtrlC => {
                    println!("\nGoodbye!");
                    return Ok(());
                }
            }
        }
    } else {
        // Pipe/stdin mode
        let stdin = std::io::stdin();
        let reader = BufReader::new(stdin.lock());

        for line in reader.lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    eprintln!("Error reading line from stdin: {}", e);
                    return Ok(());
                }
            };

            interpret_input(&engine, &line, &args)?;
        }
    }

    Ok(())
}
