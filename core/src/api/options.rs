//! Configuration options for the Quip engine.

/// Configuration options for parsing.
///
/// These options control which inputs are accepted as commands and how
/// lenient the parser is about type annotations.
///
/// # Example
///
/// ```
/// use quip_core::api::ParseOptions;
///
/// let options = ParseOptions {
///     command_prefix: '!',
///     ..ParseOptions::default()
/// };
/// assert_eq!(options.min_command_length, 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOptions {
    /// Character that starts a command.
    ///
    /// Default: ':'
    pub command_prefix: char,

    /// Commands with shorter names are not parsed at all. This keeps inputs
    /// like `:D` from being treated as commands.
    ///
    /// Default: 1
    pub min_command_length: usize,

    /// Whether `evaluate` insists on the command prefix. When `false`, input
    /// without a prefix is parsed as a bare expression.
    ///
    /// Default: true
    pub require_command: bool,

    /// Whether unknown type names in parameter annotations become type
    /// variables. When `false` they are reported as unknown types.
    ///
    /// Default: true
    pub allow_polymorphic_declarations: bool,

    /// Maximum nesting depth of expressions. Every operator in a chain like
    /// `1+1+1` counts as one level.
    ///
    /// Default: 128
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            command_prefix: ':',
            min_command_length: 1,
            require_command: true,
            allow_polymorphic_declarations: true,
            max_depth: 128,
        }
    }
}

/// Configuration options for expression execution.
///
/// These options control resource limits during evaluation.
///
/// # Example
///
/// ```
/// use quip_core::api::ExecutionOptions;
///
/// let options = ExecutionOptions {
///     max_depth: 500,
///     max_list_size: 1_000,
/// };
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOptions {
    /// Maximum evaluation depth (for recursion protection).
    ///
    /// Default: 200
    pub max_depth: usize,

    /// Maximum number of elements a range may generate.
    ///
    /// Default: 10000
    pub max_list_size: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            max_depth: 200,
            max_list_size: 10_000,
        }
    }
}

/// Configuration options for the Quip engine.
///
/// These options set the defaults for parsing and execution,
/// which can be overridden on a per-call basis.
///
/// # Example
///
/// ```
/// use quip_core::api::{EngineOptions, ExecutionOptions, ParseOptions};
///
/// let options = EngineOptions {
///     default_parse_options: ParseOptions::default(),
///     default_execution_options: ExecutionOptions {
///         max_depth: 500,
///         max_list_size: 1_000,
///     },
/// };
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineOptions {
    /// Default parse options for all evaluations.
    pub default_parse_options: ParseOptions,

    /// Default execution options for all evaluations.
    pub default_execution_options: ExecutionOptions,
}
