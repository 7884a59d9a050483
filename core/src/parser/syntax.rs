// Syntax structures shared by the scanner, the AST and the typed tree.

use core::fmt;
use core::ops::Range;

/// A range of character offsets into the source text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Span(pub Range<usize>);

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self(start..end)
    }
    pub fn at(offset: usize) -> Self {
        Self(offset..offset)
    }
    pub fn combine(a: &Span, b: &Span) -> Span {
        Span::new(a.0.start.min(b.0.start), a.0.end.max(b.0.end))
    }
    pub fn start(&self) -> usize {
        self.0.start
    }
    pub fn end(&self) -> usize {
        self.0.end
    }
    /// Returns the text covered by this span. Offsets are in characters.
    pub fn str_of(&self, source: &str) -> String {
        source
            .chars()
            .skip(self.0.start)
            .take(self.0.end.saturating_sub(self.0.start))
            .collect()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.0.start, self.0.end)
    }
}

/// Operators that are dispatched through the namespace like ordinary
/// functions. The `id` of an operator is the name under which its native
/// implementations are declared.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum OpType {
    Add,
    Sub,
    Mul,
    Div,
    IntDiv,
    Mod,
    Pow,
    IntAnd,
    IntOr,
    LeftShift,
    RightShift,
    BoolAnd,
    BoolOr,
    Xor,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Neq,
    Neg,
    Not,
    Index,
    Size,
    IsEmpty,
    DotDot,
    If,
    Radix,
}

impl OpType {
    pub fn id(&self) -> &'static str {
        match self {
            OpType::Add => "+",
            OpType::Sub | OpType::Neg => "-",
            OpType::Mul => "*",
            OpType::Div => "/",
            OpType::IntDiv => "\\",
            OpType::Mod => "%",
            OpType::Pow => "^",
            OpType::IntAnd => "&",
            OpType::IntOr => "|",
            OpType::LeftShift => "<<",
            OpType::RightShift => ">>",
            OpType::BoolAnd => "&&",
            OpType::BoolOr => "||",
            OpType::Xor => "^^",
            OpType::Lt => "<",
            OpType::Gt => ">",
            OpType::Le => "<=",
            OpType::Ge => ">=",
            OpType::Eq => "==",
            OpType::Neq => "!=",
            OpType::Not => "!",
            OpType::Index => "[]",
            OpType::Size => "?",
            OpType::IsEmpty => "?!",
            OpType::DotDot => "..",
            OpType::If => "if",
            OpType::Radix => "0x",
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            OpType::Neg | OpType::Not | OpType::Size | OpType::IsEmpty => 1,
            OpType::DotDot | OpType::If => 3,
            _ => 2,
        }
    }

    pub fn is_postfix(&self) -> bool {
        matches!(self, OpType::Size | OpType::IsEmpty)
    }
}

impl fmt::Display for OpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
