//! Tokens produced by the [`Scanner`](super::scanner::Scanner).

use core::fmt;

use chrono::NaiveDateTime;

use super::syntax::{OpType, Span};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    Identifier,
    Escaped,
    Number,
    String,
    DateTime,
    Timespan,
    Channel,
    User,
    True,
    False,

    // Keywords
    If,
    Xor,
    Public,
    Temp,
    Delete,
    Inspect,
    List,
    Delay,
    Reinterpret,

    // Operators
    Add,
    Sub,
    Mul,
    Div,
    IntDiv,
    Mod,
    Power,
    BoolAnd,
    BoolOr,
    DoubleCaret,
    IntAnd,
    IntOr,
    LeftShift,
    RightShift,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Neq,
    Exclamation,
    Question,
    QuestExclamation,
    Assignment,
    Radix,
    Lambda,

    // Punctuation
    Comma,
    Semicolon,
    Colon,
    Dot,
    DotDot,
    Dollar,
    OpenBr,
    ClosedBr,
    OpenSqBr,
    ClosedSqBr,
    OpenCurlBr,
    ClosedCurlBr,

    Separator,
    Eos,
    Error,
}

impl TokenKind {
    pub fn keyword(ident: &str) -> Option<TokenKind> {
        Some(match ident {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "if" => TokenKind::If,
            "xor" => TokenKind::Xor,
            "public" => TokenKind::Public,
            "temp" => TokenKind::Temp,
            "del" => TokenKind::Delete,
            "inspect" => TokenKind::Inspect,
            "list" => TokenKind::List,
            "delay" => TokenKind::Delay,
            "reinterpret" => TokenKind::Reinterpret,
            _ => return None,
        })
    }

    /// The binary operator denoted by this token, if any.
    pub fn binary_op(&self) -> Option<OpType> {
        Some(match self {
            TokenKind::Add => OpType::Add,
            TokenKind::Sub => OpType::Sub,
            TokenKind::Mul => OpType::Mul,
            TokenKind::Div => OpType::Div,
            TokenKind::IntDiv => OpType::IntDiv,
            TokenKind::Mod => OpType::Mod,
            TokenKind::Power => OpType::Pow,
            TokenKind::BoolAnd => OpType::BoolAnd,
            TokenKind::BoolOr => OpType::BoolOr,
            TokenKind::Xor | TokenKind::DoubleCaret => OpType::Xor,
            TokenKind::IntAnd => OpType::IntAnd,
            TokenKind::IntOr => OpType::IntOr,
            TokenKind::LeftShift => OpType::LeftShift,
            TokenKind::RightShift => OpType::RightShift,
            TokenKind::Lt => OpType::Lt,
            TokenKind::Gt => OpType::Gt,
            TokenKind::Le => OpType::Le,
            TokenKind::Ge => OpType::Ge,
            TokenKind::Eq => OpType::Eq,
            TokenKind::Neq => OpType::Neq,
            TokenKind::OpenSqBr => OpType::Index,
            TokenKind::DotDot => OpType::DotDot,
            _ => return None,
        })
    }

    pub fn description(&self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Escaped => "escaped identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::DateTime => "date",
            TokenKind::Timespan => "timespan",
            TokenKind::Channel => "channel",
            TokenKind::User => "user",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::If => "'if'",
            TokenKind::Xor => "'xor'",
            TokenKind::Public => "'public'",
            TokenKind::Temp => "'temp'",
            TokenKind::Delete => "'del'",
            TokenKind::Inspect => "'inspect'",
            TokenKind::List => "'list'",
            TokenKind::Delay => "'delay'",
            TokenKind::Reinterpret => "'reinterpret'",
            TokenKind::Add => "'+'",
            TokenKind::Sub => "'-'",
            TokenKind::Mul => "'*'",
            TokenKind::Div => "'/'",
            TokenKind::IntDiv => "'\\'",
            TokenKind::Mod => "'%'",
            TokenKind::Power => "'^'",
            TokenKind::BoolAnd => "'&&'",
            TokenKind::BoolOr => "'||'",
            TokenKind::DoubleCaret => "'^^'",
            TokenKind::IntAnd => "'&'",
            TokenKind::IntOr => "'|'",
            TokenKind::LeftShift => "'<<'",
            TokenKind::RightShift => "'>>'",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::Le => "'<='",
            TokenKind::Ge => "'>='",
            TokenKind::Eq => "'=='",
            TokenKind::Neq => "'!='",
            TokenKind::Exclamation => "'!'",
            TokenKind::Question => "'?'",
            TokenKind::QuestExclamation => "'?!'",
            TokenKind::Assignment => "'->'",
            TokenKind::Radix => "radix operator",
            TokenKind::Lambda => "'\\('",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::Colon => "':'",
            TokenKind::Dot => "'.'",
            TokenKind::DotDot => "'..'",
            TokenKind::Dollar => "'$'",
            TokenKind::OpenBr => "'('",
            TokenKind::ClosedBr => "')'",
            TokenKind::OpenSqBr => "'['",
            TokenKind::ClosedSqBr => "']'",
            TokenKind::OpenCurlBr => "'{'",
            TokenKind::ClosedCurlBr => "'}'",
            TokenKind::Separator => "whitespace",
            TokenKind::Eos => "end of input",
            TokenKind::Error => "invalid symbol",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Payload carried by literal tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    None,
    Str(String),
    Number(f64),
    Long(i64),
    Date(NaiveDateTime),
}

/// A scanned token. Tokens are immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub value: TokenValue,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self {
            kind,
            span,
            value: TokenValue::None,
        }
    }

    pub fn with_value(kind: TokenKind, span: Span, value: TokenValue) -> Self {
        Self { kind, span, value }
    }

    pub fn error(span: Span, message: impl Into<String>) -> Self {
        Self::with_value(TokenKind::Error, span, TokenValue::Str(message.into()))
    }

    pub fn matches(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn string_value(&self) -> &str {
        match &self.value {
            TokenValue::Str(s) => s,
            _ => "",
        }
    }

    pub fn number_value(&self) -> f64 {
        match self.value {
            TokenValue::Number(n) => n,
            TokenValue::Long(l) => l as f64,
            _ => 0.0,
        }
    }

    pub fn long_value(&self) -> i64 {
        match self.value {
            TokenValue::Long(l) => l,
            TokenValue::Number(n) => n as i64,
            _ => 0,
        }
    }

    pub fn date_value(&self) -> Option<NaiveDateTime> {
        match self.value {
            TokenValue::Date(d) => Some(d),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.value) {
            (TokenKind::Identifier, TokenValue::Str(s)) => write!(f, "identifier '{}'", s),
            (TokenKind::Error, TokenValue::Str(s)) => write!(f, "invalid symbol ({})", s),
            (TokenKind::String, TokenValue::Str(s)) => write!(f, "string \"{}\"", s),
            (TokenKind::Number, TokenValue::Number(n)) => write!(f, "number {}", n),
            (kind, _) => write!(f, "{}", kind),
        }
    }
}
