//! Recursive descent parser.
//!
//! One method per precedence level, loosest first:
//!
//! ```text
//! root        -> PREFIX ID (WS assign)* (',' directive)* EOS
//! directive   -> 'delay' secTerm | 'reinterpret'
//! assign      -> relation ('->' 'public'? 'temp'? ID)?
//! relation    -> disjunction (('<'|'>'|'<='|'>='|'=='|'!=') disjunction)*
//! disjunction -> conjunction ('||' conjunction)*
//! conjunction -> secTerm (('&&'|'^^'|'xor') secTerm)*
//! secTerm     -> term (('+'|'-'|'&'|'|'|'<<'|'>>') term)*
//! term        -> factor (('*'|'/'|'\'|'%'|<implicit *>) factor)*
//! factor      -> postfix ('^' factor)?
//! postfix     -> autolist ('[' autolist ']' | '?' | '?!')*
//! autolist    -> dotdot (';' dotdot)*
//! dotdot      -> unary ('..' unary ('$' unary)?)?
//! unary       -> ('-'|'!') unary | call
//! call        -> access ('(' exprList? ')')*
//! access      -> literal ('.' literal)?
//! ```
//!
//! Syntax errors never abort parsing. [`Parser::expect`] either inserts the
//! missing token or replaces the unexpected one, the problem goes to the
//! diagnostics sink, and parsing resynchronizes. Productions that cannot
//! continue at all yield an [`ExprKind::Problem`] node.

use tracing::debug;

use crate::api::ParseOptions;
use crate::ast::{
    DeleteTarget, Directive, DirectiveKind, Expr, ExprKind, Identifier, InspectTarget, Parameter,
    Root, TypeAnnotation,
};
use crate::diagnostics::DiagnosticSink;
use crate::parser::error::{ParseError, ParseErrorKind};
use crate::parser::scanner::Scanner;
use crate::parser::syntax::{OpType, Span};
use crate::parser::token::{Token, TokenKind};
use crate::types::Primitive;

/// Parses a command. Returns `None` if the input is not a command at all:
/// the prefix or the command name is missing, or the name is too short.
pub fn parse(input: &str, sink: &mut dyn DiagnosticSink, options: &ParseOptions) -> Option<Root> {
    Parser::new(input, sink, options).parse()
}

/// Parses a bare expression without command prefix. Whitespace is
/// insignificant in a bare expression.
pub fn parse_expression(input: &str, sink: &mut dyn DiagnosticSink, options: &ParseOptions) -> Expr {
    Parser::new(input, sink, options).parse_expression()
}

pub struct Parser<'a> {
    input: &'a str,
    scanner: Scanner,
    sink: &'a mut dyn DiagnosticSink,
    options: &'a ParseOptions,
    /// Closing tokens of the bracketed sub-expressions we are in.
    brackets: Vec<TokenKind>,
    /// Whitespace mode outside of any brackets.
    skip_whitespace: bool,
    depth: usize,
    abandoned: bool,
    missing_id: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str, sink: &'a mut dyn DiagnosticSink, options: &'a ParseOptions) -> Self {
        Self {
            input,
            scanner: Scanner::new(input),
            sink,
            options,
            brackets: Vec::new(),
            skip_whitespace: false,
            depth: 0,
            abandoned: false,
            missing_id: 0,
        }
    }

    pub fn parse(mut self) -> Option<Root> {
        let start = self.scanner.look_ahead();
        if !self.is_command_prefix(&start) {
            return None;
        }
        self.scanner.consume();

        let name_token = self.scanner.look_ahead();
        if !name_token.matches(TokenKind::Identifier) && TokenKind::keyword(&name_token.span.str_of(self.input)).is_none() {
            return None;
        }
        self.scanner.consume();
        let name = name_token.span.str_of(self.input);
        if name.chars().count() < self.options.min_command_length {
            return None;
        }
        let command = Identifier::new(name, Span::combine(&start.span, &name_token.span));

        let mut expressions = Vec::new();
        while self.scanner.match_kind(TokenKind::Separator) {
            let la = self.scanner.look_ahead();
            if la.matches(TokenKind::Eos) || la.matches(TokenKind::Comma) {
                break;
            }
            expressions.push(self.parse_assignment());
        }

        let mut directives: Vec<Directive> = Vec::new();
        if self.scanner.match_kind(TokenKind::Comma) {
            loop {
                self.allow_single_whitespace();
                if let Some(directive) = self.parse_directive() {
                    let duplicate = directives
                        .iter()
                        .any(|d| d.kind.name() == directive.kind.name());
                    if duplicate {
                        self.report(ParseError::new(
                            ParseErrorKind::DuplicateDirective {
                                name: directive.kind.name().to_string(),
                            },
                            directive.span.clone(),
                        ));
                    } else {
                        directives.push(directive);
                    }
                }
                if !self.scanner.match_kind(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenKind::Eos, false);
        let root = Root {
            command,
            expressions,
            directives,
            span: self.scanner.span_from(&start),
        };
        debug!(command = %root.command.name, args = root.expressions.len(), "parsed command");
        Some(root)
    }

    pub fn parse_expression(mut self) -> Expr {
        self.skip_whitespace = true;
        self.scanner.set_skip_whitespace(true);
        let expr = self.parse_assignment();
        self.expect(TokenKind::Eos, false);
        debug!("parsed expression");
        expr
    }

    fn is_command_prefix(&self, token: &Token) -> bool {
        token.span.end() == token.span.start() + 1
            && self.input.chars().nth(token.span.start()) == Some(self.options.command_prefix)
    }

    // ------------------------------------------------------------------
    // Error handling helpers
    // ------------------------------------------------------------------

    fn report(&mut self, error: ParseError) {
        if self.abandoned {
            return;
        }
        self.sink.report(error.to_problem());
    }

    fn report_lexical(&mut self, token: &Token) {
        self.report(ParseError::new(
            ParseErrorKind::Lexical {
                message: token.string_value().to_string(),
            },
            token.span.clone(),
        ));
    }

    /// Expects the next token to be of kind `expected` and consumes it.
    ///
    /// On a mismatch the problem is reported. With `insert` the parser
    /// pretends the expected token was there and leaves the actual token
    /// for the next production. Without `insert` the actual token is consumed
    /// in place of the expected one. Error tokens are always consumed.
    pub fn expect(&mut self, expected: TokenKind, insert: bool) {
        let la = self.scanner.look_ahead();
        if la.matches(TokenKind::Error) {
            self.scanner.consume();
            self.report_lexical(&la);
            return;
        }
        if !la.matches(expected) {
            self.report(ParseError::unexpected(expected, la.kind, la.span.clone()));
            if insert {
                return;
            }
        }
        self.scanner.consume();
    }

    fn missing_identifier(&mut self, span: Span) -> Identifier {
        let id = Identifier::new(format!("$missing_{}", self.missing_id), span);
        self.missing_id += 1;
        id
    }

    fn expect_identifier(&mut self) -> Identifier {
        let la = self.scanner.look_ahead();
        match la.kind {
            TokenKind::Identifier => {
                self.scanner.consume();
                Identifier::new(la.string_value(), la.span.clone())
            }
            TokenKind::Escaped => {
                self.scanner.consume();
                Identifier::escaped(la.string_value(), la.span.clone())
            }
            TokenKind::Error => {
                self.scanner.consume();
                self.report_lexical(&la);
                self.missing_identifier(la.span)
            }
            other => {
                self.report(ParseError::unexpected(TokenKind::Identifier, other, la.span.clone()));
                self.missing_identifier(la.span)
            }
        }
    }

    /// Consumes a single whitespace token if whitespace is significant.
    fn allow_single_whitespace(&mut self) {
        if !self.scanner.skip_whitespace() {
            self.scanner.match_kind(TokenKind::Separator);
        }
    }

    fn enter_brackets(&mut self, end: TokenKind) {
        self.brackets.push(end);
        self.scanner.set_skip_whitespace(true);
    }

    fn leave_brackets(&mut self) {
        self.brackets.pop();
        if self.brackets.is_empty() {
            self.scanner.set_skip_whitespace(self.skip_whitespace);
        }
    }

    /// Tracks recursion depth. Once the limit is exceeded the rest of the
    /// input is dropped and the parser unwinds quietly.
    fn descend(&mut self) -> bool {
        self.depth += 1;
        if self.depth <= self.options.max_depth {
            return !self.abandoned;
        }
        if !self.abandoned {
            let la = self.scanner.look_ahead();
            self.report(ParseError::new(
                ParseErrorKind::MaxDepthExceeded {
                    max_depth: self.options.max_depth,
                },
                la.span,
            ));
            self.abandoned = true;
            while !self.scanner.is_eos() {
                self.scanner.consume();
            }
        }
        false
    }

    fn problem_here(&mut self) -> Expr {
        Expr::new(ExprKind::Problem, Span::at(self.scanner.stream_index()))
    }

    // ------------------------------------------------------------------
    // Directives
    // ------------------------------------------------------------------

    fn parse_directive(&mut self) -> Option<Directive> {
        let la = self.scanner.look_ahead();
        match la.kind {
            TokenKind::Delay => {
                self.scanner.consume();
                self.expect(TokenKind::Separator, true);
                let amount = self.parse_sec_term();
                Some(Directive {
                    kind: DirectiveKind::Delay(amount),
                    span: self.scanner.span_from(&la),
                })
            }
            TokenKind::Reinterpret => {
                self.scanner.consume();
                Some(Directive {
                    kind: DirectiveKind::Reinterpret,
                    span: la.span,
                })
            }
            TokenKind::Error => {
                self.scanner.consume();
                self.report_lexical(&la);
                None
            }
            other => {
                self.scanner.consume();
                self.report(ParseError::new(
                    ParseErrorKind::ExpectedDirective {
                        found: other.description().to_string(),
                    },
                    la.span,
                ));
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn parse_assignment(&mut self) -> Expr {
        let lhs = self.parse_relation();

        if self.scanner.match_kind(TokenKind::Assignment) {
            self.allow_single_whitespace();
            let public = self.scanner.match_kind(TokenKind::Public);
            self.allow_single_whitespace();
            let temp = self.scanner.match_kind(TokenKind::Temp);
            self.allow_single_whitespace();
            let name = self.expect_identifier();

            let span = Span::combine(&lhs.span, &name.span);
            return Expr::new(
                ExprKind::Assignment {
                    expr: Box::new(lhs),
                    name,
                    public,
                    temp,
                },
                span,
            );
        }
        lhs
    }

    /// Parses a left-associative chain of binary operators.
    fn binary_level(
        &mut self,
        accepts: fn(TokenKind) -> bool,
        next: fn(&mut Self) -> Expr,
    ) -> Expr {
        let mut expr = next(self);
        let mut links = 0;
        loop {
            let la = self.scanner.look_ahead();
            let Some(op) = la.kind.binary_op().filter(|_| accepts(la.kind)) else {
                break;
            };
            links += 1;
            if !self.descend() {
                break;
            }
            self.scanner.consume();
            let rhs = next(self);
            let span = Span::combine(&expr.span, &rhs.span);
            expr = Expr::operator(op, vec![expr, rhs], span);
        }
        self.depth -= links;
        expr
    }

    fn parse_relation(&mut self) -> Expr {
        self.binary_level(
            |k| {
                matches!(
                    k,
                    TokenKind::Lt
                        | TokenKind::Gt
                        | TokenKind::Le
                        | TokenKind::Ge
                        | TokenKind::Eq
                        | TokenKind::Neq
                )
            },
            Self::parse_disjunction,
        )
    }

    fn parse_disjunction(&mut self) -> Expr {
        self.binary_level(|k| k == TokenKind::BoolOr, Self::parse_conjunction)
    }

    fn parse_conjunction(&mut self) -> Expr {
        self.binary_level(
            |k| matches!(k, TokenKind::BoolAnd | TokenKind::DoubleCaret | TokenKind::Xor),
            Self::parse_sec_term,
        )
    }

    fn parse_sec_term(&mut self) -> Expr {
        self.binary_level(
            |k| {
                matches!(
                    k,
                    TokenKind::Add
                        | TokenKind::Sub
                        | TokenKind::IntAnd
                        | TokenKind::IntOr
                        | TokenKind::LeftShift
                        | TokenKind::RightShift
                )
            },
            Self::parse_term,
        )
    }

    fn parse_term(&mut self) -> Expr {
        let mut expr = self.parse_factor();
        let mut links = 0;
        loop {
            let la = self.scanner.look_ahead();
            let explicit = matches!(
                la.kind,
                TokenKind::Mul | TokenKind::Div | TokenKind::IntDiv | TokenKind::Mod
            );
            // `2x` and `3(1+2)`: the token is left for the operand
            let implicit = matches!(la.kind, TokenKind::Identifier | TokenKind::OpenBr);
            if !explicit && !implicit {
                break;
            }
            links += 1;
            if !self.descend() {
                break;
            }
            let op = if explicit {
                self.scanner.consume();
                la.kind.binary_op().unwrap_or(OpType::Mul)
            } else {
                OpType::Mul
            };
            let rhs = self.parse_factor();
            let span = Span::combine(&expr.span, &rhs.span);
            expr = Expr::operator(op, vec![expr, rhs], span);
        }
        self.depth -= links;
        expr
    }

    /// `^` is right-associative: `a^b^c` is `a^(b^c)`.
    fn parse_factor(&mut self) -> Expr {
        let mut operands = vec![self.parse_postfix()];
        let mut links = 0;
        while self.scanner.look_ahead().matches(TokenKind::Power) {
            links += 1;
            if !self.descend() {
                break;
            }
            self.scanner.consume();
            operands.push(self.parse_postfix());
        }
        self.depth -= links;
        let mut iter = operands.into_iter().rev();
        let mut expr = match iter.next() {
            Some(last) => last,
            None => return self.problem_here(),
        };
        for lhs in iter {
            let span = Span::combine(&lhs.span, &expr.span);
            expr = Expr::operator(OpType::Pow, vec![lhs, expr], span);
        }
        expr
    }

    fn parse_postfix(&mut self) -> Expr {
        let mut lhs = self.parse_autolist();
        let mut links = 0;
        loop {
            let la = self.scanner.look_ahead();
            if matches!(
                la.kind,
                TokenKind::OpenSqBr | TokenKind::Question | TokenKind::QuestExclamation
            ) {
                links += 1;
                if !self.descend() {
                    break;
                }
            }
            match la.kind {
                TokenKind::OpenSqBr => {
                    self.scanner.consume();
                    self.enter_brackets(TokenKind::ClosedSqBr);
                    let index = self.parse_autolist();
                    self.expect(TokenKind::ClosedSqBr, true);
                    self.leave_brackets();
                    let span = Span::new(lhs.span.start(), self.scanner.stream_index());
                    lhs = Expr::operator(OpType::Index, vec![lhs, index], span);
                }
                TokenKind::Question | TokenKind::QuestExclamation => {
                    self.scanner.consume();
                    let op = if la.kind == TokenKind::Question {
                        OpType::Size
                    } else {
                        OpType::IsEmpty
                    };
                    let span = Span::combine(&lhs.span, &la.span);
                    lhs = Expr::operator(op, vec![lhs], span);
                }
                _ => break,
            }
        }
        self.depth -= links;
        lhs
    }

    fn parse_autolist(&mut self) -> Expr {
        let first = self.parse_dotdot();
        if !self.scanner.look_ahead().matches(TokenKind::Semicolon) {
            return first;
        }
        let mut content = vec![first];
        while self.scanner.match_kind(TokenKind::Semicolon) {
            content.push(self.parse_dotdot());
        }
        let span = Span::combine(&content[0].span, &content[content.len() - 1].span);
        Expr::new(ExprKind::List(content), span)
    }

    fn parse_dotdot(&mut self) -> Expr {
        let from = self.parse_unary();
        if !self.scanner.match_kind(TokenKind::DotDot) {
            return from;
        }
        let to = self.parse_unary();
        let step = if self.scanner.match_kind(TokenKind::Dollar) {
            self.parse_unary()
        } else {
            Expr::number(1.0, to.span.clone())
        };
        let span = Span::combine(&from.span, &step.span);
        Expr::operator(OpType::DotDot, vec![from, to, step], span)
    }

    fn parse_unary(&mut self) -> Expr {
        let expr = if self.descend() {
            let la = self.scanner.look_ahead();
            let op = match la.kind {
                TokenKind::Sub => Some(OpType::Neg),
                TokenKind::Exclamation => Some(OpType::Not),
                _ => None,
            };
            match op {
                Some(op) => {
                    self.scanner.consume();
                    let operand = self.parse_unary();
                    let span = Span::combine(&la.span, &operand.span);
                    Expr::operator(op, vec![operand], span)
                }
                None => self.parse_call(),
            }
        } else {
            self.problem_here()
        };
        self.depth -= 1;
        expr
    }

    fn parse_call(&mut self) -> Expr {
        let mut callee = self.parse_namespace_access();
        let mut links = 0;
        while is_callable(&callee) && self.scanner.look_ahead().matches(TokenKind::OpenBr) {
            links += 1;
            if !self.descend() {
                break;
            }
            self.scanner.consume();
            let args = self.parse_expression_list(TokenKind::ClosedBr);
            self.expect(TokenKind::ClosedBr, true);
            let span = Span::new(callee.span.start(), self.scanner.stream_index());
            callee = Expr::new(
                ExprKind::Call {
                    callee: Box::new(callee),
                    args,
                },
                span,
            );
        }
        self.depth -= links;
        callee
    }

    fn parse_namespace_access(&mut self) -> Expr {
        let lhs = self.parse_literal();
        if !self.scanner.match_kind(TokenKind::Dot) {
            return lhs;
        }
        let rhs = self.parse_literal();
        let span = Span::combine(&lhs.span, &rhs.span);
        Expr::new(
            ExprKind::NamespaceAccess {
                namespace: Box::new(lhs),
                member: Box::new(rhs),
            },
            span,
        )
    }

    fn parse_literal(&mut self) -> Expr {
        let la = self.scanner.look_ahead();
        let span = la.span.clone();
        match la.kind {
            TokenKind::Identifier => {
                self.scanner.consume();
                Expr::var(Identifier::new(la.string_value(), span))
            }
            TokenKind::Escaped => {
                self.scanner.consume();
                Expr::var(Identifier::escaped(la.string_value(), span))
            }
            TokenKind::OpenBr => {
                self.scanner.consume();
                self.enter_brackets(TokenKind::ClosedBr);
                let inner = self.parse_relation();
                self.expect(TokenKind::ClosedBr, true);
                self.leave_brackets();
                Expr::new(ExprKind::Braced(Box::new(inner)), self.scanner.span_from(&la))
            }
            TokenKind::Lambda => {
                self.scanner.consume();
                self.enter_brackets(TokenKind::ClosedBr);
                let params = self.parse_parameters(TokenKind::Colon);
                self.expect(TokenKind::Colon, true);
                let body = self.parse_relation();
                self.expect(TokenKind::ClosedBr, true);
                self.leave_brackets();
                Expr::new(
                    ExprKind::Function {
                        params,
                        body: Box::new(body),
                    },
                    self.scanner.span_from(&la),
                )
            }
            TokenKind::OpenCurlBr => {
                self.scanner.consume();
                self.enter_brackets(TokenKind::ClosedCurlBr);
                let elements = self.parse_expression_list(TokenKind::ClosedCurlBr);
                self.expect(TokenKind::ClosedCurlBr, true);
                self.leave_brackets();
                Expr::new(ExprKind::List(elements), self.scanner.span_from(&la))
            }
            TokenKind::Delete => {
                self.scanner.consume();
                let mut targets = Vec::new();
                loop {
                    self.allow_single_whitespace();
                    let public = self.scanner.match_kind(TokenKind::Public);
                    if public {
                        self.allow_single_whitespace();
                    }
                    let name = self.expect_identifier();
                    targets.push(DeleteTarget { name, public });
                    if !self.scanner.match_kind(TokenKind::Comma) {
                        break;
                    }
                }
                Expr::new(ExprKind::Delete(targets), self.scanner.span_from(&la))
            }
            TokenKind::Inspect => {
                self.scanner.consume();
                self.allow_single_whitespace();
                let public = self.scanner.match_kind(TokenKind::Public);
                self.allow_single_whitespace();
                let mut name = self.expect_identifier();
                let mut namespace = None;
                if !public && self.scanner.match_kind(TokenKind::Dot) {
                    namespace = Some(name);
                    name = self.expect_identifier();
                }
                Expr::new(
                    ExprKind::Inspect(InspectTarget {
                        namespace,
                        name,
                        public,
                    }),
                    self.scanner.span_from(&la),
                )
            }
            TokenKind::If => {
                self.scanner.consume();
                self.allow_single_whitespace();
                let condition = self.parse_relation();
                self.allow_single_whitespace();
                self.expect(TokenKind::Colon, true);
                self.allow_single_whitespace();
                let then = self.parse_relation();
                self.allow_single_whitespace();
                self.expect(TokenKind::Colon, true);
                self.allow_single_whitespace();
                let otherwise = self.parse_relation();
                Expr::operator(
                    OpType::If,
                    vec![condition, then, otherwise],
                    self.scanner.span_from(&la),
                )
            }
            TokenKind::True | TokenKind::False => {
                self.scanner.consume();
                Expr::new(ExprKind::Bool(la.kind == TokenKind::True), span)
            }
            TokenKind::Channel => {
                self.scanner.consume();
                Expr::new(ExprKind::Channel(la.string_value().to_string()), span)
            }
            TokenKind::User => {
                self.scanner.consume();
                Expr::new(ExprKind::User(la.string_value().to_string()), span)
            }
            TokenKind::String => {
                self.scanner.consume();
                Expr::new(ExprKind::String(la.string_value().to_string()), span)
            }
            TokenKind::Number => {
                self.scanner.consume();
                Expr::number(la.number_value(), span)
            }
            TokenKind::DateTime => {
                self.scanner.consume();
                Expr::new(ExprKind::Date(la.date_value().unwrap_or_default()), span)
            }
            TokenKind::Timespan => {
                self.scanner.consume();
                Expr::new(ExprKind::Timespan(la.long_value()), span)
            }
            TokenKind::Question => {
                self.scanner.consume();
                Expr::new(ExprKind::Help, span)
            }
            TokenKind::Radix => {
                self.scanner.consume();
                let radix = Expr::number(la.long_value() as f64, span);
                let value = self.parse_literal();
                Expr::operator(OpType::Radix, vec![radix, value], self.scanner.span_from(&la))
            }
            TokenKind::Error => {
                self.scanner.consume();
                self.report_lexical(&la);
                Expr::new(ExprKind::Problem, span)
            }
            other => {
                self.report(ParseError::new(
                    ParseErrorKind::ExpectedExpression {
                        found: other.description().to_string(),
                    },
                    span.clone(),
                ));
                Expr::new(ExprKind::Problem, span)
            }
        }
    }

    /// `exprList -> (relation (',' relation)*)?`. The closing token is left
    /// for the caller.
    fn parse_expression_list(&mut self, end: TokenKind) -> Vec<Expr> {
        if self.scanner.look_ahead().matches(end) {
            return Vec::new();
        }
        self.enter_brackets(end);
        let mut result = vec![self.parse_relation()];
        while self.scanner.match_kind(TokenKind::Comma) {
            self.allow_single_whitespace();
            result.push(self.parse_relation());
        }
        self.leave_brackets();
        result
    }

    /// Parses formal parameters up to `end`, which is left for the caller.
    /// Parameters are separated by commas; untyped names may also be
    /// separated by whitespace alone.
    fn parse_parameters(&mut self, end: TokenKind) -> Vec<Parameter> {
        if self.scanner.look_ahead().matches(end) {
            return Vec::new();
        }
        self.enter_brackets(end);
        let mut params = Vec::new();
        loop {
            params.push(self.parse_parameter());
            if self.scanner.match_kind(TokenKind::Comma) {
                self.allow_single_whitespace();
                continue;
            }
            let la = self.scanner.look_ahead();
            if !(la.matches(TokenKind::Identifier) || la.matches(TokenKind::Escaped)) {
                break;
            }
        }
        self.leave_brackets();
        params
    }

    /// `parameter -> type? ID`. A leading identifier is only read as a type
    /// when it names a primitive type and another name follows.
    fn parse_parameter(&mut self) -> Parameter {
        let la = self.scanner.look_ahead();
        if la.matches(TokenKind::Identifier) {
            self.scanner.consume();
            let next = self.scanner.look_ahead();
            let followed_by_name =
                next.matches(TokenKind::Identifier) || next.matches(TokenKind::Escaped);
            if followed_by_name && Primitive::from_name(la.string_value()).is_some() {
                let annotation = TypeAnnotation::Named(la.string_value().to_string());
                let name = self.expect_identifier();
                return Parameter {
                    name,
                    annotation: Some(annotation),
                    span: self.scanner.span_from(&la),
                };
            }
            return Parameter {
                name: Identifier::new(la.string_value(), la.span.clone()),
                annotation: None,
                span: la.span,
            };
        }
        if la.matches(TokenKind::Escaped) {
            self.scanner.consume();
            return Parameter {
                name: Identifier::escaped(la.string_value(), la.span.clone()),
                annotation: None,
                span: la.span,
            };
        }
        let annotation = self.parse_type();
        let name = self.expect_identifier();
        Parameter {
            name,
            annotation: Some(annotation),
            span: self.scanner.span_from(&la),
        }
    }

    /// ```text
    /// type -> ID | 'list' '<' type '>' | '(' (type (WS type)*)? '->' type ')' | '?'
    /// ```
    fn parse_type(&mut self) -> TypeAnnotation {
        if self.scanner.match_kind(TokenKind::OpenBr) {
            // Parameter types of a function type are separated by whitespace
            let previous = self.scanner.set_skip_whitespace(false);
            let mut params = Vec::new();
            loop {
                if self.scanner.look_ahead().matches(TokenKind::Assignment) {
                    break;
                }
                params.push(self.parse_type());
                if !self.scanner.match_kind(TokenKind::Separator)
                    || self.scanner.look_ahead().matches(TokenKind::Assignment)
                {
                    break;
                }
            }
            self.scanner.set_skip_whitespace(previous);
            self.allow_single_whitespace();
            self.expect(TokenKind::Assignment, true);
            let result = self.parse_type();
            self.allow_single_whitespace();
            self.expect(TokenKind::ClosedBr, true);
            TypeAnnotation::Function(params, Box::new(result))
        } else if self.scanner.match_kind(TokenKind::List) {
            self.expect(TokenKind::Lt, true);
            let inner = self.parse_type();
            self.expect_closing_angle();
            TypeAnnotation::List(Box::new(inner))
        } else if self.scanner.match_kind(TokenKind::Question) {
            TypeAnnotation::Any
        } else {
            TypeAnnotation::Named(self.expect_identifier().name)
        }
    }

    /// Expects `>`. A `>>` closes two nested list types, so it is split.
    fn expect_closing_angle(&mut self) {
        let la = self.scanner.look_ahead();
        if la.matches(TokenKind::RightShift) {
            self.scanner.consume();
            let second = Span::new(la.span.start() + 1, la.span.end());
            self.scanner.push_back(Token::new(TokenKind::Gt, second));
        } else {
            self.expect(TokenKind::Gt, true);
        }
    }
}

/// Literals that can never evaluate to a function are not call targets, so
/// `3(1+2)` is read as a multiplication.
fn is_callable(expr: &Expr) -> bool {
    matches!(
        expr.kind,
        ExprKind::Var(_)
            | ExprKind::NamespaceAccess { .. }
            | ExprKind::Call { .. }
            | ExprKind::Braced(_)
            | ExprKind::Function { .. }
            | ExprKind::Problem
    )
}
