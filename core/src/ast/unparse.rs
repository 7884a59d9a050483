//! Converts syntax trees back into source text.
//!
//! The output parses to a structurally equal tree. Outside of brackets the
//! text is written without spaces around operators, because whitespace
//! separates the arguments of a command at the top level.

use core::fmt::{self, Write};

use chrono::{NaiveDateTime, Timelike};

use super::{DeleteTarget, Directive, DirectiveKind, Expr, ExprKind, InspectTarget, Parameter, Root, TypeAnnotation};
use crate::parser::OpType;

/// Unparses a whole command.
pub fn unparse(root: &Root) -> String {
    unparse_with_prefix(root, ':')
}

/// Unparses a whole command that was parsed with a custom command prefix.
pub fn unparse_with_prefix(root: &Root, prefix: char) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = Unparser::new(&mut out, prefix).root(root);
    out
}

/// Unparses a single expression.
pub fn unparse_expr(expr: &Expr) -> String {
    let mut out = String::new();
    let _ = Unparser::new(&mut out, ':').expr(expr);
    out
}

struct Unparser<'w, W: Write> {
    out: &'w mut W,
    prefix: char,
    /// Number of enclosing brackets. Whitespace is only safe when nonzero.
    nesting: usize,
}

impl<'w, W: Write> Unparser<'w, W> {
    fn new(out: &'w mut W, prefix: char) -> Self {
        Self {
            out,
            prefix,
            nesting: 0,
        }
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self) -> fmt::Result) -> fmt::Result {
        self.nesting += 1;
        let result = f(self);
        self.nesting -= 1;
        result
    }

    fn root(&mut self, root: &Root) -> fmt::Result {
        write!(self.out, "{}{}", self.prefix, root.command.name)?;
        for expr in &root.expressions {
            self.out.write_char(' ')?;
            self.expr(expr)?;
        }
        for directive in &root.directives {
            self.out.write_str(", ")?;
            self.directive(directive)?;
        }
        Ok(())
    }

    fn directive(&mut self, directive: &Directive) -> fmt::Result {
        match &directive.kind {
            DirectiveKind::Delay(amount) => {
                self.out.write_str("delay ")?;
                self.expr(amount)
            }
            DirectiveKind::Reinterpret => self.out.write_str("reinterpret"),
        }
    }

    fn list(&mut self, exprs: &[Expr]) -> fmt::Result {
        for (i, e) in exprs.iter().enumerate() {
            if i > 0 {
                self.out.write_str(", ")?;
            }
            self.expr(e)?;
        }
        Ok(())
    }

    fn expr(&mut self, expr: &Expr) -> fmt::Result {
        match &expr.kind {
            ExprKind::Bool(b) => write!(self.out, "{}", b),
            ExprKind::Number(n) => self.out.write_str(&format_number(*n)),
            ExprKind::String(s) => self.out.write_str(&quote_string(s)),
            ExprKind::Date(d) => self.out.write_str(&format_date(d)),
            ExprKind::Timespan(t) => self.out.write_str(&format_timespan(*t)),
            ExprKind::Channel(c) | ExprKind::User(c) => self.out.write_str(c),
            ExprKind::Help => self.out.write_char('?'),
            ExprKind::List(items) => {
                self.out.write_char('{')?;
                self.nested(|u| u.list(items))?;
                self.out.write_char('}')
            }
            ExprKind::Function { params, body } => {
                self.out.write_str("\\(")?;
                self.nested(|u| {
                    u.params(params)?;
                    u.out.write_str(": ")?;
                    u.expr(body)
                })?;
                self.out.write_char(')')
            }
            ExprKind::Var(id) => {
                if id.escaped {
                    self.out.write_char('\\')?;
                }
                self.out.write_str(&id.name)
            }
            ExprKind::NamespaceAccess { namespace, member } => {
                self.expr(namespace)?;
                self.out.write_char('.')?;
                self.expr(member)
            }
            ExprKind::Call { callee, args } => {
                self.expr(callee)?;
                self.out.write_char('(')?;
                self.nested(|u| u.list(args))?;
                self.out.write_char(')')
            }
            ExprKind::OperatorCall { op, operands } => self.operator(*op, operands),
            ExprKind::Assignment {
                expr,
                name,
                public,
                temp,
            } => {
                self.expr(expr)?;
                self.out.write_str("->")?;
                if *public {
                    self.out.write_str("public ")?;
                }
                if *temp {
                    self.out.write_str("temp ")?;
                }
                if name.escaped {
                    self.out.write_char('\\')?;
                }
                self.out.write_str(&name.name)
            }
            ExprKind::Delete(targets) => self.delete(targets),
            ExprKind::Inspect(target) => self.inspect(target),
            ExprKind::Braced(inner) => {
                self.out.write_char('(')?;
                self.nested(|u| u.expr(inner))?;
                self.out.write_char(')')
            }
            ExprKind::Problem => self.out.write_str("<problem>"),
        }
    }

    fn operator(&mut self, op: OpType, operands: &[Expr]) -> fmt::Result {
        match (op, operands) {
            (OpType::Index, [list, index]) => {
                self.expr(list)?;
                self.out.write_char('[')?;
                self.nested(|u| u.expr(index))?;
                self.out.write_char(']')
            }
            (OpType::DotDot, [from, to, step]) => {
                self.expr(from)?;
                self.out.write_str("..")?;
                self.expr(to)?;
                if !matches!(step.kind, ExprKind::Number(n) if n == 1.0) {
                    self.out.write_char('$')?;
                    self.expr(step)?;
                }
                Ok(())
            }
            (OpType::If, [cond, then, otherwise]) => {
                self.out.write_str("if ")?;
                self.expr(cond)?;
                self.out.write_str(" : ")?;
                self.expr(then)?;
                self.out.write_str(" : ")?;
                self.expr(otherwise)
            }
            (OpType::Radix, [radix, value]) => {
                write!(self.out, "0x{}:", format_number(literal_number(radix)))?;
                self.expr(value)
            }
            (op, [operand]) if op.is_postfix() => {
                self.expr(operand)?;
                write!(self.out, "{}", op)
            }
            (op, [operand]) => {
                write!(self.out, "{}", op)?;
                self.expr(operand)
            }
            // `a\b` would scan as `a` followed by the escaped name `b`, and
            // at the top level the spaces would split the argument.
            (OpType::IntDiv, [_, _]) if self.nesting == 0 => {
                self.out.write_char('(')?;
                self.nested(|u| u.operator(OpType::IntDiv, operands))?;
                self.out.write_char(')')
            }
            (OpType::IntDiv, [lhs, rhs]) => {
                self.expr(lhs)?;
                self.out.write_str(" \\ ")?;
                self.expr(rhs)
            }
            (op, [lhs, rhs]) => {
                self.expr(lhs)?;
                write!(self.out, "{}", op)?;
                self.expr(rhs)
            }
            (op, operands) => {
                write!(self.out, "{}(", op)?;
                self.nested(|u| u.list(operands))?;
                self.out.write_char(')')
            }
        }
    }

    fn params(&mut self, params: &[Parameter]) -> fmt::Result {
        for (i, p) in params.iter().enumerate() {
            if i > 0 {
                self.out.write_str(", ")?;
            }
            if let Some(annotation) = &p.annotation {
                self.annotation(annotation)?;
                self.out.write_char(' ')?;
            }
            if p.name.escaped {
                self.out.write_char('\\')?;
            }
            self.out.write_str(&p.name.name)?;
        }
        Ok(())
    }

    fn annotation(&mut self, annotation: &TypeAnnotation) -> fmt::Result {
        match annotation {
            TypeAnnotation::Named(name) => self.out.write_str(name),
            TypeAnnotation::List(inner) => {
                self.out.write_str("list<")?;
                self.annotation(inner)?;
                self.out.write_char('>')
            }
            TypeAnnotation::Function(params, result) => {
                self.out.write_char('(')?;
                for p in params {
                    self.annotation(p)?;
                    self.out.write_char(' ')?;
                }
                self.out.write_str("-> ")?;
                self.annotation(result)?;
                self.out.write_char(')')
            }
            TypeAnnotation::Any => self.out.write_char('?'),
        }
    }

    fn delete(&mut self, targets: &[DeleteTarget]) -> fmt::Result {
        self.out.write_str("del ")?;
        for (i, t) in targets.iter().enumerate() {
            if i > 0 {
                self.out.write_str(", ")?;
            }
            if t.public {
                self.out.write_str("public ")?;
            }
            self.out.write_str(&t.name.name)?;
        }
        Ok(())
    }

    fn inspect(&mut self, target: &InspectTarget) -> fmt::Result {
        self.out.write_str("inspect ")?;
        if target.public {
            self.out.write_str("public ")?;
        }
        if let Some(ns) = &target.namespace {
            write!(self.out, "{}.", ns.name)?;
        }
        self.out.write_str(&target.name.name)
    }
}

fn literal_number(expr: &Expr) -> f64 {
    match expr.kind {
        ExprKind::Number(n) => n,
        _ => 10.0,
    }
}

/// Formats a number the way it is written in source: integral values have
/// no fractional part.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Formats a duration in seconds as a compound timespan literal.
pub fn format_timespan(seconds: i64) -> String {
    const UNITS: [(char, i64); 6] = [
        ('y', 31_536_000),
        ('w', 604_800),
        ('d', 86_400),
        ('h', 3_600),
        ('m', 60),
        ('s', 1),
    ];
    if seconds == 0 {
        return "0s".to_string();
    }
    let mut out = String::new();
    if seconds < 0 {
        out.push('-');
    }
    let mut rest = seconds.unsigned_abs();
    for (unit, factor) in UNITS {
        let factor = factor as u64;
        if rest >= factor {
            let _ = write!(out, "{}{}", rest / factor, unit);
            rest %= factor;
        }
    }
    out
}

/// Formats a date as `DD.MM.YYYY`, with `@HH:MM` when the time is not midnight.
pub fn format_date(date: &NaiveDateTime) -> String {
    if date.hour() == 0 && date.minute() == 0 {
        date.format("%d.%m.%Y").to_string()
    } else {
        date.format("%d.%m.%Y@%H:%M").to_string()
    }
}

/// Quotes a string, escaping `"` and `\`.
pub fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
