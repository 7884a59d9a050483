//! Hand-written scanner for the expression language.
//!
//! The scanner produces tokens lazily. It keeps a buffer of already scanned
//! tokens so the parser can look ahead and push tokens back, and it supports
//! pushing back raw characters while scanning ambiguous literals (a number
//! might turn out to be a time, a date, a timespan or the start of a range).
//!
//! Whitespace is always scanned into `Separator` tokens. Whether they are
//! visible to the parser depends on the whitespace mode, which the parser
//! toggles when entering and leaving bracketed sub-expressions. Separators are
//! only dropped when they are consumed, so switching the mode back restores
//! them.
//!
//! Malformed input never aborts scanning: an `Error` token carrying a message
//! is produced instead and the parser decides how to continue.

use std::collections::VecDeque;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::trace;

use super::syntax::Span;
use super::token::{Token, TokenKind, TokenValue};

/// Largest radix accepted by radix literals and the radix operator.
pub const MAX_RADIX: u32 = 36;

/// Number of seconds per timespan unit.
pub fn timespan_unit(unit: char) -> Option<i64> {
    Some(match unit {
        'y' => 31_536_000,
        'w' => 604_800,
        'd' => 86_400,
        'h' => 3_600,
        'm' => 60,
        's' => 1,
        _ => return None,
    })
}

pub struct Scanner {
    chars: Vec<char>,
    index: usize,
    buffer: VecDeque<Token>,
    skip_whitespace: bool,
    last_end: usize,
}

impl Scanner {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            index: 0,
            buffer: VecDeque::new(),
            skip_whitespace: false,
            last_end: 0,
        }
    }

    pub fn skip_whitespace(&self) -> bool {
        self.skip_whitespace
    }

    /// Sets the whitespace mode and returns the previous one.
    pub fn set_skip_whitespace(&mut self, skip: bool) -> bool {
        core::mem::replace(&mut self.skip_whitespace, skip)
    }

    /// Returns the next visible token without consuming it.
    pub fn look_ahead(&mut self) -> Token {
        let i = self.visible_index();
        self.buffer[i].clone()
    }

    /// Consumes and returns the next visible token.
    pub fn next_token(&mut self) -> Token {
        let i = self.visible_index();
        let mut token = Token::new(TokenKind::Eos, Span::at(self.index));
        for _ in 0..=i {
            if let Some(t) = self.buffer.pop_front() {
                token = t;
            }
        }
        self.last_end = self.last_end.max(token.span.end());
        trace!(token = %token, "consumed token");
        token
    }

    pub fn consume(&mut self) {
        self.next_token();
    }

    /// Consumes the next token if it is of the given kind.
    pub fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.look_ahead().matches(kind) {
            self.consume();
            true
        } else {
            false
        }
    }

    /// Un-reads a token. It will be the next token returned.
    pub fn push_back(&mut self, token: Token) {
        self.buffer.push_front(token);
    }

    /// Span from the start of `start` to the end of the last consumed token.
    pub fn span_from(&self, start: &Token) -> Span {
        Span::new(start.span.start(), self.last_end.max(start.span.start()))
    }

    /// Offset just behind the last consumed token.
    pub fn stream_index(&self) -> usize {
        self.last_end
    }

    pub fn is_eos(&mut self) -> bool {
        self.look_ahead().matches(TokenKind::Eos)
    }

    fn visible_index(&mut self) -> usize {
        let mut i = 0;
        loop {
            while self.buffer.len() <= i {
                let token = self.read_token();
                self.buffer.push_back(token);
            }
            if self.skip_whitespace && self.buffer[i].matches(TokenKind::Separator) {
                i += 1;
                continue;
            }
            return i;
        }
    }

    // ------------------------------------------------------------------
    // Character level
    // ------------------------------------------------------------------

    fn peek_char(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.chars.get(self.index + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.index += 1;
        Some(c)
    }

    /// Un-reads the given number of characters.
    fn push_back_chars(&mut self, count: usize) {
        self.index = self.index.saturating_sub(count);
    }

    fn read_digits(&mut self) -> String {
        let mut digits = String::new();
        while let Some(c) = self.peek_char().filter(char::is_ascii_digit) {
            digits.push(c);
            self.index += 1;
        }
        digits
    }

    fn span(&self, start: usize) -> Span {
        Span::new(start, self.index)
    }

    fn error(&self, start: usize, message: impl Into<String>) -> Token {
        Token::error(self.span(start), message)
    }

    // ------------------------------------------------------------------
    // Token level
    // ------------------------------------------------------------------

    fn read_token(&mut self) -> Token {
        let start = self.index;
        let Some(c) = self.peek_char() else {
            return Token::new(TokenKind::Eos, Span::at(start));
        };

        if c.is_whitespace() {
            while self.peek_char().is_some_and(char::is_whitespace) {
                self.index += 1;
            }
            return Token::new(TokenKind::Separator, self.span(start));
        }
        if c.is_ascii_digit() || (c == '.' && self.peek_nth(1).is_some_and(|n| n.is_ascii_digit()))
        {
            return self.read_number_like(start);
        }
        if is_ident_start(c) {
            return self.read_identifier(start);
        }

        self.index += 1;
        let single = |kind| Token::new(kind, Span::new(start, start + 1));
        match c {
            '"' => self.read_string(start),
            '#' => self.read_sigil(start, TokenKind::Channel, "channel", |c, _| {
                is_ident_continue(c) || c == '-'
            }),
            '@' => self.read_sigil(start, TokenKind::User, "user", |c, next| {
                (is_ident_continue(c) || c == '[' || c == ']' || c == '-')
                    && !(c == '-' && next == Some('>'))
            }),
            '\\' => self.read_backslash(start),
            '+' => single(TokenKind::Add),
            '-' => self.one_or_two(start, '>', TokenKind::Assignment, TokenKind::Sub),
            '*' => single(TokenKind::Mul),
            '/' => single(TokenKind::Div),
            '%' => single(TokenKind::Mod),
            '^' => self.one_or_two(start, '^', TokenKind::DoubleCaret, TokenKind::Power),
            '&' => self.one_or_two(start, '&', TokenKind::BoolAnd, TokenKind::IntAnd),
            '|' => self.one_or_two(start, '|', TokenKind::BoolOr, TokenKind::IntOr),
            '<' => match self.peek_char() {
                Some('=') => self.two(start, TokenKind::Le),
                Some('<') => self.two(start, TokenKind::LeftShift),
                _ => single(TokenKind::Lt),
            },
            '>' => match self.peek_char() {
                Some('=') => self.two(start, TokenKind::Ge),
                Some('>') => self.two(start, TokenKind::RightShift),
                _ => single(TokenKind::Gt),
            },
            '=' => self.one_or_two(start, '=', TokenKind::Eq, TokenKind::Eq),
            '!' => self.one_or_two(start, '=', TokenKind::Neq, TokenKind::Exclamation),
            '?' => self.one_or_two(start, '!', TokenKind::QuestExclamation, TokenKind::Question),
            '.' => self.one_or_two(start, '.', TokenKind::DotDot, TokenKind::Dot),
            ',' => single(TokenKind::Comma),
            ';' => single(TokenKind::Semicolon),
            ':' => single(TokenKind::Colon),
            '$' => single(TokenKind::Dollar),
            '(' => single(TokenKind::OpenBr),
            ')' => single(TokenKind::ClosedBr),
            '[' => single(TokenKind::OpenSqBr),
            ']' => single(TokenKind::ClosedSqBr),
            '{' => single(TokenKind::OpenCurlBr),
            '}' => single(TokenKind::ClosedCurlBr),
            other => self.error(start, format!("unknown symbol '{}'", other)),
        }
    }

    fn two(&mut self, start: usize, kind: TokenKind) -> Token {
        self.index += 1;
        Token::new(kind, self.span(start))
    }

    fn one_or_two(&mut self, start: usize, second: char, two: TokenKind, one: TokenKind) -> Token {
        if self.peek_char() == Some(second) {
            self.two(start, two)
        } else {
            Token::new(one, self.span(start))
        }
    }

    fn read_identifier(&mut self, start: usize) -> Token {
        let mut ident = String::new();
        while let Some(c) = self.peek_char().filter(|c| is_ident_continue(*c)) {
            ident.push(c);
            self.index += 1;
        }
        if ident == "_" {
            return self.error(start, "'_' is not a valid identifier");
        }
        if ident == "now" {
            let now = Local::now().naive_local();
            return Token::with_value(TokenKind::DateTime, self.span(start), TokenValue::Date(now));
        }
        match TokenKind::keyword(&ident) {
            Some(kind) => Token::new(kind, self.span(start)),
            None => Token::with_value(TokenKind::Identifier, self.span(start), TokenValue::Str(ident)),
        }
    }

    fn read_backslash(&mut self, start: usize) -> Token {
        match self.peek_char() {
            Some('(') => self.two(start, TokenKind::Lambda),
            Some(c) if is_ident_start(c) => {
                let mut ident = String::new();
                while let Some(c) = self.peek_char().filter(|c| is_ident_continue(*c)) {
                    ident.push(c);
                    self.index += 1;
                }
                Token::with_value(TokenKind::Escaped, self.span(start), TokenValue::Str(ident))
            }
            _ => Token::new(TokenKind::IntDiv, self.span(start)),
        }
    }

    fn read_string(&mut self, start: usize) -> Token {
        let mut value = String::new();
        loop {
            match self.advance() {
                None => return self.error(start, "unclosed string literal"),
                Some('"') => break,
                Some('\\') => match self.advance() {
                    Some('"') => value.push('"'),
                    Some('\\') => value.push('\\'),
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => return self.error(start, "unclosed string literal"),
                },
                Some(c) => value.push(c),
            }
        }
        Token::with_value(TokenKind::String, self.span(start), TokenValue::Str(value))
    }

    fn read_sigil(
        &mut self,
        start: usize,
        kind: TokenKind,
        what: &str,
        accept: impl Fn(char, Option<char>) -> bool,
    ) -> Token {
        let sigil = self.chars[start];
        let mut name = String::new();
        name.push(sigil);
        while let Some(c) = self.peek_char() {
            if !accept(c, self.peek_nth(1)) {
                break;
            }
            name.push(c);
            self.index += 1;
        }
        if name.len() == 1 {
            return self.error(start, format!("missing {} name after '{}'", what, sigil));
        }
        Token::with_value(kind, self.span(start), TokenValue::Str(name))
    }

    // ------------------------------------------------------------------
    // Numbers, times, dates and timespans
    // ------------------------------------------------------------------

    fn read_number_like(&mut self, start: usize) -> Token {
        if self.peek_char() == Some('0') && self.peek_nth(1) == Some('x') {
            return self.read_radix_operator(start);
        }

        let int_part = self.read_digits();
        let mut frac_part = String::new();

        match self.peek_char() {
            Some(':')
                if !int_part.is_empty()
                    && int_part.len() <= 2
                    && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit())
                    && self.peek_nth(2).is_some_and(|c| c.is_ascii_digit()) =>
            {
                return self.read_time(start, &int_part);
            }
            Some('.') => match self.peek_nth(1) {
                // `N..` is a number followed by a range operator
                Some('.') => {}
                Some(c) if c.is_ascii_digit() => {
                    self.index += 1;
                    frac_part = self.read_digits();
                    if self.peek_char() == Some('.')
                        && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit())
                        && (1..=2).contains(&int_part.len())
                        && (1..=2).contains(&frac_part.len())
                    {
                        return self.read_date(start, &int_part, &frac_part);
                    }
                }
                _ => {}
            },
            Some('#') if !int_part.is_empty() => {
                return self.read_radixed_integer(start, &int_part);
            }
            Some(c) if frac_part.is_empty() && !int_part.is_empty() && timespan_unit(c).is_some() => {
                if let Some(token) = self.read_timespan(start, &int_part) {
                    return token;
                }
            }
            _ => {}
        }

        let int_part = if int_part.is_empty() { "0" } else { &int_part };
        let mut text = if frac_part.is_empty() {
            String::from(int_part)
        } else {
            format!("{}.{}", int_part, frac_part)
        };

        // Scientific notation
        if matches!(self.peek_char(), Some('e') | Some('E')) {
            let sign = self.peek_nth(1).filter(|c| *c == '+' || *c == '-');
            let digit_at = if sign.is_some() { 2 } else { 1 };
            if self.peek_nth(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                self.index += digit_at;
                text.push('e');
                if let Some(sign) = sign {
                    text.push(sign);
                }
                text.push_str(&self.read_digits());
            }
        }

        let Ok(mut value) = text.parse::<f64>() else {
            return self.error(start, format!("invalid number literal '{}'", text));
        };

        if self.peek_char() == Some('°') {
            self.index += 1;
            value = value.to_radians();
        }

        Token::with_value(TokenKind::Number, self.span(start), TokenValue::Number(value))
    }

    fn read_radix_operator(&mut self, start: usize) -> Token {
        self.index += 2;
        let digits = self.read_digits();
        if digits.is_empty() {
            return self.error(start, "missing radix after '0x'");
        }
        if self.peek_char() != Some(':') {
            return self.error(start, "expected ':' after radix");
        }
        self.index += 1;
        match digits.parse::<u32>() {
            Ok(radix) if (2..=MAX_RADIX).contains(&radix) => Token::with_value(
                TokenKind::Radix,
                self.span(start),
                TokenValue::Long(radix as i64),
            ),
            _ => self.error(
                start,
                format!("radix {} is out of range (2 to {})", digits, MAX_RADIX),
            ),
        }
    }

    fn read_radixed_integer(&mut self, start: usize, radix: &str) -> Token {
        self.index += 1;
        let radix = match radix.parse::<u32>() {
            Ok(radix) if (2..=MAX_RADIX).contains(&radix) => radix,
            _ => {
                return self.error(
                    start,
                    format!("radix {} is out of range (2 to {})", radix, MAX_RADIX),
                );
            }
        };
        let mut digits = String::new();
        while let Some(c) = self.peek_char().filter(|c| c.is_digit(radix)) {
            digits.push(c);
            self.index += 1;
        }
        if digits.is_empty() || self.peek_char().is_some_and(is_ident_continue) {
            while self.peek_char().is_some_and(is_ident_continue) {
                self.index += 1;
            }
            return self.error(start, format!("invalid integer literal for radix {}", radix));
        }
        match i64::from_str_radix(&digits, radix) {
            Ok(value) => Token::with_value(
                TokenKind::Number,
                self.span(start),
                TokenValue::Number(value as f64),
            ),
            Err(_) => self.error(start, format!("integer literal '{}' is too large", digits)),
        }
    }

    fn read_time(&mut self, start: usize, hours: &str) -> Token {
        self.index += 1;
        let minutes = self.read_digits();
        match parse_time(hours, &minutes) {
            Some(time) => {
                let today = Local::now().date_naive();
                Token::with_value(
                    TokenKind::DateTime,
                    self.span(start),
                    TokenValue::Date(today.and_time(time)),
                )
            }
            None => self.error(start, format!("invalid time {}:{}", hours, minutes)),
        }
    }

    fn read_date(&mut self, start: usize, day: &str, month: &str) -> Token {
        self.index += 1;
        let year = self.read_digits();

        let date = match (day.parse::<u32>(), month.parse::<u32>(), year.parse::<i32>()) {
            (Ok(d), Ok(m), Ok(y))
                if (1..=31).contains(&d)
                    && (1..=12).contains(&m)
                    && year.len() == 4
                    && (1900..=9999).contains(&y) =>
            {
                NaiveDate::from_ymd_opt(y, m, d)
            }
            _ => None,
        };
        let Some(date) = date else {
            return self.error(start, format!("invalid date {}.{}.{}", day, month, year));
        };

        let mut time = NaiveTime::MIN;
        if self.peek_char() == Some('@') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.index += 1;
            let hours = self.read_digits();
            if self.peek_char() != Some(':') {
                return self.error(start, "expected ':' in time of date literal");
            }
            self.index += 1;
            let minutes = self.read_digits();
            match parse_time(&hours, &minutes) {
                Some(t) => time = t,
                None => return self.error(start, format!("invalid time {}:{}", hours, minutes)),
            }
        }

        Token::with_value(
            TokenKind::DateTime,
            self.span(start),
            TokenValue::Date(NaiveDateTime::new(date, time)),
        )
    }

    /// Reads a compound timespan like `1d4h10m`. Returns `None` if the first
    /// unit letter turns out to start an identifier; in that case nothing
    /// after the leading number has been consumed.
    fn read_timespan(&mut self, start: usize, first: &str) -> Option<Token> {
        let mut seconds: i64 = 0;
        let mut used = String::new();
        let mut amount = String::from(first);

        loop {
            let unit = self.peek_char()?;
            let Some(factor) = timespan_unit(unit) else {
                break;
            };
            if self
                .peek_nth(1)
                .is_some_and(|c| is_ident_continue(c) && !c.is_ascii_digit())
            {
                if used.is_empty() {
                    return None;
                }
                // `1d2x`: the timespan ends after `1d`, `2` is scanned again
                self.push_back_chars(amount.chars().count());
                break;
            }
            self.index += 1;
            if used.contains(unit) {
                return Some(self.error(
                    start,
                    format!("timespan unit '{}' used more than once", unit),
                ));
            }
            used.push(unit);
            let Ok(value) = amount.parse::<i64>() else {
                return Some(self.error(start, format!("invalid timespan amount '{}'", amount)));
            };
            seconds = seconds.saturating_add(value.saturating_mul(factor));

            amount = self.read_digits();
            if amount.is_empty() {
                break;
            }
            if !self.peek_char().is_some_and(|c| timespan_unit(c).is_some()) {
                self.push_back_chars(amount.chars().count());
                break;
            }
        }

        Some(Token::with_value(
            TokenKind::Timespan,
            self.span(start),
            TokenValue::Long(seconds),
        ))
    }
}

fn parse_time(hours: &str, minutes: &str) -> Option<NaiveTime> {
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return None;
    }
    let h = hours.parse::<u32>().ok().filter(|h| *h <= 23)?;
    let m = minutes.parse::<u32>().ok().filter(|m| *m <= 59)?;
    NaiveTime::from_hms_opt(h, m, 0)
}

pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
