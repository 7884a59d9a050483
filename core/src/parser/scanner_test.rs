use chrono::{NaiveDate, Timelike};

use super::scanner::Scanner;
use super::token::{Token, TokenKind};

fn tokens(input: &str) -> Vec<Token> {
    let mut scanner = Scanner::new(input);
    let mut result = Vec::new();
    loop {
        let token = scanner.next_token();
        if token.matches(TokenKind::Eos) {
            return result;
        }
        result.push(token);
    }
}

fn kinds(input: &str) -> Vec<TokenKind> {
    tokens(input).into_iter().map(|t| t.kind).collect()
}

fn single(input: &str) -> Token {
    let mut all = tokens(input);
    assert_eq!(all.len(), 1, "expected a single token for {:?}: {:?}", input, all);
    all.remove(0)
}

#[test]
fn test_operators() {
    use TokenKind::*;
    assert_eq!(kinds("+-*/%^"), vec![Add, Sub, Mul, Div, Mod, Power]);
    assert_eq!(
        kinds("&& || ^^ & |"),
        vec![BoolAnd, Separator, BoolOr, Separator, DoubleCaret, Separator, IntAnd, Separator, IntOr]
    );
    assert_eq!(kinds("<<>><=>===!="), vec![LeftShift, RightShift, Le, Ge, Eq, Neq]);
    assert_eq!(
        kinds("-> ?! ? !"),
        vec![Assignment, Separator, QuestExclamation, Separator, Question, Separator, Exclamation]
    );
    assert_eq!(kinds("..$.;,:"), vec![DotDot, Dollar, Dot, Semicolon, Comma, Colon]);
    assert_eq!(kinds("()[]{}"), vec![OpenBr, ClosedBr, OpenSqBr, ClosedSqBr, OpenCurlBr, ClosedCurlBr]);
}

#[test]
fn test_backslash_forms() {
    assert_eq!(kinds("\\("), vec![TokenKind::Lambda]);
    assert_eq!(kinds("\\ "), vec![TokenKind::IntDiv, TokenKind::Separator]);
    let escaped = single("\\if");
    assert_eq!(escaped.kind, TokenKind::Escaped);
    assert_eq!(escaped.string_value(), "if");
}

#[test]
fn test_keywords_and_identifiers() {
    use TokenKind::*;
    assert_eq!(
        kinds("true false if xor public temp del inspect list delay reinterpret"),
        vec![
            True, Separator, False, Separator, If, Separator, Xor, Separator, Public, Separator,
            Temp, Separator, Delete, Separator, Inspect, Separator, List, Separator, Delay,
            Separator, Reinterpret
        ]
    );
    let id = single("foo_bar2");
    assert_eq!(id.kind, Identifier);
    assert_eq!(id.string_value(), "foo_bar2");
}

#[test]
fn test_lone_underscore_is_an_error() {
    assert_eq!(single("_").kind, TokenKind::Error);
}

#[test]
fn test_whitespace_collapses_into_one_separator() {
    assert_eq!(
        kinds("a   \t b"),
        vec![TokenKind::Identifier, TokenKind::Separator, TokenKind::Identifier]
    );
}

#[test]
fn test_skip_whitespace_mode() {
    let mut scanner = Scanner::new("a  b");
    scanner.set_skip_whitespace(true);
    assert_eq!(scanner.next_token().kind, TokenKind::Identifier);
    assert_eq!(scanner.next_token().string_value(), "b");
}

#[test]
fn test_separator_survives_mode_switch() {
    let mut scanner = Scanner::new("a b");
    scanner.set_skip_whitespace(true);
    assert_eq!(scanner.next_token().string_value(), "a");
    // Looking ahead in skip mode must not drop the separator.
    assert_eq!(scanner.look_ahead().string_value(), "b");
    scanner.set_skip_whitespace(false);
    assert_eq!(scanner.next_token().kind, TokenKind::Separator);
}

#[test]
fn test_push_back() {
    let mut scanner = Scanner::new("a b");
    let a = scanner.next_token();
    scanner.push_back(a.clone());
    assert_eq!(scanner.next_token(), a);
    assert!(scanner.match_kind(TokenKind::Separator));
    assert!(!scanner.match_kind(TokenKind::Separator));
}

#[test]
fn test_numbers() {
    assert_eq!(single("42").number_value(), 42.0);
    assert_eq!(single("3.25").number_value(), 3.25);
    assert_eq!(single(".5").number_value(), 0.5);
    assert_eq!(single("1.5e3").number_value(), 1500.0);
    assert_eq!(single("2E-1").number_value(), 0.2);
}

#[test]
fn test_degrees_convert_to_radians() {
    let token = single("180°");
    assert!((token.number_value() - core::f64::consts::PI).abs() < 1e-12);
}

#[test]
fn test_radixed_integer() {
    assert_eq!(single("16#ff").number_value(), 255.0);
    assert_eq!(single("2#1010").number_value(), 10.0);
    assert_eq!(single("2#102").kind, TokenKind::Error);
    assert_eq!(tokens("37#1")[0].kind, TokenKind::Error);
}

#[test]
fn test_radix_operator() {
    let all = tokens("0x16:255");
    assert_eq!(all[0].kind, TokenKind::Radix);
    assert_eq!(all[0].long_value(), 16);
    assert_eq!(all[1].number_value(), 255.0);
}

#[test]
fn test_number_followed_by_range() {
    assert_eq!(
        kinds("1..5"),
        vec![TokenKind::Number, TokenKind::DotDot, TokenKind::Number]
    );
    assert_eq!(
        kinds("1.5..2"),
        vec![TokenKind::Number, TokenKind::DotDot, TokenKind::Number]
    );
}

#[test]
fn test_time_literal() {
    let token = single("13:45");
    assert_eq!(token.kind, TokenKind::DateTime);
    let date = token.date_value().unwrap();
    assert_eq!((date.hour(), date.minute()), (13, 45));
}

#[test]
fn test_date_literals() {
    let date = single("24.12.2012").date_value().unwrap();
    assert_eq!(date.date(), NaiveDate::from_ymd_opt(2012, 12, 24).unwrap());
    assert_eq!(date.hour(), 0);

    let with_time = single("01.02.2020@08:30").date_value().unwrap();
    assert_eq!(with_time.date(), NaiveDate::from_ymd_opt(2020, 2, 1).unwrap());
    assert_eq!((with_time.hour(), with_time.minute()), (8, 30));

    assert_eq!(single("31.02.2020").kind, TokenKind::Error);
}

#[test]
fn test_timespans() {
    assert_eq!(single("10m").long_value(), 600);
    assert_eq!(single("1d4h10m").long_value(), 86_400 + 4 * 3_600 + 600);
    assert_eq!(single("1y2w").long_value(), 31_536_000 + 2 * 604_800);
    assert_eq!(single("1d1d").kind, TokenKind::Error);
}

#[test]
fn test_unit_letter_starting_an_identifier() {
    // `2max` is the number 2 followed by `max`, not a timespan.
    let all = tokens("2max");
    assert_eq!(all[0].kind, TokenKind::Number);
    assert_eq!(all[1].string_value(), "max");
}

#[test]
fn test_timespan_followed_by_identifier() {
    let all = tokens("1d2x");
    assert_eq!(all[0].kind, TokenKind::Timespan);
    assert_eq!(all[0].long_value(), 86_400);
    assert_eq!(all[1].number_value(), 2.0);
    assert_eq!(all[2].string_value(), "x");
}

#[test]
fn test_strings() {
    assert_eq!(single("\"hello world\"").string_value(), "hello world");
    assert_eq!(single(r#""say \"hi\"""#).string_value(), "say \"hi\"");
    assert_eq!(single(r#""back\\slash""#).string_value(), "back\\slash");
    assert_eq!(single("\"unclosed").kind, TokenKind::Error);
}

#[test]
fn test_sigils() {
    let channel = single("#my-channel");
    assert_eq!(channel.kind, TokenKind::Channel);
    assert_eq!(channel.string_value(), "#my-channel");

    let user = single("@nick[away]");
    assert_eq!(user.kind, TokenKind::User);
    assert_eq!(user.string_value(), "@nick[away]");

    let all = tokens("@nick->x");
    assert_eq!(all[0].string_value(), "@nick");
    assert_eq!(all[1].kind, TokenKind::Assignment);

    assert_eq!(single("#").kind, TokenKind::Error);
}

#[test]
fn test_unknown_symbol_is_error_token() {
    let all = tokens("1 ~ 2");
    assert_eq!(all[2].kind, TokenKind::Error);
    assert_eq!(all[2].string_value(), "unknown symbol '~'");
    assert_eq!(all[4].kind, TokenKind::Number);
}

#[test]
fn test_spans() {
    let all = tokens("ab + 12");
    assert_eq!(all[0].span.0, 0..2);
    assert_eq!(all[2].span.0, 3..4);
    assert_eq!(all[4].span.0, 5..7);
}
