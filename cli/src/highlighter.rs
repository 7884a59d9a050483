use nu_ansi_term::{Color, Style};
use quip_core::parser::{Scanner, TokenKind};
use reedline::StyledText;

#[derive(Debug)]
struct PaletteItem<'a> {
    name: &'a str,
    fg: Color,
}

const PALETTE: &[PaletteItem] = &[
    PaletteItem { name: "", fg: Color::White },
    PaletteItem { name: "keyword", fg: Color::Magenta },
    PaletteItem { name: "operator", fg: Color::White },
    PaletteItem { name: "constant", fg: Color::Cyan },
    PaletteItem { name: "number", fg: Color::Cyan },
    PaletteItem { name: "string", fg: Color::Green },
    PaletteItem { name: "sigil", fg: Color::Yellow },
    PaletteItem { name: "variable", fg: Color::Red },
    PaletteItem { name: "punctuation", fg: Color::White },
    PaletteItem { name: "error", fg: Color::LightRed },
];

fn palette(name: &str) -> Color {
    PALETTE
        .iter()
        .find(|item| item.name == name)
        .unwrap_or(&PALETTE[0])
        .fg
}

fn category(kind: TokenKind) -> &'static str {
    use TokenKind::*;
    match kind {
        If | Xor | Public | Temp | Delete | Inspect | List | Delay | Reinterpret => "keyword",
        True | False => "constant",
        Number | Timespan | DateTime => "number",
        String => "string",
        Channel | User => "sigil",
        Identifier | Escaped => "variable",
        Error => "error",
        Comma | Semicolon | Colon | Dot | DotDot | Dollar | OpenBr | ClosedBr | OpenSqBr
        | ClosedSqBr | OpenCurlBr | ClosedCurlBr => "punctuation",
        Separator | Eos => "",
        _ => "operator",
    }
}

/// Colors a line by token kind, using the language's own scanner.
pub struct Highlighter;

impl reedline::Highlighter for Highlighter {
    fn highlight(&self, line: &str, _: usize) -> StyledText {
        let mut output = StyledText::new();
        let chars: Vec<char> = line.chars().collect();
        let text = |start: usize, end: usize| -> std::string::String {
            chars[start.min(chars.len())..end.min(chars.len())].iter().collect()
        };

        let mut scanner = Scanner::new(line);
        let mut curr_end = 0;
        // Every token but Eos covers at least one character.
        for _ in 0..=chars.len() {
            let token = scanner.next_token();
            if token.matches(TokenKind::Eos) {
                break;
            }
            let (start, end) = (token.span.start(), token.span.end());
            if start > curr_end {
                output.push((Style::new().fg(PALETTE[0].fg), text(curr_end, start)));
            }
            let style = Style::new().fg(palette(category(token.kind)));
            output.push((style, text(start.max(curr_end), end)));
            curr_end = curr_end.max(end);
        }
        if curr_end < chars.len() {
            output.push((Style::new().fg(PALETTE[0].fg), text(curr_end, chars.len())));
        }

        output
    }
}
