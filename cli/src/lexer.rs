use quip_core::parser::{Scanner, TokenKind};

/// Number of brackets left open at the end of `buffer`.
///
/// Returns `None` when the buffer holds a malformed token (e.g. an
/// unclosed string), so the line is submitted and the error reported.
pub fn calculate_depth(buffer: &str) -> Option<usize> {
    let mut depth: isize = 0;
    let mut scanner = Scanner::new(buffer);

    for _ in 0..=buffer.chars().count() {
        let token = scanner.next_token();
        match token.kind {
            TokenKind::OpenBr | TokenKind::Lambda | TokenKind::OpenSqBr | TokenKind::OpenCurlBr => {
                depth += 1
            }
            TokenKind::ClosedBr | TokenKind::ClosedSqBr | TokenKind::ClosedCurlBr => depth -= 1,
            TokenKind::Error => return None,
            TokenKind::Eos => break,
            _ => {}
        }
    }

    Some(depth.max(0) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth() {
        assert_eq!(calculate_depth(":calc {1, 2"), Some(1));
        assert_eq!(calculate_depth(":calc \\(a: (a"), Some(2));
        assert_eq!(calculate_depth(":calc 1)"), Some(0));
        assert_eq!(calculate_depth(":calc \"open"), None);
    }
}
