use crate::tokens::{Token, TokenKind};

/// Import line added above the code when an alias resolves into `goog.array`.
pub const GOOG_ARRAY_REQUIRE: &str = "goog.require('goog.array');";

/// First line of every output unless the banner is turned off.
pub fn generated_by_banner() -> String {
    format!("// Generated by coffee2closure-rs {}", env!("CARGO_PKG_VERSION"))
}

/// Renders tokens back to source text.
///
/// Tokens on the line of the previous token are separated by their column
/// distance; a token on a new line gets a line break and its own column as
/// indentation. Blank lines are not kept, except for one before a block
/// comment opening a line.
pub fn print_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut previous: Option<&Token> = None;
    for token in tokens {
        let mut new_line = false;
        if let Some(previous) = previous {
            new_line = token.loc.start.line != previous.loc.end.line;
            if new_line {
                push_space(&mut out, token.loc.start.column, true);
            } else {
                let gap = token.loc.start.column.saturating_sub(previous.loc.end.column);
                push_space(&mut out, gap, false);
            }
        }
        match token.kind {
            TokenKind::BlockComment => {
                if new_line {
                    out.push('\n');
                }
                out.push_str("/*");
                out.push_str(&token.value);
                out.push_str("*/");
            }
            TokenKind::LineComment => {
                out.push_str("//");
                out.push_str(&token.value);
            }
            _ => out.push_str(&token.value),
        }
        previous = Some(token);
    }
    out
}

fn push_space(out: &mut String, width: u32, new_line: bool) {
    if new_line {
        out.push('\n');
    }
    out.extend(std::iter::repeat(' ').take(width as usize));
}

#[cfg(test)]
mod tests {
    use oxc_span::SourceType;

    use super::*;
    use crate::{syntax::parse, tokens::TokenStream};

    fn reprint(source: &str) -> String {
        let parsed = parse(source, SourceType::cjs()).unwrap();
        print_tokens(&TokenStream::prepare(parsed.tokens, parsed.comments))
    }

    #[test]
    fn keeps_spacing_and_indentation() {
        let source = "if (a)  {\n    b(1, 'x');   // c\n}";
        assert_eq!(reprint(source), source);
    }

    #[test]
    fn collapses_blank_lines() {
        assert_eq!(reprint("a();\n\n\nb();\n"), "a();\nb();");
    }

    #[test]
    fn separates_block_comments_opening_a_line() {
        assert_eq!(reprint("a();\n  /** b */\nc();"), "a();\n  \n/** b */\nc();");
    }
}
