//! Lexer for the pattern dialect.
//!
//! Produces span-based tokens. Characters the token table does not recognize
//! are literal graphemes, so the lexer never fails.

use std::ops::Range;

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `\d`, `\D`, `\w`, `\W`, `\s`, `\S`
    #[regex(r"\\[dDwWsS]", priority = 10)]
    Sign,

    /// Backslash followed by any other character
    #[regex(r"\\.", priority = 5)]
    Escape,

    /// Whole character set, brackets included
    #[regex(r"\[(?:[^\]\\]|\\.)*\]")]
    Set,

    #[regex(r"<<[^<>]*>>", priority = 10)]
    PopulationInfix,

    #[regex(r"<:[^<>]*>", priority = 8)]
    NominalInfix,

    #[regex(r"<[^<>]*>", priority = 6)]
    PortabilityInfix,

    #[token("(")]
    GroupOpen,

    #[token(")")]
    GroupClose,

    #[token("|")]
    Alternation,

    #[token(".")]
    Any,

    #[regex(r"[*+?]\??")]
    #[regex(r"\{[0-9]+(?:,[0-9]*)?\}\??")]
    Quantifier,

    /// Any character without special meaning
    Literal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, span: Range<usize>) -> Self {
        Self { kind, span }
    }
}

/// Tokenizes pattern text (delimiters already stripped).
///
/// On an unrecognized character the lexer emits a single `Literal` and
/// restarts right after it, so a broken set like `[a\d` still yields the sign.
pub fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut offset = 0;
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(kind) => tokens.push(Token::new(kind, offset + span.start..offset + span.end)),
            Err(()) => {
                let start = offset + span.start;
                let Some(ch) = source[start..].chars().next() else {
                    break;
                };
                offset = start + ch.len_utf8();
                tokens.push(Token::new(TokenKind::Literal, start..offset));
                lexer = TokenKind::lexer(&source[offset..]);
            }
        }
    }

    tokens
}

#[inline]
pub fn token_text<'s>(source: &'s str, token: &Token) -> &'s str {
    &source[token.span.clone()]
}
