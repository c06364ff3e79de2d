//! Recursive-descent parser from pattern tokens to units.

use super::lexer::{Token, TokenKind, lex, token_text};
use super::units::{Grapheme, Group, Infix, InfixFlags, Quantifier, Set, SetItem, Sign, SignKind, Unit};

/// Parses pattern body text into a flat top-level unit sequence.
pub fn parse(source: &str) -> Result<Vec<Unit>, String> {
    let tokens = lex(source);
    let mut parser = Parser {
        source,
        tokens: &tokens,
        pos: 0,
    };

    let units = parser.sequence()?;
    match parser.peek() {
        None => Ok(units),
        Some(t) if t.kind == TokenKind::Alternation => {
            Err("alternation must be enclosed in a group".to_string())
        }
        Some(t) if t.kind == TokenKind::GroupClose => {
            Err(format!("unmatched `)` at offset {}", t.span.start))
        }
        Some(t) => Err(format!("unexpected `{}`", token_text(source, t))),
    }
}

struct Parser<'s, 't> {
    source: &'s str,
    tokens: &'t [Token],
    pos: usize,
}

impl<'s, 't> Parser<'s, 't> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    /// Units up to (not including) `|`, `)` or end of input.
    fn sequence(&mut self) -> Result<Vec<Unit>, String> {
        let mut units: Vec<Unit> = Vec::new();

        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Alternation | TokenKind::GroupClose => break,
                TokenKind::Quantifier => {
                    self.pos += 1;
                    let text = token_text(self.source, token);
                    let quantifier = parse_quantifier(text)?;
                    let Some(last) = units.last_mut() else {
                        return Err(format!("quantifier `{text}` has nothing to repeat"));
                    };
                    if !last.set_quantifier(quantifier) {
                        return Err(format!("quantifier `{text}` cannot apply here"));
                    }
                }
                _ => units.push(self.atom()?),
            }
        }

        Ok(units)
    }

    fn atom(&mut self) -> Result<Unit, String> {
        let Some(token) = self.bump() else {
            return Err("unexpected end of pattern".to_string());
        };
        let text = token_text(self.source, token);

        let unit = match token.kind {
            TokenKind::Literal => Unit::Grapheme(Grapheme {
                grapheme: first_char(text)?,
                quantifier: None,
            }),
            TokenKind::Escape => Unit::Grapheme(Grapheme {
                grapheme: first_char(&text[1..])?,
                quantifier: None,
            }),
            TokenKind::Sign => Unit::Sign(Sign {
                kind: sign_of(&text[1..])?,
                quantifier: None,
            }),
            TokenKind::Any => Unit::Sign(Sign {
                kind: SignKind::Any,
                quantifier: None,
            }),
            TokenKind::Set => Unit::Set(parse_set(&text[1..text.len() - 1])?),
            TokenKind::PopulationInfix => {
                parse_infix(&text[2..text.len() - 2], InfixFlags::POPULATION)?
            }
            TokenKind::NominalInfix => parse_infix(&text[2..text.len() - 1], InfixFlags::NOMINAL)?,
            TokenKind::PortabilityInfix => {
                parse_infix(&text[1..text.len() - 1], InfixFlags::PORTABILITY)?
            }
            TokenKind::GroupOpen => self.group(token.span.start)?,
            TokenKind::GroupClose | TokenKind::Alternation | TokenKind::Quantifier => {
                return Err(format!("unexpected `{text}`"));
            }
        };

        Ok(unit)
    }

    fn group(&mut self, open_at: usize) -> Result<Unit, String> {
        let mut cases = vec![self.sequence()?];

        loop {
            match self.bump() {
                Some(t) if t.kind == TokenKind::Alternation => cases.push(self.sequence()?),
                Some(t) if t.kind == TokenKind::GroupClose => break,
                _ => return Err(format!("unclosed group opened at offset {open_at}")),
            }
        }

        Ok(Unit::Group(Group {
            cases,
            quantifier: None,
        }))
    }
}

fn first_char(text: &str) -> Result<char, String> {
    text.chars()
        .next()
        .ok_or_else(|| "dangling escape".to_string())
}

fn sign_of(text: &str) -> Result<SignKind, String> {
    first_char(text).and_then(|c| SignKind::from_escape(c).ok_or_else(|| format!("unknown sign `\\{c}`")))
}

fn parse_quantifier(text: &str) -> Result<Quantifier, String> {
    let (body, lazy) = match text.strip_suffix('?') {
        Some(rest) if !rest.is_empty() => (rest, true),
        _ => (text, false),
    };

    let quantifier = match body {
        "*" => Quantifier::STAR,
        "+" => Quantifier::PLUS,
        "?" => Quantifier::OPTIONAL,
        _ => {
            let inner = body
                .strip_prefix('{')
                .and_then(|b| b.strip_suffix('}'))
                .ok_or_else(|| format!("malformed quantifier `{text}`"))?;
            let number = |s: &str| {
                s.parse::<u32>()
                    .map_err(|_| format!("repetition count out of range in `{text}`"))
            };
            match inner.split_once(',') {
                None => {
                    let n = number(inner)?;
                    Quantifier::new(n, Some(n))
                }
                Some((min, "")) => Quantifier::new(number(min)?, None),
                Some((min, max)) => {
                    let (min, max) = (number(min)?, number(max)?);
                    if max < min {
                        return Err(format!("repetition bounds are reversed in `{text}`"));
                    }
                    Quantifier::new(min, Some(max))
                }
            }
        }
    };

    Ok(if lazy { quantifier.lazy() } else { quantifier })
}

fn parse_set(inner: &str) -> Result<Set, String> {
    let (negated, body) = match inner.strip_prefix('^') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };

    // First pass resolves escapes so ranges can be detected uniformly.
    enum Piece {
        Char(char),
        Sign(SignKind),
        Dash,
    }

    let mut pieces = Vec::new();
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = chars.next().ok_or_else(|| "dangling escape in set".to_string())?;
                match SignKind::from_escape(escaped) {
                    Some(sign) => pieces.push(Piece::Sign(sign)),
                    None => pieces.push(Piece::Char(escaped)),
                }
            }
            '-' => pieces.push(Piece::Dash),
            c => pieces.push(Piece::Char(c)),
        }
    }

    let mut items = Vec::new();
    let mut i = 0;
    while i < pieces.len() {
        match pieces[i] {
            Piece::Char(lo) => {
                if let (Some(Piece::Dash), Some(Piece::Char(hi))) = (pieces.get(i + 1), pieces.get(i + 2)) {
                    if *hi < lo {
                        return Err(format!("set range `{lo}-{hi}` is reversed"));
                    }
                    items.push(SetItem::Range(lo, *hi));
                    i += 3;
                    continue;
                }
                items.push(SetItem::Char(lo));
            }
            Piece::Sign(sign) => items.push(SetItem::Sign(sign)),
            Piece::Dash => items.push(SetItem::Char('-')),
        }
        i += 1;
    }

    if items.is_empty() && !negated {
        return Err("empty set".to_string());
    }

    Ok(Set {
        negated,
        items,
        quantifier: None,
    })
}

fn parse_infix(content: &str, flags: InfixFlags) -> Result<Unit, String> {
    let terms = |side: &str| -> Vec<String> {
        side.split(truth_core::syntax::COMBINATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect()
    };

    let (lhs, rhs) = if flags.contains(InfixFlags::NOMINAL) {
        (Vec::new(), terms(content))
    } else {
        match content.split_once(truth_core::syntax::JOINT) {
            Some((l, r)) => (terms(l), terms(r)),
            None => (terms(content), Vec::new()),
        }
    };

    if lhs.is_empty() && rhs.is_empty() {
        return Err("infix names no types".to_string());
    }

    Ok(Unit::Infix(Infix { lhs, rhs, flags }))
}
