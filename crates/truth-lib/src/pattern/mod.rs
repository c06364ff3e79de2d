//! Pattern compiler.
//!
//! A pattern is a regex-like unit sequence written as a declaration subject,
//! e.g. `/\d+/ : Number` (total) or `/\d+ : Number` (partial). Units compile
//! into a `regex_automata::meta::Regex` anchored at both ends. Infixes compile
//! to catch-all captures so `test` is an expedient check rather than an
//! exhaustive one.
//!
//! Compilation never fails loudly: a pattern that does not parse or compile
//! is kept as an invalid pattern whose matching operations answer `false` or
//! empty.

mod lexer;
mod parser;
mod units;


use std::cell::OnceCell;
use std::fmt;
use std::hash::{Hash, Hasher};

use regex_automata::meta::Regex;
use truth_core::syntax;

pub use units::{
    Grapheme, Group, Infix, InfixFlags, Quantifier, Set, SetItem, Sign, SignKind, Unit,
};

/// Default NFA size limit for compiled patterns.
pub const DEFAULT_SIZE_LIMIT: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    /// `capture` refuses patterns with infixes; they must go through `exec`.
    #[error("patterns with infixes must be executed, not captured")]
    HasInfixes,

    #[error("invalid pattern: {0}")]
    Invalid(String),
}

/// Text captured for one infix by [`Pattern::exec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfixCapture<'p> {
    pub infix: &'p Infix,
    pub value: String,
}

#[derive(Debug)]
pub struct Pattern {
    units: Vec<Unit>,
    is_total: bool,
    hash: String,
    /// Body text as written, delimiters excluded.
    body: String,
    matcher: Option<Regex>,
    error: Option<String>,
    can_match_combinator: OnceCell<bool>,
}

impl Pattern {
    /// Compiles a pattern declaration such as `/\d+/`.
    ///
    /// `hash` identifies the annotation set written to the right of the pattern.
    pub fn compile(declaration: &str, hash: impl Into<String>, size_limit: usize) -> Self {
        let hash = hash.into();
        let text = declaration
            .strip_prefix(syntax::PATTERN_DELIMITER)
            .unwrap_or(declaration);

        let (body, is_total) = match text.strip_suffix(syntax::PATTERN_DELIMITER) {
            Some(rest) if !ends_with_escape(rest) => (rest, true),
            _ => (text, false),
        };

        let mut pattern = Pattern {
            units: Vec::new(),
            is_total,
            hash,
            body: body.to_owned(),
            matcher: None,
            error: None,
            can_match_combinator: OnceCell::new(),
        };

        if body.trim().is_empty() {
            pattern.error = Some("pattern is empty".to_string());
            return pattern;
        }

        match parser::parse(body) {
            Ok(units) => pattern.units = units,
            Err(msg) => {
                log::trace!("pattern `{declaration}` rejected by parser: {msg}");
                pattern.error = Some(msg);
                return pattern;
            }
        }

        let source = pattern.regex_source();
        let built = Regex::builder()
            .configure(Regex::config().nfa_size_limit(Some(size_limit)))
            .build(&source);

        match built {
            Ok(re) => pattern.matcher = Some(re),
            Err(e) => {
                log::trace!("pattern `{declaration}` failed to compile as `{source}`: {e}");
                pattern.error = Some(e.to_string());
            }
        }

        pattern
    }

    /// Compiles with the default size limit.
    pub fn new(declaration: &str, hash: impl Into<String>) -> Self {
        Self::compile(declaration, hash, DEFAULT_SIZE_LIMIT)
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Total patterns match a whole annotation side; partial ones match single subjects.
    pub fn is_total(&self) -> bool {
        self.is_total
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn is_valid(&self) -> bool {
        self.matcher.is_some()
    }

    /// Why the pattern is invalid, if it is.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Pre-order walk over the unit tree (group cases are entered, infixes are leaves).
    pub fn walk(&self) -> Vec<&Unit> {
        fn recurse<'u>(units: &'u [Unit], out: &mut Vec<&'u Unit>) {
            for unit in units {
                out.push(unit);
                if let Unit::Group(group) = unit {
                    for case in &group.cases {
                        recurse(case, out);
                    }
                }
            }
        }

        let mut out = Vec::new();
        recurse(&self.units, &mut out);
        out
    }

    /// Whether any grapheme or set outside of infixes admits the combinator.
    pub fn can_match_combinator(&self) -> bool {
        *self.can_match_combinator.get_or_init(|| {
            self.walk().into_iter().any(|unit| match unit {
                Unit::Grapheme(g) => g.grapheme == syntax::COMBINATOR,
                Unit::Set(set) => set.includes(syntax::COMBINATOR),
                _ => false,
            })
        })
    }

    pub fn has_infixes(&self) -> bool {
        self.walk().iter().any(|u| matches!(u, Unit::Infix(_)))
    }

    /// Infixes carrying all of `flags`, in walk order. `InfixFlags::NONE` selects all.
    pub fn infixes(&self, flags: InfixFlags) -> Vec<&Infix> {
        self.walk()
            .into_iter()
            .filter_map(|u| match u {
                Unit::Infix(nfx) if nfx.flags.contains(flags) => Some(nfx),
                _ => None,
            })
            .collect()
    }

    /// Expedient match: infixes are treated as catch-alls.
    pub fn test(&self, input: &str) -> bool {
        let Some(re) = &self.matcher else {
            return false;
        };
        if input.trim().is_empty() {
            return false;
        }
        re.is_match(input)
    }

    /// Maps each infix to the text found in its place.
    ///
    /// Returns an empty list when the pattern has no infixes, is invalid, or
    /// does not match.
    pub fn exec(&self, input: &str) -> Vec<InfixCapture<'_>> {
        let Some(re) = &self.matcher else {
            return Vec::new();
        };

        let mut ordinals = Vec::new();
        let mut infixes = Vec::new();
        let mut ordinal = 0;
        for unit in self.walk() {
            match unit {
                Unit::Infix(nfx) => {
                    ordinal += 1;
                    ordinals.push(ordinal);
                    infixes.push(nfx);
                }
                Unit::Group(_) => ordinal += 1,
                _ => {}
            }
        }

        if infixes.is_empty() {
            return Vec::new();
        }

        let mut caps = re.create_captures();
        re.captures(input, &mut caps);
        if !caps.is_match() {
            return Vec::new();
        }

        infixes
            .into_iter()
            .zip(ordinals)
            .map(|(infix, ordinal)| InfixCapture {
                infix,
                value: caps
                    .get_group(ordinal)
                    .map(|span| input[span.range()].to_owned())
                    .unwrap_or_default(),
            })
            .collect()
    }

    /// Whole match followed by each group's text, or empty when nothing matched.
    pub fn capture(&self, input: &str) -> Result<Vec<Option<String>>, PatternError> {
        if self.has_infixes() {
            return Err(PatternError::HasInfixes);
        }
        let Some(re) = &self.matcher else {
            return Ok(Vec::new());
        };

        let mut caps = re.create_captures();
        re.captures(input, &mut caps);
        if !caps.is_match() {
            return Ok(Vec::new());
        }

        Ok((0..caps.group_len())
            .map(|i| caps.get_group(i).map(|span| input[span.range()].to_owned()))
            .collect())
    }

    /// Serialized form, optionally prefixed with the annotation hash.
    pub fn to_string_with_hash(&self) -> String {
        self.render(true)
    }

    fn render(&self, include_hash: bool) -> String {
        let mut out = String::new();
        out.push(syntax::PATTERN_DELIMITER);
        if include_hash {
            out.push_str(&self.hash);
        }
        if self.units.is_empty() {
            out.push_str(&self.body);
        } else {
            for unit in &self.units {
                out.push_str(&unit.to_string());
            }
        }
        if self.is_total {
            out.push(syntax::PATTERN_DELIMITER);
        }
        out
    }

    fn regex_source(&self) -> String {
        let mut out = String::from("^(?:");
        for unit in &self.units {
            unit.write_regex(&mut out);
        }
        out.push_str(")$");
        out
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.is_total == other.is_total && self.body == other.body
    }
}

impl Eq for Pattern {}

impl Hash for Pattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.is_total.hash(state);
        self.body.hash(state);
    }
}

fn ends_with_escape(text: &str) -> bool {
    text.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}
