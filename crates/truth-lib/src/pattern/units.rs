//! Structural units of a pattern.

use std::fmt;

/// Repetition applied to the unit it follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Quantifier {
    pub min: u32,
    pub max: Option<u32>,
    pub lazy: bool,
}

impl Quantifier {
    pub const STAR: Self = Self::new(0, None);
    pub const PLUS: Self = Self::new(1, None);
    pub const OPTIONAL: Self = Self::new(0, Some(1));

    pub const fn new(min: u32, max: Option<u32>) -> Self {
        Self {
            min,
            max,
            lazy: false,
        }
    }

    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (0, None) => f.write_str("*")?,
            (1, None) => f.write_str("+")?,
            (0, Some(1)) => f.write_str("?")?,
            (min, None) => write!(f, "{{{min},}}")?,
            (min, Some(max)) if min == max => write!(f, "{{{min}}}")?,
            (min, Some(max)) => write!(f, "{{{min},{max}}}")?,
        }
        if self.lazy {
            f.write_str("?")?;
        }
        Ok(())
    }
}

/// Character classes expressed with a backslash, plus the `.` wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignKind {
    Any,
    Digit,
    NotDigit,
    Word,
    NotWord,
    Whitespace,
    NotWhitespace,
}

impl SignKind {
    pub fn from_escape(ch: char) -> Option<Self> {
        Some(match ch {
            'd' => Self::Digit,
            'D' => Self::NotDigit,
            'w' => Self::Word,
            'W' => Self::NotWord,
            's' => Self::Whitespace,
            'S' => Self::NotWhitespace,
            _ => return None,
        })
    }

    pub fn matches(self, ch: char) -> bool {
        let is_word = ch.is_alphanumeric() || ch == '_';
        match self {
            Self::Any => ch != '\n',
            Self::Digit => ch.is_ascii_digit(),
            Self::NotDigit => !ch.is_ascii_digit(),
            Self::Word => is_word,
            Self::NotWord => !is_word,
            Self::Whitespace => ch.is_whitespace(),
            Self::NotWhitespace => !ch.is_whitespace(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Any => ".",
            Self::Digit => r"\d",
            Self::NotDigit => r"\D",
            Self::Word => r"\w",
            Self::NotWord => r"\W",
            Self::Whitespace => r"\s",
            Self::NotWhitespace => r"\S",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SetItem {
    Char(char),
    Range(char, char),
    Sign(SignKind),
}

/// A bracketed character set such as `[a-z_]` or `[^,]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Set {
    pub negated: bool,
    pub items: Vec<SetItem>,
    pub quantifier: Option<Quantifier>,
}

impl Set {
    /// Whether the set admits the character.
    pub fn includes(&self, ch: char) -> bool {
        let hit = self.items.iter().any(|item| match *item {
            SetItem::Char(c) => c == ch,
            SetItem::Range(lo, hi) => lo <= ch && ch <= hi,
            SetItem::Sign(sign) => sign.matches(ch),
        });
        hit != self.negated
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grapheme {
    pub grapheme: char,
    pub quantifier: Option<Quantifier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sign {
    pub kind: SignKind,
    pub quantifier: Option<Quantifier>,
}

/// A parenthesized group of alternative cases.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Group {
    pub cases: Vec<Vec<Unit>>,
    pub quantifier: Option<Quantifier>,
}

/// Infix flavor bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InfixFlags(u8);

impl InfixFlags {
    pub const NONE: Self = Self(0);
    /// `<A>`
    pub const PORTABILITY: Self = Self(1);
    /// `<<A>>`
    pub const POPULATION: Self = Self(1 << 1);
    /// `<:A>`
    pub const NOMINAL: Self = Self(1 << 2);

    #[inline]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// A placeholder region that captures text correlated with another type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Infix {
    /// Terms left of the joint (or all terms when there is no joint).
    pub lhs: Vec<String>,
    /// Terms right of the joint.
    pub rhs: Vec<String>,
    pub flags: InfixFlags,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Unit {
    Grapheme(Grapheme),
    Set(Set),
    Sign(Sign),
    Group(Group),
    Infix(Infix),
}

impl Unit {
    pub fn quantifier(&self) -> Option<Quantifier> {
        match self {
            Unit::Grapheme(g) => g.quantifier,
            Unit::Set(s) => s.quantifier,
            Unit::Sign(s) => s.quantifier,
            Unit::Group(g) => g.quantifier,
            Unit::Infix(_) => None,
        }
    }

    /// Attach a quantifier. Returns false for units that cannot repeat.
    pub(crate) fn set_quantifier(&mut self, quantifier: Quantifier) -> bool {
        let slot = match self {
            Unit::Grapheme(g) => &mut g.quantifier,
            Unit::Set(s) => &mut s.quantifier,
            Unit::Sign(s) => &mut s.quantifier,
            Unit::Group(g) => &mut g.quantifier,
            Unit::Infix(_) => return false,
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(quantifier);
        true
    }

    /// Regex source for this unit. Infixes compile to a catch-all capture.
    pub(crate) fn write_regex(&self, out: &mut String) {
        match self {
            Unit::Grapheme(g) => out.push_str(&regex_syntax::escape(g.grapheme.encode_utf8(&mut [0; 4]))),
            Unit::Set(set) => {
                out.push('[');
                if set.negated {
                    out.push('^');
                }
                for item in &set.items {
                    match *item {
                        SetItem::Char(c) => push_class_char(out, c),
                        SetItem::Range(lo, hi) => {
                            push_class_char(out, lo);
                            out.push('-');
                            push_class_char(out, hi);
                        }
                        SetItem::Sign(sign) => out.push_str(sign.as_str()),
                    }
                }
                out.push(']');
            }
            Unit::Sign(sign) => out.push_str(sign.kind.as_str()),
            Unit::Group(group) => {
                out.push('(');
                for (i, case) in group.cases.iter().enumerate() {
                    if i > 0 {
                        out.push('|');
                    }
                    for unit in case {
                        unit.write_regex(out);
                    }
                }
                out.push(')');
            }
            Unit::Infix(_) => out.push_str("(.+)"),
        }
        if let Some(q) = self.quantifier() {
            out.push_str(&q.to_string());
        }
    }
}

fn push_class_char(out: &mut String, ch: char) {
    out.push_str(&regex_syntax::escape(ch.encode_utf8(&mut [0; 4])));
}

fn push_pattern_char(f: &mut fmt::Formatter<'_>, ch: char, specials: &str) -> fmt::Result {
    if specials.contains(ch) {
        write!(f, "\\{ch}")
    } else {
        write!(f, "{ch}")
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Grapheme(g) => push_pattern_char(f, g.grapheme, r"\/.()[]{}<>|*+?")?,
            Unit::Set(set) => {
                f.write_str("[")?;
                if set.negated {
                    f.write_str("^")?;
                }
                for item in &set.items {
                    match *item {
                        SetItem::Char(c) => push_pattern_char(f, c, r"\]-^")?,
                        SetItem::Range(lo, hi) => {
                            push_pattern_char(f, lo, r"\]-^")?;
                            f.write_str("-")?;
                            push_pattern_char(f, hi, r"\]-^")?;
                        }
                        SetItem::Sign(sign) => f.write_str(sign.as_str())?,
                    }
                }
                f.write_str("]")?;
            }
            Unit::Sign(sign) => f.write_str(sign.kind.as_str())?,
            Unit::Group(group) => {
                f.write_str("(")?;
                for (i, case) in group.cases.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    for unit in case {
                        write!(f, "{unit}")?;
                    }
                }
                f.write_str(")")?;
            }
            Unit::Infix(infix) => {
                let (open, close) = if infix.flags.contains(InfixFlags::POPULATION) {
                    ("<<", ">>")
                } else if infix.flags.contains(InfixFlags::NOMINAL) {
                    ("<:", ">")
                } else {
                    ("<", ">")
                };
                f.write_str(open)?;
                f.write_str(&infix.lhs.join(", "))?;
                if !infix.rhs.is_empty() {
                    if !infix.lhs.is_empty() {
                        f.write_str(" ")?;
                    }
                    if !infix.flags.contains(InfixFlags::NOMINAL) || !infix.lhs.is_empty() {
                        f.write_str(": ")?;
                    }
                    f.write_str(&infix.rhs.join(", "))?;
                }
                f.write_str(close)?;
            }
        }
        if let Some(q) = self.quantifier() {
            write!(f, "{q}")?;
        }
        Ok(())
    }
}
