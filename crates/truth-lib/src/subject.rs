//! Subjects: the atomic identities at a path position.

use std::fmt;
use std::rc::Rc;

use truth_core::{Interner, Symbol, syntax};

use crate::pattern::Pattern;

/// An identifier, possibly pluralized into a list term (`Item...`).
///
/// Terms are compared by interned name and plurality, so `Item` and
/// `Item...` are distinct terms that share a singular form.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Term {
    name: Symbol,
    is_list: bool,
}

impl Term {
    pub fn new(name: Symbol, is_list: bool) -> Self {
        Self { name, is_list }
    }

    /// Interns the term written as `text`.
    pub fn parse(interner: &mut Interner, text: &str) -> Self {
        let (name, is_list) = split_list(text.trim());
        Self::new(interner.intern(name), is_list)
    }

    /// Resolves the term written as `text` without interning.
    ///
    /// Returns `None` when no statement has ever used that name.
    pub fn lookup(interner: &Interner, text: &str) -> Option<Self> {
        let (name, is_list) = split_list(text.trim());
        interner.get(name).map(|sym| Self::new(sym, is_list))
    }

    pub fn name(self) -> Symbol {
        self.name
    }

    pub fn is_list(self) -> bool {
        self.is_list
    }

    pub fn singular(self) -> Self {
        Self::new(self.name, false)
    }

    /// Numeric identity used to build clarifier keys.
    pub fn id(self) -> u64 {
        (u64::from(self.name.as_u32()) << 1) | u64::from(self.is_list)
    }

    pub fn display(self, interner: &Interner) -> TermDisplay<'_> {
        TermDisplay {
            term: self,
            interner,
        }
    }
}

fn split_list(text: &str) -> (&str, bool) {
    match text.strip_suffix(syntax::LIST) {
        Some(name) if !name.is_empty() => (name, true),
        _ => (text, false),
    }
}

pub struct TermDisplay<'i> {
    term: Term,
    interner: &'i Interner,
}

impl fmt::Display for TermDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.interner.resolve(self.term.name))?;
        if self.term.is_list {
            f.write_str(syntax::LIST)?;
        }
        Ok(())
    }
}

/// What a declaration names.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Subject {
    Term(Term),
    Pattern(Rc<Pattern>),
    /// A reference to another document, e.g. `shapes.truth`.
    Uri(Symbol),
    Anonymous,
}

impl Subject {
    pub fn as_term(&self) -> Option<Term> {
        match self {
            Subject::Term(term) => Some(*term),
            _ => None,
        }
    }

    pub fn as_pattern(&self) -> Option<&Pattern> {
        match self {
            Subject::Pattern(pattern) => Some(pattern),
            _ => None,
        }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, Subject::Pattern(_))
    }

    pub fn is_uri(&self) -> bool {
        matches!(self, Subject::Uri(_))
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Subject::Anonymous)
    }

    /// List terms declare the intrinsic side of a list.
    pub fn is_list(&self) -> bool {
        self.as_term().is_some_and(Term::is_list)
    }

    pub fn display<'a>(&'a self, interner: &'a Interner) -> SubjectDisplay<'a> {
        SubjectDisplay {
            subject: self,
            interner,
        }
    }
}

impl From<Term> for Subject {
    fn from(term: Term) -> Self {
        Subject::Term(term)
    }
}

pub struct SubjectDisplay<'a> {
    subject: &'a Subject,
    interner: &'a Interner,
}

impl fmt::Display for SubjectDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.subject {
            Subject::Term(term) => write!(f, "{}", term.display(self.interner)),
            Subject::Pattern(pattern) => write!(f, "{pattern}"),
            Subject::Uri(uri) => f.write_str(self.interner.resolve(*uri)),
            Subject::Anonymous => f.write_str(syntax::ANONYMOUS),
        }
    }
}
