//! Statement parsing: one line of a document.

use std::ops::Range;
use std::rc::Rc;

use truth_core::{Interner, syntax};

use super::{ParseContext, SpanKey, StatementId};
use crate::faults::{FaultKind, FaultSite, Faults};
use crate::pattern::Pattern;
use crate::subject::{Subject, Term};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Declaration,
    Comment,
    Whitespace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanSide {
    Declaration,
    Annotation,
}

/// A subject occurrence inside a statement.
#[derive(Debug, Clone)]
pub struct Span {
    pub(crate) key: SpanKey,
    pub(crate) side: SpanSide,
    pub(crate) subject: Subject,
    pub(crate) range: Range<usize>,
    pub(crate) is_cruft_marker: bool,
}

impl Span {
    pub fn key(&self) -> SpanKey {
        self.key
    }

    pub fn side(&self) -> SpanSide {
        self.side
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// Byte range inside the statement's text.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Marks a declaration that failed to parse. It never inflates a phrase.
    pub fn is_cruft_marker(&self) -> bool {
        self.is_cruft_marker
    }
}

#[derive(Debug, Clone)]
pub struct Statement {
    pub(crate) id: StatementId,
    pub(crate) kind: StatementKind,
    pub(crate) indent: usize,
    pub(crate) text: String,
    pub(crate) declarations: Vec<Span>,
    pub(crate) annotations: Vec<Span>,
    pub(crate) joint: Option<usize>,
}

impl Statement {
    pub fn id(&self) -> StatementId {
        self.id
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn declarations(&self) -> &[Span] {
        &self.declarations
    }

    pub fn annotations(&self) -> &[Span] {
        &self.annotations
    }

    /// Byte offset of the `:` separating declarations from annotations.
    pub fn joint(&self) -> Option<usize> {
        self.joint
    }

    /// Comments, blank lines and lines without declarations have no effect.
    pub fn is_noop(&self) -> bool {
        self.kind != StatementKind::Declaration || self.declarations.is_empty()
    }

    /// Annotation terms, in written order.
    pub fn clarifiers(&self) -> Vec<Term> {
        self.annotations
            .iter()
            .filter_map(|span| span.subject.as_term())
            .collect()
    }

    pub fn annotation_text(&self) -> &str {
        match self.joint {
            Some(joint) => self.text[joint + 1..].trim(),
            None => "",
        }
    }

    pub fn has_pattern(&self) -> bool {
        self.declarations.iter().any(|d| d.subject.is_pattern())
    }

    /// A statement that only names another document.
    pub fn is_dependency(&self) -> bool {
        self.annotations.is_empty()
            && matches!(self.declarations.as_slice(), [span] if span.subject.is_uri())
    }

    pub(crate) fn parse(
        ctx: &mut ParseContext<'_>,
        faults: &mut Faults,
        id: StatementId,
        text: &str,
    ) -> Self {
        let text = text.trim_end_matches(['\r', '\n']).to_string();
        let indent = text.len() - text.trim_start_matches([' ', '\t']).len();
        let mut statement = Statement {
            id,
            kind: StatementKind::Whitespace,
            indent,
            text,
            declarations: Vec::new(),
            annotations: Vec::new(),
            joint: None,
        };

        let body = &statement.text[indent..];
        if body.trim().is_empty() {
            return statement;
        }
        if is_comment(body) {
            statement.kind = StatementKind::Comment;
            return statement;
        }
        statement.kind = StatementKind::Declaration;

        let joint = find_joint(&statement.text, indent);
        statement.joint = joint;
        let decl_end = joint.unwrap_or(statement.text.len());
        let annotations = match joint {
            Some(joint) => split_terms(&statement.text, joint + 1, statement.text.len()),
            None => Vec::new(),
        };

        statement.annotations = annotations
            .into_iter()
            .enumerate()
            .map(|(index, range)| Span {
                key: SpanKey::new(id, index),
                side: SpanSide::Annotation,
                subject: Subject::Term(Term::parse(ctx.interner, &statement.text[range.clone()])),
                range,
                is_cruft_marker: false,
            })
            .collect();

        statement.declarations = if body.starts_with(syntax::PATTERN_DELIMITER) {
            let range = trimmed(&statement.text, indent, decl_end);
            vec![parse_pattern(ctx, faults, &statement, range)]
        } else {
            let ranges = split_terms(&statement.text, indent, decl_end);
            if ranges.is_empty() && joint.is_some() {
                let joint = decl_end;
                vec![Span {
                    key: SpanKey::new(id, 0),
                    side: SpanSide::Declaration,
                    subject: Subject::Anonymous,
                    range: joint..joint + 1,
                    is_cruft_marker: false,
                }]
            } else {
                ranges
                    .into_iter()
                    .enumerate()
                    .map(|(index, range)| Span {
                        key: SpanKey::new(id, index),
                        side: SpanSide::Declaration,
                        subject: declaration_subject(ctx.interner, &statement.text[range.clone()]),
                        range,
                        is_cruft_marker: false,
                    })
                    .collect()
            }
        };

        statement
    }
}

fn is_comment(body: &str) -> bool {
    body.strip_prefix(syntax::COMMENT)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

fn declaration_subject(interner: &mut Interner, text: &str) -> Subject {
    if text.ends_with(syntax::TRUTH_EXTENSION) {
        Subject::Uri(interner.intern(text))
    } else {
        Subject::Term(Term::parse(interner, text))
    }
}

fn parse_pattern(
    ctx: &mut ParseContext<'_>,
    faults: &mut Faults,
    statement: &Statement,
    range: Range<usize>,
) -> Span {
    let source = &statement.text[range.clone()];
    let hash = pattern_hash(statement.annotation_text());
    let pattern = Pattern::compile(source, hash, ctx.pattern_size_limit);

    let is_cruft_marker = !pattern.is_valid();
    if let Some(error) = pattern.error() {
        faults
            .report(
                FaultKind::InvalidPattern,
                FaultSite::new(ctx.document, statement.id, range.clone()),
            )
            .message(error)
            .emit();
    }

    Span {
        key: SpanKey::new(statement.id, 0),
        side: SpanSide::Declaration,
        subject: Subject::Pattern(Rc::new(pattern)),
        range,
        is_cruft_marker,
    }
}

/// Hash of the annotation side, carried in a pattern's identity text.
pub(crate) fn pattern_hash(annotation_text: &str) -> String {
    format!("{:x}", crc32fast::hash(annotation_text.trim().as_bytes()))
}

/// Finds the joint: the first `:` followed by whitespace or the end of line,
/// outside escapes, character sets and infixes.
fn find_joint(text: &str, from: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut set_depth = false;
    let mut infix_depth = 0usize;
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'[' if infix_depth == 0 => set_depth = true,
            b']' => set_depth = false,
            b'<' if !set_depth => infix_depth += 1,
            b'>' if !set_depth => infix_depth = infix_depth.saturating_sub(1),
            b':' if !set_depth && infix_depth == 0 => {
                let next = bytes.get(i + 1);
                if next.is_none_or(|b| b.is_ascii_whitespace()) {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Splits `text[from..to]` at combinators, returning the trimmed non-empty parts.
fn split_terms(text: &str, from: usize, to: usize) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = from;
    for (offset, ch) in text[from..to].char_indices() {
        if ch == syntax::COMBINATOR {
            push_trimmed(&mut ranges, text, start, from + offset);
            start = from + offset + ch.len_utf8();
        }
    }
    push_trimmed(&mut ranges, text, start, to);
    ranges
}

fn push_trimmed(ranges: &mut Vec<Range<usize>>, text: &str, start: usize, end: usize) {
    let range = trimmed(text, start, end);
    if !range.is_empty() {
        ranges.push(range);
    }
}

fn trimmed(text: &str, start: usize, end: usize) -> Range<usize> {
    let slice = &text[start..end];
    let lead = slice.len() - slice.trim_start().len();
    let trail = slice.len() - slice.trim_end().len();
    if lead == slice.len() {
        return start..start;
    }
    start + lead..end - trail
}
