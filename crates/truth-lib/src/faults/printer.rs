//! Builder-pattern printer for rendering faults.

use std::fmt::Write;
use std::ops::Range;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};

use super::Faults;
use super::message::{Fault, Severity};
use crate::document::Document;

/// Builder for rendering faults with various options.
pub struct FaultsPrinter<'f, 's> {
    faults: &'f Faults,
    document: Option<&'s Document>,
    path: Option<&'s str>,
    colored: bool,
}

impl<'f, 's> FaultsPrinter<'f, 's> {
    pub fn new(faults: &'f Faults) -> Self {
        Self {
            faults,
            document: None,
            path: None,
            colored: false,
        }
    }

    /// Render annotated snippets from this document's text.
    ///
    /// Faults located in other documents are skipped.
    pub fn document(mut self, document: &'s Document) -> Self {
        self.document = Some(document);
        self
    }

    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let Some(document) = self.document else {
            return self.format_plain(w);
        };

        let source = document.text();
        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        let located = self
            .faults
            .iter()
            .filter(|fault| fault.site.document == document.id());

        for (i, fault) in located.enumerate() {
            let Some(range) = locate(document, fault) else {
                continue;
            };

            let mut snippet = Snippet::source(source).line_start(1).annotation(
                AnnotationKind::Primary
                    .span(adjust_range(range, source.len()))
                    .label(&fault.message),
            );

            if let Some(p) = self.path {
                snippet = snippet.path(p);
            }

            for related in &fault.related {
                let Some(offset) = document.statement_offset(related.site.statement) else {
                    continue;
                };
                let range = offset + related.site.range.start..offset + related.site.range.end;
                snippet = snippet.annotation(
                    AnnotationKind::Context
                        .span(adjust_range(range, source.len()))
                        .label(&related.message),
                );
            }

            let level = severity_to_level(fault.severity());
            let report: Vec<Group> = vec![level.primary_title(&fault.message).element(snippet)];

            if i > 0 {
                w.write_char('\n')?;
            }
            write!(w, "{}", renderer.render(&report))?;
        }

        Ok(())
    }

    fn format_plain(&self, w: &mut impl Write) -> std::fmt::Result {
        for (i, fault) in self.faults.iter().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }
            write!(w, "{}", fault)?;
        }
        Ok(())
    }
}

fn locate(document: &Document, fault: &Fault) -> Option<Range<usize>> {
    let offset = document.statement_offset(fault.site.statement)?;
    Some(offset + fault.site.range.start..offset + fault.site.range.end)
}

fn severity_to_level(severity: Severity) -> Level<'static> {
    match severity {
        Severity::Error => Level::ERROR,
        Severity::Warning => Level::WARNING,
    }
}

fn adjust_range(range: Range<usize>, limit: usize) -> Range<usize> {
    if range.start == range.end {
        return range.start..(range.start + 1).min(limit);
    }

    range
}

impl Faults {
    pub fn printer(&self) -> FaultsPrinter<'_, '_> {
        FaultsPrinter::new(self)
    }
}
