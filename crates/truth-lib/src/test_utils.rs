//! Helpers shared by the crate's tests.

use crate::document::DocumentId;
use crate::faults::Faults;
use crate::program::Program;
use crate::types::Type;

impl Program {
    pub(crate) fn from_source(source: &str) -> (Program, DocumentId) {
        let mut program = Program::new();
        let document = program.add_document(source);
        (program, document)
    }

    pub(crate) fn expect_type(&mut self, document: DocumentId, path: &[&str]) -> Type {
        self.query(document, path)
            .unwrap_or_else(|| panic!("expected a type at {path:?}"))
    }

    pub(crate) fn names(&self, types: &[Type]) -> Vec<String> {
        types
            .iter()
            .map(|t| t.name(self).expect("fresh type").to_string())
            .collect()
    }

    pub(crate) fn base_names(&mut self, document: DocumentId, path: &[&str]) -> Vec<String> {
        let ty = self.expect_type(document, path);
        let bases = ty.bases(self).expect("fresh type");
        self.names(&bases)
    }

    pub(crate) fn containee_names(&mut self, document: DocumentId, path: &[&str]) -> Vec<String> {
        let ty = self.expect_type(document, path);
        let containees = ty.containees(self).expect("fresh type");
        self.names(&containees)
    }

    /// One line per fault: kind, statement line, the text it points at, and its message.
    pub(crate) fn fault_summary(&mut self) -> String {
        let faults = self.verify();
        self.summarize(&faults)
    }

    pub(crate) fn summarize(&self, faults: &Faults) -> String {
        let mut out = String::new();
        for fault in faults {
            let site = fault.site();
            let document = self.document(site.document).expect("live document");
            let line = document.position_of(site.statement).expect("live statement");
            let statement = document.statement(site.statement).expect("live statement");
            let text = &statement.text()[site.range.clone()];
            out.push_str(&format!(
                "{:?} {}:`{}` {}\n",
                fault.kind(),
                line + 1,
                text,
                fault.message()
            ));
        }
        out
    }
}
