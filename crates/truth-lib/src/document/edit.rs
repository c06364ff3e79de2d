//! Batched statement edits.

/// One change to a document's statement list.
///
/// Positions refer to the statement list as it stands after the
/// preceding operations of the same transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    Insert { position: usize, text: String },
    Delete { position: usize, count: usize },
    Update { position: usize, text: String },
}

impl EditOp {
    pub fn position(&self) -> usize {
        match self {
            EditOp::Insert { position, .. }
            | EditOp::Delete { position, .. }
            | EditOp::Update { position, .. } => *position,
        }
    }
}

/// Collects edits to apply atomically to one document.
#[derive(Debug, Default)]
pub struct EditTransaction {
    ops: Vec<EditOp>,
}

impl EditTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a statement; `text` may span several lines.
    pub fn insert(&mut self, position: usize, text: impl Into<String>) -> &mut Self {
        let text = text.into();
        for (offset, line) in text.split('\n').enumerate() {
            self.ops.push(EditOp::Insert {
                position: position + offset,
                text: line.to_string(),
            });
        }
        self
    }

    pub fn delete(&mut self, position: usize, count: usize) -> &mut Self {
        if count > 0 {
            self.ops.push(EditOp::Delete { position, count });
        }
        self
    }

    pub fn update(&mut self, position: usize, text: impl Into<String>) -> &mut Self {
        self.ops.push(EditOp::Update {
            position,
            text: text.into(),
        });
        self
    }

    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Smallest position any operation touches. Statements before it keep
    /// their ancestry.
    pub(crate) fn first_position(&self) -> Option<usize> {
        self.ops.iter().map(EditOp::position).min()
    }

    pub(crate) fn into_ops(self) -> Vec<EditOp> {
        self.ops
    }
}
