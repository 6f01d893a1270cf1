use plmxml::{BomTree, Plmxml};

mod rows;
mod summary;

// Re-export types
pub use rows::{BomRow, SearchHit};
pub use summary::{DiagnosticRow, DocumentSummary, KindCount};

/// Main accessor for PLMXML data extraction
///
/// Provides high-level methods to turn a loaded document into the row and
/// summary models used for CLI output.
pub struct DocumentAccessor<'a> {
    doc: &'a Plmxml,
}

impl<'a> DocumentAccessor<'a> {
    pub fn new(doc: &'a Plmxml) -> Self {
        Self { doc }
    }

    pub fn doc(&self) -> &'a Plmxml {
        self.doc
    }

    fn tree(&self) -> &'a BomTree {
        self.doc.tree()
    }
}
