use plmxml::{Diagnostic, DiagnosticKind};
use serde::Serialize;

use super::DocumentAccessor;

/// Document overview shown by `info`
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub schema_version: Option<String>,
    pub author: Option<String>,
    /// `date` and `time` of the export, joined
    pub exported: Option<String>,
    pub transfer_context: Option<String>,
    pub views: Vec<String>,
    pub roots: Vec<String>,
    pub nodes: usize,
    pub items: usize,
    pub datasets: usize,
    pub elements: Vec<KindCount>,
    pub diagnostic_counts: Vec<KindCount>,
    pub diagnostics: Vec<DiagnosticRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KindCount {
    pub kind: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticRow {
    pub kind: &'static str,
    pub message: String,
}

impl From<&Diagnostic> for DiagnosticRow {
    fn from(diagnostic: &Diagnostic) -> Self {
        Self {
            kind: diagnostic.kind().as_str(),
            message: diagnostic.to_string(),
        }
    }
}

impl DocumentAccessor<'_> {
    pub fn summary(&self) -> DocumentSummary {
        let doc = self.doc;
        let header = doc.header();
        let tree = self.tree();

        let exported = match (&header.date, &header.time) {
            (Some(date), Some(time)) => Some(format!("{date} {time}")),
            (Some(date), None) => Some(date.clone()),
            (None, time) => time.clone(),
        };

        DocumentSummary {
            schema_version: header.schema_version.clone(),
            author: header.author.clone(),
            exported,
            transfer_context: header.transfer_context.clone(),
            views: doc.views().into_iter().map(String::from).collect(),
            roots: tree
                .roots()
                .iter()
                .map(|id| tree.node(*id).item.label().to_string())
                .collect(),
            nodes: tree.len(),
            items: doc.tables().item_count(),
            datasets: doc.tables().dataset_count(),
            elements: doc
                .index()
                .kind_counts()
                .into_iter()
                .map(|(kind, count)| KindCount {
                    kind: kind.as_str(),
                    count,
                })
                .collect(),
            diagnostic_counts: self
                .diagnostic_counts()
                .into_iter()
                .map(|(kind, count)| KindCount {
                    kind: kind.as_str(),
                    count,
                })
                .collect(),
            diagnostics: doc.diagnostics().iter().map(DiagnosticRow::from).collect(),
        }
    }

    /// Diagnostic counts per kind, in first-seen order
    pub fn diagnostic_counts(&self) -> Vec<(DiagnosticKind, usize)> {
        let mut counts: Vec<(DiagnosticKind, usize)> = Vec::new();
        for diagnostic in self.doc.diagnostics() {
            match counts.iter_mut().find(|(kind, _)| *kind == diagnostic.kind()) {
                Some((_, count)) => *count += 1,
                None => counts.push((diagnostic.kind(), 1)),
            }
        }
        counts
    }
}
