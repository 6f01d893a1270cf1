// PLMXML reader: flat ID-reference graph -> BOM tree
mod build;
mod cancel;
mod decode;
mod diagnostics;
mod index;
mod intern;
mod parse;
mod refs;
mod resolve;
mod session;
mod tree;
pub mod types;

pub use build::{BuildOptions, BuildOutput, RootPolicy, build_tree, parse_quantity};
pub use cancel::CancelToken;
pub use decode::decode_document;
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use index::RawIndex;
pub use intern::{Interner, Symbol};
pub use refs::Resolver;
pub use resolve::{
    TypedTables, resolve_attachments, resolve_attributes, resolve_dataset, resolve_item,
};
pub use session::Session;
pub use tree::{
    BomTree, BreadthFirst, Column, DepthFirst, NodePath, PathDisplay, Search, dataset_summary,
};
pub use types::*;

use std::path::Path;
use thiserror::Error;

/// The document could not be read at all
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed XML: {0}")]
    MalformedXml(#[from] roxmltree::Error),

    #[error("cannot decode document: {0}")]
    Encoding(String),

    #[error("document is empty")]
    EmptyDocument,

    #[error("document too large: more than {} {0}", u32::MAX)]
    TooLarge(&'static str),
}

/// The document was read but no usable structure was found
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("no root found: no view declares roots and every usage has a parent")]
    NoRootFound,

    #[error(
        "ambiguous root: {} candidates ({})",
        .candidates.len(),
        .candidates.join(", ")
    )]
    AmbiguousRoot { candidates: Vec<String> },

    #[error("unknown product view '{0}'")]
    UnknownView(String),

    #[error("tree too large: more than {} nodes", u32::MAX)]
    TooManyNodes,
}

#[derive(Debug, Error)]
pub enum PlmxmlError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("load cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, PlmxmlError>;

/// Raw document content plus the directory its file references are
/// relative to
#[derive(Debug, Clone, Copy)]
pub struct Source<'a> {
    bytes: &'a [u8],
    base_dir: Option<&'a Path>,
}

impl<'a> Source<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            base_dir: None,
        }
    }

    pub fn with_base_dir(mut self, dir: &'a Path) -> Self {
        self.base_dir = Some(dir);
        self
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(xml: &'a str) -> Self {
        Self::new(xml.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for Source<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::new(bytes)
    }
}

/// A loaded PLMXML document: its index, resolved tables and BOM tree
#[derive(Debug, Clone)]
pub struct Plmxml {
    index: RawIndex,
    tables: TypedTables,
    tree: BomTree,
    diagnostics: Vec<Diagnostic>,
    options: BuildOptions,
}

impl Plmxml {
    /// Parse a document held in memory, with default build options
    pub fn parse(xml: &str) -> Result<Self> {
        Self::load(xml, &BuildOptions::default(), &CancelToken::new())
    }

    pub fn parse_bytes(bytes: &[u8]) -> Result<Self> {
        Self::load(bytes, &BuildOptions::default(), &CancelToken::new())
    }

    /// Parse a file; dataset file locations resolve against its directory
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_file(path, &BuildOptions::default(), &CancelToken::new())
    }

    pub fn load_file(
        path: impl AsRef<Path>,
        options: &BuildOptions,
        cancel: &CancelToken,
    ) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let mut source = Source::new(&bytes);
        if let Some(dir) = path.parent() {
            source = source.with_base_dir(dir);
        }
        Self::load(source, options, cancel)
    }

    /// Run the whole pipeline: decode, index, resolve, build
    ///
    /// Cancellation is checked between stages and periodically while the
    /// tree is built. Any error discards all work done so far.
    pub fn load<'a>(
        source: impl Into<Source<'a>>,
        options: &BuildOptions,
        cancel: &CancelToken,
    ) -> Result<Self> {
        let source = source.into();
        cancel.check()?;

        let mut index = RawIndex::from_bytes(source.bytes)?;
        if let Some(dir) = source.base_dir {
            index = index.with_base_dir(dir);
        }
        cancel.check()?;

        let tables = TypedTables::build(&index);
        cancel.check()?;

        let output = build_tree(&index, &tables, options, cancel)?;

        let mut diagnostics = tables.diagnostics().to_vec();
        diagnostics.extend(output.diagnostics);

        Ok(Self {
            index,
            tables,
            tree: output.tree,
            diagnostics,
            options: options.clone(),
        })
    }

    /// Build the tree again from the same index, e.g. with another view
    pub fn rebuild(&self, options: &BuildOptions, cancel: &CancelToken) -> Result<BuildOutput> {
        build_tree(&self.index, &self.tables, options, cancel)
    }

    pub fn tree(&self) -> &BomTree {
        &self.tree
    }

    pub fn index(&self) -> &RawIndex {
        &self.index
    }

    pub fn tables(&self) -> &TypedTables {
        &self.tables
    }

    pub fn header(&self) -> &DocumentHeader {
        self.index.header()
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Non-fatal findings: document-wide ones first, then those from
    /// building the tree
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Views (ProductView / InstanceGraph) declared in the document
    pub fn views(&self) -> Vec<&str> {
        self.index
            .elements()
            .filter(|(_, el)| el.kind.is_view())
            .filter_map(|(_, el)| self.index.id_str(el))
            .collect()
    }
}
