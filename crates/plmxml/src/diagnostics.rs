use std::fmt;

/// Non-fatal finding collected while indexing, resolving or building
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A usage points back at something already on the active path
    CycleDetected {
        occurrence: String,
        target: String,
        /// Usage/item identifiers from the root down to the repeated one
        path: Vec<String>,
    },
    UnresolvedReference {
        /// Identifier (or tag, if unaddressable) of the referring element
        source: String,
        attribute: String,
        target: String,
    },
    MissingFileEntry { dataset: String, member: String },
    /// The same UserValue title appears more than once on one owner
    AmbiguousAttributeName {
        owner: String,
        name: String,
        count: usize,
    },
    /// Two elements declared the same id; the later one was kept
    DuplicateIdentifier { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    CycleDetected,
    UnresolvedReference,
    MissingFileEntry,
    AmbiguousAttributeName,
    DuplicateIdentifier,
}

impl Diagnostic {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Self::CycleDetected { .. } => DiagnosticKind::CycleDetected,
            Self::UnresolvedReference { .. } => DiagnosticKind::UnresolvedReference,
            Self::MissingFileEntry { .. } => DiagnosticKind::MissingFileEntry,
            Self::AmbiguousAttributeName { .. } => DiagnosticKind::AmbiguousAttributeName,
            Self::DuplicateIdentifier { .. } => DiagnosticKind::DuplicateIdentifier,
        }
    }
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CycleDetected => "cycle-detected",
            Self::UnresolvedReference => "unresolved-reference",
            Self::MissingFileEntry => "missing-file-entry",
            Self::AmbiguousAttributeName => "ambiguous-attribute-name",
            Self::DuplicateIdentifier => "duplicate-identifier",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CycleDetected {
                occurrence,
                target,
                path,
            } => write!(
                f,
                "cycle detected: '{occurrence}' -> '{target}' is already on the path {}",
                path.join(" / ")
            ),
            Self::UnresolvedReference {
                source,
                attribute,
                target,
            } => write!(f, "unresolved reference: {source}/@{attribute} -> '{target}'"),
            Self::MissingFileEntry { dataset, member } => {
                write!(f, "missing file entry: dataset '{dataset}' member '{member}'")
            }
            Self::AmbiguousAttributeName { owner, name, count } => {
                write!(f, "attribute '{name}' declared {count} times on '{owner}'")
            }
            Self::DuplicateIdentifier { id } => {
                write!(f, "duplicate identifier '{id}', last declaration wins")
            }
        }
    }
}
