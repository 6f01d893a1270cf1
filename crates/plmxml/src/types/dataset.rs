use std::path::PathBuf;

/// A dataset attached to an item or occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRef {
    pub id: Option<String>,
    /// Attachment role (e.g. "primary", "IMAN_specification")
    pub role: Option<String>,
    pub dataset_type: String,
    pub name: String,
    pub version: Option<String>,
    pub files: Vec<FileEntry>,
    /// Member references that did not resolve to an ExternalFile
    pub missing_members: Vec<String>,
}

impl DatasetRef {
    pub fn with_role(mut self, role: Option<String>) -> Self {
        self.role = role;
        self
    }
}

/// A file belonging to a dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub filename: String,
    /// `locationRef` exactly as declared
    pub location: String,
    pub format: Option<String>,
    /// Location joined onto the directory of the PLMXML file, when known
    pub path: Option<PathBuf>,
}
