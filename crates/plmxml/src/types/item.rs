/// Resolved item metadata (part / product / design, with its revision)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemInfo {
    /// Identifier of the element the item was resolved from
    pub source_id: Option<String>,
    /// Item / product id (e.g. `productId`)
    pub id: Option<String>,
    pub name: String,
    /// Preferred label (`object_string` when the exporter provides one)
    pub display_name: String,
    pub item_type: String,
    pub revision: String,
    pub last_modified: Option<String>,
    pub uid: Option<String>,
    /// Placeholder for a missing or dangling target
    pub unresolved: bool,
}

impl ItemInfo {
    /// Placeholder for a usage whose target cannot be resolved
    pub fn unresolved(label: &str) -> Self {
        Self {
            source_id: None,
            id: None,
            name: label.to_string(),
            display_name: label.to_string(),
            item_type: String::new(),
            revision: String::new(),
            last_modified: None,
            uid: None,
            unresolved: true,
        }
    }

    /// Label shown in the tree: display name, then name, then id
    pub fn label(&self) -> &str {
        [self.display_name.as_str(), self.name.as_str()]
            .into_iter()
            .chain(self.id.as_deref())
            .chain(self.source_id.as_deref())
            .find(|s| !s.is_empty())
            .unwrap_or("Occurrence")
    }
}

/// One UserValue, flattened from its UserData group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeEntry {
    pub name: String,
    pub value: String,
    /// `type` of the enclosing UserData (e.g. `AttributesInContext`)
    pub group: Option<String>,
}

impl AttributeEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            group: None,
        }
    }
}
