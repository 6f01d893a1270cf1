use crate::Symbol;

/// Position of an element in the raw index arena (document order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) u32);

impl ElementId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Element kinds the index understands
///
/// Classified from the local tag name. Anything else is not indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Document,
    Header,
    Site,
    RevisionRule,
    ProductDef,
    ProductView,
    InstanceGraph,
    Occurrence,
    Instance,
    Product,
    ProductRevision,
    Part,
    Design,
    DesignRevision,
    DataSet,
    ExternalFile,
    AssociatedAttachment,
    AssociatedDataSet,
    Form,
    UserData,
    UserValue,
    UserList,
    ListItem,
    ApplicationRef,
}

impl ElementKind {
    /// Classify a local tag name. `Item` only means something inside a
    /// `UserList`, so the parent kind is needed.
    pub fn from_tag(tag: &str, parent: Option<ElementKind>) -> Option<Self> {
        let kind = match tag {
            "PLMXML" => Self::Document,
            "Header" => Self::Header,
            "Site" => Self::Site,
            "RevisionRule" => Self::RevisionRule,
            "ProductDef" => Self::ProductDef,
            "ProductView" => Self::ProductView,
            "InstanceGraph" => Self::InstanceGraph,
            "Occurrence" => Self::Occurrence,
            "Instance" => Self::Instance,
            "Product" => Self::Product,
            "ProductRevision" => Self::ProductRevision,
            "Part" => Self::Part,
            "Design" => Self::Design,
            "DesignRevision" => Self::DesignRevision,
            "DataSet" => Self::DataSet,
            "ExternalFile" => Self::ExternalFile,
            "AssociatedAttachment" => Self::AssociatedAttachment,
            "AssociatedDataSet" => Self::AssociatedDataSet,
            "Form" => Self::Form,
            "UserData" => Self::UserData,
            "UserValue" => Self::UserValue,
            "UserList" => Self::UserList,
            "Item" if parent == Some(Self::UserList) => Self::ListItem,
            "ApplicationRef" => Self::ApplicationRef,
            _ => return None,
        };
        Some(kind)
    }

    /// Containers that declare the root usages of a structure
    pub fn is_view(self) -> bool {
        matches!(self, Self::ProductView | Self::InstanceGraph)
    }

    /// An occurrence/usage of an item under a parent
    pub fn is_usage(self) -> bool {
        matches!(self, Self::Occurrence | Self::Instance)
    }

    /// Part, product or design definitions (masters and revisions)
    pub fn is_item(self) -> bool {
        matches!(
            self,
            Self::Product
                | Self::ProductRevision
                | Self::Part
                | Self::Design
                | Self::DesignRevision
        )
    }

    /// Elements whose UserData describes the element itself
    pub fn owns_attributes(self) -> bool {
        self.is_item() || self.is_usage() || matches!(self, Self::Form | Self::DataSet)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Document => "PLMXML",
            Self::Header => "Header",
            Self::Site => "Site",
            Self::RevisionRule => "RevisionRule",
            Self::ProductDef => "ProductDef",
            Self::ProductView => "ProductView",
            Self::InstanceGraph => "InstanceGraph",
            Self::Occurrence => "Occurrence",
            Self::Instance => "Instance",
            Self::Product => "Product",
            Self::ProductRevision => "ProductRevision",
            Self::Part => "Part",
            Self::Design => "Design",
            Self::DesignRevision => "DesignRevision",
            Self::DataSet => "DataSet",
            Self::ExternalFile => "ExternalFile",
            Self::AssociatedAttachment => "AssociatedAttachment",
            Self::AssociatedDataSet => "AssociatedDataSet",
            Self::Form => "Form",
            Self::UserData => "UserData",
            Self::UserValue => "UserValue",
            Self::UserList => "UserList",
            Self::ListItem => "Item",
            Self::ApplicationRef => "ApplicationRef",
        }
    }
}

/// One identifier held by a reference-typed attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    /// Attribute the reference was declared in (e.g. `instancedRef`)
    pub attribute: Symbol,
    /// Target identifier with any leading `#` removed
    pub target: Symbol,
}

/// Raw element record, immutable once the index is built
#[derive(Debug, Clone)]
pub struct RawElement {
    /// `None` for unaddressable elements (UserData, UserValue, ...)
    pub id: Option<Symbol>,
    pub kind: ElementKind,
    pub tag: Symbol,
    pub attributes: Vec<(Symbol, Symbol)>,
    pub children: Vec<ElementId>,
    pub references: Vec<Reference>,
    pub parent: Option<ElementId>,
}

impl RawElement {
    pub fn attribute(&self, name: Symbol) -> Option<Symbol> {
        self.attributes
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    /// Targets of one reference attribute, in declaration order
    pub fn references_in(&self, attribute: Symbol) -> impl Iterator<Item = Symbol> + '_ {
        self.references
            .iter()
            .filter(move |r| r.attribute == attribute)
            .map(|r| r.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_tags() {
        assert_eq!(
            ElementKind::from_tag("Occurrence", None),
            Some(ElementKind::Occurrence)
        );
        assert_eq!(ElementKind::from_tag("VendorExtension", None), None);
    }

    #[test]
    fn item_only_inside_user_list() {
        assert_eq!(ElementKind::from_tag("Item", None), None);
        assert_eq!(
            ElementKind::from_tag("Item", Some(ElementKind::UserList)),
            Some(ElementKind::ListItem)
        );
    }

    #[test]
    fn kind_classes() {
        assert!(ElementKind::ProductView.is_view());
        assert!(ElementKind::InstanceGraph.is_view());
        assert!(ElementKind::Instance.is_usage());
        assert!(ElementKind::Part.is_item());
        assert!(!ElementKind::DataSet.is_item());
    }
}
