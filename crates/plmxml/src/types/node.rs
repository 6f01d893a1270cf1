use super::dataset::DatasetRef;
use super::item::{AttributeEntry, ItemInfo};

/// Index of a node in the tree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One occurrence/usage in the resolved tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BomNode {
    /// Identifier of the usage element (or of the item, for item roots)
    pub occurrence_id: Option<String>,
    pub item: ItemInfo,
    /// Always >= 1
    pub quantity: u32,
    pub sequence_number: Option<String>,
    /// Attributes of the owning item, in declaration order
    pub attributes: Vec<AttributeEntry>,
    /// In-context attributes declared on the usage itself
    pub occurrence_attributes: Vec<AttributeEntry>,
    pub datasets: Vec<DatasetRef>,
    pub children: Vec<NodeId>,
    /// Lookup only; the arena owns every node
    pub parent: Option<NodeId>,
    pub depth: usize,
    /// Expansion stopped here because the target is already on the path
    pub truncated: bool,
}

impl BomNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
