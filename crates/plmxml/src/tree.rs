use std::collections::VecDeque;
use std::fmt;

use crate::types::*;

/// Immutable BOM tree
///
/// Nodes live in an arena addressed by `NodeId`; children are owned by
/// their parent's id list and the parent link is for lookups only. There
/// are no mutating operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BomTree {
    nodes: Vec<BomNode>,
    roots: Vec<NodeId>,
}

impl BomTree {
    pub(crate) fn new(nodes: Vec<BomNode>, roots: Vec<NodeId>) -> Self {
        Self { nodes, roots }
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &BomNode {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&BomNode> {
        self.nodes.get(id.index())
    }

    pub fn child_ids(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &BomNode> + '_ {
        self.child_ids(id).iter().map(|child| self.node(*child))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Root-to-node path
    pub fn path(&self, id: NodeId) -> NodePath {
        let mut ids = vec![id];
        let mut cursor = self.parent(id);
        while let Some(parent) = cursor {
            ids.push(parent);
            cursor = self.parent(parent);
        }
        ids.reverse();
        NodePath { ids }
    }

    /// Node labels from the root down, joined with " / "
    pub fn path_string(&self, id: NodeId) -> String {
        self.path(id).display(self).to_string()
    }

    /// First attribute with this name (item attributes, then in-context ones)
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        let node = self.node(id);
        node.attributes
            .iter()
            .chain(&node.occurrence_attributes)
            .find(|entry| entry.name == name)
            .map(|entry| entry.value.as_str())
    }

    pub fn attributes(&self, id: NodeId) -> &[AttributeEntry] {
        &self.node(id).attributes
    }

    pub fn datasets(&self, id: NodeId) -> &[DatasetRef] {
        &self.node(id).datasets
    }

    /// Pre-order walk over every root in order
    pub fn depth_first(&self) -> DepthFirst<'_> {
        DepthFirst {
            tree: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }

    /// Level-order walk; all roots first, then their children, ...
    pub fn breadth_first(&self) -> BreadthFirst<'_> {
        BreadthFirst {
            tree: self,
            queue: self.roots.iter().copied().collect(),
        }
    }

    /// Nodes whose display name, name or id contains `query`
    /// (case-insensitive), yielded lazily in depth-first order.
    pub fn search(&self, query: &str) -> Search<'_> {
        Search {
            tree: self,
            query: query.to_lowercase(),
            walk: self.depth_first(),
        }
    }

    /// `Assembly` for nodes with children, else `Leaf`
    pub fn node_type(&self, id: NodeId) -> &'static str {
        if self.node(id).is_leaf() {
            "Leaf"
        } else {
            "Assembly"
        }
    }

    /// Display text of one column for a node
    pub fn column_value(&self, id: NodeId, column: Column) -> String {
        let node = self.node(id);
        match column {
            Column::Name => node.item.label().to_string(),
            Column::ItemType => or_na(&node.item.item_type),
            Column::Revision => or_na(&node.item.revision),
            Column::Quantity => node.quantity.to_string(),
            Column::Attributes => node
                .attributes
                .iter()
                .map(|entry| format!("{}={}", entry.name, entry.value))
                .collect::<Vec<_>>()
                .join("; "),
            Column::Datasets => node
                .datasets
                .iter()
                .map(dataset_summary)
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }
}

fn or_na(value: &str) -> String {
    if value.is_empty() {
        "N/A".to_string()
    } else {
        value.to_string()
    }
}

/// `Role: r, Type: t, Name: n, Files: [loc (fmt); ...]`
pub fn dataset_summary(dataset: &DatasetRef) -> String {
    let mut files: Vec<String> = dataset
        .files
        .iter()
        .map(|file| {
            format!(
                "{} ({})",
                or_na(&file.location),
                file.format.as_deref().unwrap_or("N/A")
            )
        })
        .collect();
    files.extend(
        dataset
            .missing_members
            .iter()
            .map(|member| format!("Ref: {member} (Not Found)")),
    );
    let files = if files.is_empty() {
        "No Files".to_string()
    } else {
        files.join("; ")
    };

    format!(
        "Role: {}, Type: {}, Name: {}, Files: [{}]",
        dataset.role.as_deref().unwrap_or("N/A"),
        or_na(&dataset.dataset_type),
        dataset.name,
        files
    )
}

/// Presentation columns of the tree view / BOM export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Name,
    ItemType,
    Revision,
    Quantity,
    Attributes,
    Datasets,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Name,
        Column::ItemType,
        Column::Revision,
        Column::Quantity,
        Column::Attributes,
        Column::Datasets,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Self::Name => "Name / ID",
            Self::ItemType => "Item Type",
            Self::Revision => "Revision",
            Self::Quantity => "Qty",
            Self::Attributes => "Attributes",
            Self::Datasets => "Datasets",
        }
    }
}

/// Node ids from a root down to a target node (never empty)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePath {
    ids: Vec<NodeId>,
}

impl NodePath {
    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    pub fn target(&self) -> NodeId {
        self.ids[self.ids.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn display<'a>(&'a self, tree: &'a BomTree) -> PathDisplay<'a> {
        PathDisplay { path: self, tree }
    }
}

pub struct PathDisplay<'a> {
    path: &'a NodePath,
    tree: &'a BomTree,
}

impl fmt::Display for PathDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.path.ids.iter().enumerate() {
            if i > 0 {
                f.write_str(" / ")?;
            }
            f.write_str(self.tree.node(*id).item.label())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DepthFirst<'a> {
    tree: &'a BomTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = (NodeId, &'a BomNode);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.node(id);
        self.stack.extend(node.children.iter().rev().copied());
        Some((id, node))
    }
}

#[derive(Debug, Clone)]
pub struct BreadthFirst<'a> {
    tree: &'a BomTree,
    queue: VecDeque<NodeId>,
}

impl<'a> Iterator for BreadthFirst<'a> {
    type Item = (NodeId, &'a BomNode);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.queue.pop_front()?;
        let node = self.tree.node(id);
        self.queue.extend(node.children.iter().copied());
        Some((id, node))
    }
}

/// Lazy search over the tree; finite, and restartable from the top
#[derive(Debug, Clone)]
pub struct Search<'a> {
    tree: &'a BomTree,
    query: String,
    walk: DepthFirst<'a>,
}

impl Search<'_> {
    pub fn restart(&mut self) {
        self.walk = self.tree.depth_first();
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

impl Iterator for Search<'_> {
    type Item = NodePath;

    fn next(&mut self) -> Option<NodePath> {
        let query = &self.query;
        let (id, _) = self.walk.find(|(_, node)| matches(&node.item, query))?;
        Some(self.tree.path(id))
    }
}

fn matches(item: &ItemInfo, query: &str) -> bool {
    [
        Some(item.display_name.as_str()),
        Some(item.name.as_str()),
        item.id.as_deref(),
        item.source_id.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|text| text.to_lowercase().contains(query))
}
