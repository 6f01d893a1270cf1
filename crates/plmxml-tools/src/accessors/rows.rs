use plmxml::{Column, NodeId};
use serde::Serialize;

use super::DocumentAccessor;

/// One line of the flattened BOM, in depth-first order
#[derive(Debug, Clone, Serialize)]
pub struct BomRow {
    /// Depth in the tree; roots are level 0
    pub level: usize,
    /// "Assembly" or "Leaf"
    pub node_type: &'static str,
    pub name: String,
    pub id: Option<String>,
    pub occurrence_id: Option<String>,
    pub item_type: String,
    pub revision: String,
    pub quantity: u32,
    pub sequence_number: Option<String>,
    /// `k=v; k=v`
    pub attributes: String,
    /// Dataset summaries joined with ` | `
    pub datasets: String,
    pub unresolved: bool,
    pub truncated: bool,
}

impl BomRow {
    /// CSV header, matching the tree view columns
    pub const HEADERS: [&'static str; 8] = [
        "Level",
        "Type",
        "Name / ID",
        "Item Type",
        "Revision",
        "Qty",
        "Attributes",
        "Datasets",
    ];

    pub fn record(&self) -> [String; 8] {
        [
            self.level.to_string(),
            self.node_type.to_string(),
            self.name.clone(),
            self.item_type.clone(),
            self.revision.clone(),
            self.quantity.to_string(),
            self.attributes.clone(),
            self.datasets.clone(),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub path: String,
    pub occurrence_id: Option<String>,
    pub depth: usize,
}

impl DocumentAccessor<'_> {
    pub fn bom_row(&self, id: NodeId) -> BomRow {
        let tree = self.tree();
        let node = tree.node(id);
        BomRow {
            level: node.depth,
            node_type: tree.node_type(id),
            name: tree.column_value(id, Column::Name),
            id: node.item.id.clone(),
            occurrence_id: node.occurrence_id.clone(),
            item_type: tree.column_value(id, Column::ItemType),
            revision: tree.column_value(id, Column::Revision),
            quantity: node.quantity,
            sequence_number: node.sequence_number.clone(),
            attributes: tree.column_value(id, Column::Attributes),
            datasets: tree.column_value(id, Column::Datasets),
            unresolved: node.item.unresolved,
            truncated: node.truncated,
        }
    }

    /// Every node, depth-first
    pub fn bom_rows(&self) -> Vec<BomRow> {
        self.tree()
            .depth_first()
            .map(|(id, _)| self.bom_row(id))
            .collect()
    }

    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let tree = self.tree();
        tree.search(query)
            .map(|path| {
                let node = tree.node(path.target());
                SearchHit {
                    path: path.display(tree).to_string(),
                    occurrence_id: node.occurrence_id.clone(),
                    depth: node.depth,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use plmxml::Plmxml;

    use super::*;

    const DOC: &str = r##"<PLMXML>
  <ProductView id="pv" rootRefs="o1"/>
  <Occurrence id="o1" instancedRef="#r1" occurrenceRefs="o2"/>
  <Occurrence id="o2" instancedRef="#r2" quantity="3"/>
  <ProductRevision id="r1" name="Frame" subType="Assembly" revision="A"/>
  <ProductRevision id="r2" name="Rivet">
    <UserData><UserValue title="Material" value="Al"/></UserData>
  </ProductRevision>
</PLMXML>"##;

    #[test]
    fn rows_follow_tree_order() {
        let doc = Plmxml::parse(DOC).unwrap();
        let rows = DocumentAccessor::new(&doc).bom_rows();

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].record(),
            ["0", "Assembly", "Frame", "Assembly", "A", "1", "", ""].map(String::from)
        );
        assert_eq!(
            rows[1].record(),
            ["1", "Leaf", "Rivet", "N/A", "N/A", "3", "Material=Al", ""].map(String::from)
        );
    }

    #[test]
    fn search_hits_carry_paths() {
        let doc = Plmxml::parse(DOC).unwrap();
        let hits = DocumentAccessor::new(&doc).search("riv");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].path, "Frame / Rivet");
        assert_eq!(hits[0].occurrence_id.as_deref(), Some("o2"));
    }
}
