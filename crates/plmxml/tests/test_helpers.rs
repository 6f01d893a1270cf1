#![allow(dead_code)]

use std::path::PathBuf;

use plmxml::{BomNode, BomTree, BuildOptions, CancelToken, NodeId, Plmxml};

/// Path of a fixture under tests/data
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Load a fixture with default build options
pub fn load(name: &str) -> Plmxml {
    let path = fixture(name);
    Plmxml::parse_file(&path).unwrap_or_else(|e| panic!("Failed to load {}: {e}", path.display()))
}

pub fn load_with(name: &str, options: &BuildOptions) -> plmxml::Result<Plmxml> {
    Plmxml::load_file(fixture(name), options, &CancelToken::new())
}

pub fn root(tree: &BomTree) -> (NodeId, &BomNode) {
    assert_eq!(tree.roots().len(), 1, "expected a single root");
    let id = tree.roots()[0];
    (id, tree.node(id))
}

/// Item names of a node's children, in order
pub fn child_names(tree: &BomTree, id: NodeId) -> Vec<String> {
    tree.children(id).map(|n| n.item.name.clone()).collect()
}
