mod test_helpers;

use plmxml::{BuildOptions, CancelToken, Column, DiagnosticKind, RootPolicy, StructureError};
use test_helpers::*;

#[test]
fn assembly_scenario() {
    let doc = load("assembly.xml");
    let tree = doc.tree();
    let (root_id, root) = root(tree);

    assert_eq!(root.item.name, "Assembly-A");
    assert_eq!(root.item.display_name, "A-1000/B;1-Assembly-A");
    assert_eq!(root.item.id.as_deref(), Some("A-1000"));
    assert_eq!(root.item.revision, "B");
    assert_eq!(root.item.uid.as_deref(), Some("revA"));
    assert_eq!(root.quantity, 1);

    assert_eq!(child_names(tree, root_id), vec!["Part-B", "Part-C"]);
    let children: Vec<_> = tree.children(root_id).collect();
    assert_eq!(children[0].quantity, 2);
    assert_eq!(children[1].quantity, 1);

    let part_c = children[1];
    assert_eq!(part_c.attributes.len(), 1);
    assert_eq!(part_c.attributes[0].name, "Material");
    assert_eq!(part_c.attributes[0].value, "Steel");
    assert_eq!(part_c.sequence_number.as_deref(), Some("20"));

    assert_eq!(part_c.datasets.len(), 1);
    let dataset = &part_c.datasets[0];
    assert_eq!(dataset.role.as_deref(), Some("primary"));
    assert_eq!(dataset.dataset_type, "PDF");
    assert_eq!(dataset.files.len(), 1);
    assert_eq!(dataset.files[0].filename, "drawing.pdf");
    let path = dataset.files[0].path.as_ref().unwrap();
    assert!(path.ends_with("tests/data/Part-C/drawing.pdf"));

    assert!(doc.diagnostics().is_empty(), "{:?}", doc.diagnostics());
}

#[test]
fn every_reachable_occurrence_appears_once() {
    let doc = load("assembly.xml");
    let mut seen: Vec<_> = doc
        .tree()
        .depth_first()
        .filter_map(|(_, node)| node.occurrence_id.clone())
        .collect();
    seen.sort();
    assert_eq!(seen, vec!["id6", "id7", "id8"]);
}

#[test]
fn header_and_columns() {
    let doc = load("assembly.xml");
    let header = doc.header();
    assert_eq!(header.schema_version.as_deref(), Some("6"));
    assert_eq!(header.date.as_deref(), Some("2024-03-18"));
    assert_eq!(
        header.transfer_context.as_deref(),
        Some("ConfiguredDataExportDefault")
    );

    let tree = doc.tree();
    let part_c = tree.child_ids(tree.roots()[0])[1];
    assert_eq!(tree.node_type(part_c), "Leaf");
    assert_eq!(tree.column_value(part_c, Column::ItemType), "ItemRevision");
    assert_eq!(tree.column_value(part_c, Column::Revision), "C");
    assert_eq!(tree.column_value(part_c, Column::Attributes), "Material=Steel");
    assert_eq!(
        tree.column_value(part_c, Column::Datasets),
        "Role: primary, Type: PDF, Name: Part-C drawing, Files: [Part-C/drawing.pdf (pdf)]"
    );
    assert_eq!(tree.path_string(part_c), "A-1000/B;1-Assembly-A / Part-C");
}

#[test]
fn attribute_order_matches_source() {
    let doc = load("assembly.xml");
    let tree = doc.tree();
    let names: Vec<_> = tree
        .attributes(tree.roots()[0])
        .iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(names, vec!["object_string", "last_mod_date"]);

    let part_b = tree.child_ids(tree.roots()[0])[0];
    let in_context: Vec<_> = tree
        .node(part_b)
        .occurrence_attributes
        .iter()
        .map(|a| (a.name.as_str(), a.group.as_deref()))
        .collect();
    assert_eq!(
        in_context,
        vec![
            ("SequenceNumber", Some("AttributesInContext")),
            ("Quantity", Some("AttributesInContext")),
        ]
    );
}

#[test]
fn rebuild_is_idempotent() {
    let doc = load("assembly.xml");
    let again = doc
        .rebuild(&BuildOptions::default(), &CancelToken::new())
        .unwrap();
    assert_eq!(&again.tree, doc.tree());
}

#[test]
fn instance_graph_dialect() {
    let doc = load("instance_graph.xml");
    let tree = doc.tree();
    let (root_id, root) = root(tree);

    assert_eq!(root.item.name, "Gearbox");
    assert_eq!(root.item.item_type, "assembly");
    assert_eq!(root.item.revision, "3");
    assert_eq!(child_names(tree, root_id), vec!["Shaft", "Bearing"]);

    let bearing = tree.child_ids(root_id)[1];
    assert_eq!(tree.node(bearing).quantity, 2);
    assert_eq!(tree.attribute(bearing, "Supplier"), Some("SKF"));
    assert_eq!(doc.views(), vec!["ig1"]);
}

#[test]
fn inferred_roots_follow_policy() {
    let all = load("multi_root.xml");
    let roots: Vec<_> = all
        .tree()
        .roots()
        .iter()
        .map(|id| all.tree().node(*id).item.name.clone())
        .collect();
    assert_eq!(roots, vec!["Left Bracket", "Right Bracket"]);
    assert_eq!(all.tree().len(), 4);

    // A shared part under two roots is a repeat, not a cycle
    assert!(all.diagnostics().is_empty());

    let first = load_with(
        "multi_root.xml",
        &BuildOptions::default().with_root_policy(RootPolicy::First),
    )
    .unwrap();
    assert_eq!(first.tree().roots().len(), 1);
    assert_eq!(first.tree().len(), 2);

    let single = load_with(
        "multi_root.xml",
        &BuildOptions::default().with_root_policy(RootPolicy::Single),
    );
    assert!(matches!(
        single,
        Err(plmxml::PlmxmlError::Structure(StructureError::AmbiguousRoot { .. }))
    ));
}

#[test]
fn pinned_view() {
    let doc = load_with("assembly.xml", &BuildOptions::default().with_view("id4")).unwrap();
    assert_eq!(doc.tree().len(), 3);

    let unknown = load_with("assembly.xml", &BuildOptions::default().with_view("id6"));
    assert!(matches!(
        unknown,
        Err(plmxml::PlmxmlError::Structure(StructureError::UnknownView(id))) if id == "id6"
    ));
}

#[test]
fn search_yields_paths() {
    let doc = load("assembly.xml");
    let tree = doc.tree();

    let hits: Vec<_> = tree.search("part-").map(|p| tree.path_string(p.target())).collect();
    assert_eq!(
        hits,
        vec![
            "A-1000/B;1-Assembly-A / Part-B",
            "A-1000/B;1-Assembly-A / Part-C",
        ]
    );

    let mut search = tree.search("a-1000");
    assert_eq!(search.next().map(|p| p.len()), Some(1));
    assert!(search.next().is_none());
    assert_eq!(
        doc.diagnostics()
            .iter()
            .filter(|d| d.kind() == DiagnosticKind::CycleDetected)
            .count(),
        0
    );
}
