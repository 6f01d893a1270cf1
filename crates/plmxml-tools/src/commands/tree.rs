use anyhow::Result;
use plmxml::{BomNode, BomTree, CancelToken, NodeId};
use termtree::Tree;

use crate::LoadArgs;
use crate::utils::{diagnostics, file as file_utils};

pub fn execute(args: &LoadArgs, depth: Option<usize>, cancel: &CancelToken) -> Result<()> {
    let doc = file_utils::load_document(args, cancel)?;

    let root_label = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.file.display().to_string());
    let rendered = render(doc.tree(), root_label, depth);
    print!("{rendered}");
    dismantle(rendered);

    diagnostics::report(doc.diagnostics());
    Ok(())
}

/// Build a printable tree: the file as the top label, then every root
///
/// Built on an explicit stack so chains thousands of levels deep render
/// without exhausting the call stack.
pub fn render(tree: &BomTree, root_label: String, max_depth: Option<usize>) -> Tree<String> {
    let mut top = Tree::new(root_label);
    for &root in tree.roots() {
        let mut stack = vec![open(tree, root, max_depth)];
        loop {
            let Some((_, children)) = stack.last_mut() else {
                break;
            };
            if let Some(&child) = children.next() {
                stack.push(open(tree, child, max_depth));
                continue;
            }
            let Some((done, _)) = stack.pop() else {
                break;
            };
            match stack.last_mut() {
                Some((parent, _)) => parent.leaves.push(done),
                None => top.leaves.push(done),
            }
        }
    }
    top
}

/// A node's label and the children still to be rendered under it
fn open(
    tree: &BomTree,
    id: NodeId,
    max_depth: Option<usize>,
) -> (Tree<String>, std::slice::Iter<'_, NodeId>) {
    let node = tree.node(id);
    let children: &[NodeId] = if max_depth.is_none_or(|max| node.depth < max) {
        &node.children
    } else {
        &[]
    };
    (Tree::new(node_label(node)), children.iter())
}

/// Drop a rendered tree level by level instead of recursively
pub fn dismantle(tree: Tree<String>) {
    let mut pending = vec![tree];
    while let Some(mut tree) = pending.pop() {
        pending.append(&mut tree.leaves);
    }
}

/// `name [rev] xQty`, with markers for truncated and unresolved nodes
pub fn node_label(node: &BomNode) -> String {
    let mut label = node.item.label().to_string();
    if !node.item.revision.is_empty() {
        label.push_str(&format!(" [{}]", node.item.revision));
    }
    if node.quantity > 1 {
        label.push_str(&format!(" x{}", node.quantity));
    }
    if node.item.unresolved {
        label.push_str(" (unresolved)");
    }
    if node.truncated {
        label.push_str(" (cycle)");
    }
    label
}

#[cfg(test)]
mod tests {
    use plmxml::Plmxml;

    use super::*;

    const DOC: &str = r##"<PLMXML>
  <ProductView id="pv" rootRefs="o1"/>
  <Occurrence id="o1" instancedRef="#r1" occurrenceRefs="o2 o3"/>
  <Occurrence id="o2" instancedRef="#r2" quantity="4" occurrenceRefs="o4"/>
  <Occurrence id="o3" instancedRef="#nope"/>
  <Occurrence id="o4" instancedRef="#r2"/>
  <ProductRevision id="r1" name="Frame" revision="A"/>
  <ProductRevision id="r2" name="Bolt" revision="C"/>
</PLMXML>"##;

    #[test]
    fn labels_and_markers() {
        let doc = Plmxml::parse(DOC).unwrap();
        let text = render(doc.tree(), "doc.xml".to_string(), None).to_string();

        assert!(text.starts_with("doc.xml\n"));
        assert!(text.contains("Frame [A]"));
        assert!(text.contains("Bolt [C] x4"));
        assert!(text.contains("nope (unresolved)"));
        assert!(text.contains("Bolt [C] (cycle)"));
    }

    #[test]
    fn deep_chain_renders_on_a_small_stack() {
        let depth = 2_000;
        let mut xml = String::from("<PLMXML>\n<ProductView id=\"pv\" rootRefs=\"o0\"/>\n");
        for i in 0..depth {
            let child = if i + 1 < depth {
                format!(" occurrenceRefs=\"o{}\"", i + 1)
            } else {
                String::new()
            };
            xml.push_str(&format!(
                "<Occurrence id=\"o{i}\" instancedRef=\"#r{i}\"{child}/>\n<ProductRevision id=\"r{i}\" name=\"Level {i}\"/>\n"
            ));
        }
        xml.push_str("</PLMXML>\n");
        let doc = Plmxml::parse(&xml).unwrap();

        let lines = std::thread::Builder::new()
            .stack_size(64 * 1024)
            .spawn(move || {
                let rendered = render(doc.tree(), "deep.xml".to_string(), None);
                let text = rendered.to_string();
                dismantle(rendered);
                text.lines()
                    .map(|line| line.trim().to_string())
                    .collect::<Vec<_>>()
            })
            .unwrap()
            .join()
            .unwrap();

        assert_eq!(lines.len(), depth + 1);
        assert_eq!(lines[1], "└── Level 0");
        assert_eq!(lines[depth], "└── Level 1999");
    }

    #[test]
    fn depth_limit() {
        let doc = Plmxml::parse(DOC).unwrap();
        let text = render(doc.tree(), "doc.xml".to_string(), Some(0)).to_string();
        assert!(text.contains("Frame [A]"));
        assert!(!text.contains("Bolt"));
    }
}
