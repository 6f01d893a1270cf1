use std::collections::{HashMap, HashSet};

use roxmltree::{Document, Node};

use crate::types::*;
use crate::{Interner, ParseError, Symbol};

/// Parser context holding the string interner and the element arena
pub struct Parser {
    pub interner: Interner,
    elements: Vec<RawElement>,
    by_id: HashMap<Symbol, ElementId>,
    duplicates: Vec<Symbol>,
    unindexed_ids: HashSet<Symbol>,
    header: DocumentHeader,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            interner: Interner::new(),
            elements: Vec::new(),
            by_id: HashMap::new(),
            duplicates: Vec::new(),
            unindexed_ids: HashSet::new(),
            header: DocumentHeader::default(),
        }
    }

    pub fn parse_document(mut self, doc: &Document) -> Result<ParsedIndex, ParseError> {
        let root = doc.root_element();
        if root.tag_name().name() != "PLMXML" {
            log::warn!(
                "Root element is '{}', not 'PLMXML'; indexing anyway",
                root.tag_name().name()
            );
        }

        // Indexed ancestors are looked up by roxmltree node id so unknown
        // wrapper elements are skipped transparently.
        let mut indexed: HashMap<roxmltree::NodeId, ElementId> = HashMap::new();

        // `descendants` yields document order, which the builder relies on
        // for deterministic root selection.
        for node in root.descendants().filter(|n| n.is_element()) {
            let parent = node
                .ancestors()
                .skip(1)
                .find_map(|ancestor| indexed.get(&ancestor.id()).copied());
            let parent_kind = parent.map(|p| self.elements[p.index()].kind);

            let Some(kind) = classify(&node, parent_kind) else {
                // Not indexed, but references to it are not dangling either
                if let Some(id) = element_id_attr(&node) {
                    let id = self.interner.intern(id)?;
                    self.unindexed_ids.insert(id);
                }
                continue;
            };

            let element_id = self.push_element(&node, kind, parent)?;
            indexed.insert(node.id(), element_id);
        }

        log::debug!(
            "Indexed {} elements ({} addressable, {} duplicate ids, {} ids skipped)",
            self.elements.len(),
            self.by_id.len(),
            self.duplicates.len(),
            self.unindexed_ids.len()
        );

        Ok(ParsedIndex {
            interner: self.interner,
            elements: self.elements,
            by_id: self.by_id,
            duplicates: self.duplicates,
            unindexed_ids: self.unindexed_ids,
            header: self.header,
        })
    }

    fn push_element(
        &mut self,
        node: &Node,
        kind: ElementKind,
        parent: Option<ElementId>,
    ) -> Result<ElementId, ParseError> {
        let element_id = u32::try_from(self.elements.len())
            .map(ElementId)
            .map_err(|_| ParseError::TooLarge("elements"))?;

        let tag = self.interner.intern(node.tag_name().name())?;
        let id = element_id_attr(node)
            .map(|s| self.interner.intern(s))
            .transpose()?;

        let mut attributes = Vec::new();
        let mut references = Vec::new();
        for attr in node.attributes() {
            let name = attr.name();
            let key = self.interner.intern(name)?;
            attributes.push((key, self.interner.intern(attr.value())?));

            if is_reference_attribute(name) {
                for target in split_refs(attr.value()) {
                    references.push(Reference {
                        attribute: key,
                        target: self.interner.intern(target)?,
                    });
                }
            }
        }

        match kind {
            ElementKind::Document => self.parse_document_header(node),
            ElementKind::Header if self.header.transfer_context.is_none() => {
                self.header.transfer_context = node.attribute("transferContext").map(String::from);
            }
            _ => {}
        }

        if let Some(id) = id {
            // Last declaration wins
            if self.by_id.insert(id, element_id).is_some() {
                log::warn!(
                    "Duplicate identifier '{}'; keeping the later <{}>",
                    self.interner.resolve(id),
                    kind.as_str()
                );
                self.duplicates.push(id);
            }
        }

        if let Some(parent) = parent {
            self.elements[parent.index()].children.push(element_id);
        }

        self.elements.push(RawElement {
            id,
            kind,
            tag,
            attributes,
            children: Vec::new(),
            references,
            parent,
        });

        Ok(element_id)
    }

    fn parse_document_header(&mut self, node: &Node) {
        if self.header.schema_version.is_some() {
            return;
        }
        let attr = |name: &str| node.attribute(name).map(String::from);
        self.header.schema_version = attr("schemaVersion");
        self.header.author = attr("author");
        self.header.date = attr("date");
        self.header.time = attr("time");
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify an element, ignoring anything outside the PLMXML namespace
fn classify(node: &Node, parent: Option<ElementKind>) -> Option<ElementKind> {
    let in_plmxml = match node.tag_name().namespace() {
        None => true,
        Some(ns) => ns.to_ascii_lowercase().contains("plmxml"),
    };
    if !in_plmxml {
        return None;
    }
    ElementKind::from_tag(node.tag_name().name(), parent)
}

fn element_id_attr<'a>(node: &Node<'a, '_>) -> Option<&'a str> {
    node.attribute("id").map(str::trim).filter(|s| !s.is_empty())
}

/// Attributes holding identifiers of other elements
///
/// `locationRef` is the odd one out: it holds a file path.
pub(crate) fn is_reference_attribute(name: &str) -> bool {
    (name.ends_with("Ref") || name.ends_with("Refs")) && name != "locationRef"
}

/// Split a space separated reference list and strip the URI fragment `#`
pub(crate) fn split_refs(value: &str) -> impl Iterator<Item = &str> {
    value
        .split_whitespace()
        .map(|r| r.strip_prefix('#').unwrap_or(r))
        .filter(|r| !r.is_empty())
}

/// Parsed raw index (before being wrapped in `RawIndex`)
#[derive(Debug)]
pub struct ParsedIndex {
    pub interner: Interner,
    pub elements: Vec<RawElement>,
    pub by_id: HashMap<Symbol, ElementId>,
    pub duplicates: Vec<Symbol>,
    pub unindexed_ids: HashSet<Symbol>,
    pub header: DocumentHeader,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_attributes() {
        assert!(is_reference_attribute("instancedRef"));
        assert!(is_reference_attribute("occurrenceRefs"));
        assert!(is_reference_attribute("memberRefs"));
        assert!(!is_reference_attribute("locationRef"));
        assert!(!is_reference_attribute("name"));
    }

    #[test]
    fn split_refs_strips_hash() {
        let refs: Vec<_> = split_refs(" #id1  id2 # #id3").collect();
        assert_eq!(refs, vec!["id1", "id2", "id3"]);
    }
}
