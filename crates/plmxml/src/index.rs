use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use roxmltree::{Document, ParsingOptions};

use crate::decode::decode_document;
use crate::parse::Parser;
use crate::types::*;
use crate::{Interner, ParseError, Symbol};

/// Identifier -> raw element table for one PLMXML document
///
/// Built once per parse and never mutated afterwards. Elements are stored
/// in document order; `ElementId` is the position in that order.
#[derive(Debug, Clone)]
pub struct RawIndex {
    interner: Interner,
    elements: Vec<RawElement>,
    by_id: HashMap<Symbol, ElementId>,
    duplicates: Vec<Symbol>,
    /// Ids of elements present in the document but not indexed
    unindexed_ids: HashSet<Symbol>,
    header: DocumentHeader,
    base_dir: Option<PathBuf>,
}

impl RawIndex {
    /// Index a document held in memory as text
    pub fn parse(xml: &str) -> Result<Self, ParseError> {
        if xml.trim().is_empty() {
            return Err(ParseError::EmptyDocument);
        }

        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let doc = Document::parse_with_options(xml, options)?;
        let parsed = Parser::new().parse_document(&doc)?;

        Ok(Self {
            interner: parsed.interner,
            elements: parsed.elements,
            by_id: parsed.by_id,
            duplicates: parsed.duplicates,
            unindexed_ids: parsed.unindexed_ids,
            header: parsed.header,
            base_dir: None,
        })
    }

    /// Index raw file content, decoding it per the XML declaration
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        let text = decode_document(bytes)?;
        Self::parse(&text)
    }

    /// Directory that relative `locationRef` paths are resolved against
    pub fn with_base_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.base_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    pub fn header(&self) -> &DocumentHeader {
        &self.header
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element(&self, id: ElementId) -> &RawElement {
        &self.elements[id.index()]
    }

    /// All indexed elements in document order
    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &RawElement)> + '_ {
        self.elements
            .iter()
            .enumerate()
            .map(|(i, el)| (ElementId(i as u32), el))
    }

    pub fn elements_of(&self, kind: ElementKind) -> impl Iterator<Item = (ElementId, &RawElement)> + '_ {
        self.elements().filter(move |(_, el)| el.kind == kind)
    }

    /// Exact identifier lookup. A leading `#` is URI fragment syntax and
    /// is ignored; nothing else is normalised.
    pub fn lookup(&self, identifier: &str) -> Option<ElementId> {
        let identifier = identifier.strip_prefix('#').unwrap_or(identifier);
        let sym = self.interner.get(identifier)?;
        self.by_id.get(&sym).copied()
    }

    pub(crate) fn lookup_symbol(&self, sym: Symbol) -> Option<ElementId> {
        self.by_id.get(&sym).copied()
    }

    /// Whether any element of the document declares this id, indexed or not
    pub(crate) fn declares(&self, sym: Symbol) -> bool {
        self.by_id.contains_key(&sym) || self.unindexed_ids.contains(&sym)
    }

    /// Resolve an identifier to its element; dangling references yield `None`
    pub fn resolve(&self, identifier: &str) -> Option<&RawElement> {
        self.lookup(identifier).map(|id| self.element(id))
    }

    /// Text of an interned symbol
    pub fn text(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    pub fn attr<'a>(&'a self, el: &RawElement, name: &str) -> Option<&'a str> {
        let key = self.interner.get(name)?;
        el.attribute(key).map(|v| self.text(v))
    }

    /// Attribute value, ignoring empty strings
    pub fn attr_non_empty<'a>(&'a self, el: &RawElement, name: &str) -> Option<&'a str> {
        self.attr(el, name)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Reference targets declared in one attribute, in declaration order
    pub fn references(&self, el: &RawElement, attribute: &str) -> Vec<Symbol> {
        match self.interner.get(attribute) {
            Some(key) => el.references_in(key).collect(),
            None => Vec::new(),
        }
    }

    pub fn first_reference(&self, el: &RawElement, attribute: &str) -> Option<Symbol> {
        let key = self.interner.get(attribute)?;
        el.references_in(key).next()
    }

    pub fn id_str(&self, el: &RawElement) -> Option<&str> {
        el.id.map(|id| self.text(id))
    }

    /// Identifier, or the tag name for unaddressable elements
    pub fn label(&self, el: &RawElement) -> &str {
        self.id_str(el).unwrap_or_else(|| self.text(el.tag))
    }

    /// Identifiers declared more than once (the later element was kept)
    pub fn duplicates(&self) -> impl Iterator<Item = &str> + '_ {
        self.duplicates.iter().map(|sym| self.text(*sym))
    }

    /// Children of one kind, in document order
    pub fn children_of<'a>(
        &'a self,
        el: &'a RawElement,
        kind: ElementKind,
    ) -> impl Iterator<Item = (ElementId, &'a RawElement)> + 'a {
        el.children
            .iter()
            .map(|id| (*id, self.element(*id)))
            .filter(move |(_, child)| child.kind == kind)
    }

    /// Element counts per kind, in first-seen order
    pub fn kind_counts(&self) -> Vec<(ElementKind, usize)> {
        let mut counts: Vec<(ElementKind, usize)> = Vec::new();
        for el in &self.elements {
            match counts.iter_mut().find(|(kind, _)| *kind == el.kind) {
                Some((_, count)) => *count += 1,
                None => counts.push((el.kind, 1)),
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<PLMXML xmlns="http://www.plmxml.org/Schemas/PLMXMLSchema" schemaVersion="6" author="Test User">
  <Header id="h1" transferContext="TestCtx"/>
  <ProductView id="pv1" rootRefs="#occ1">
    <Occurrence id="occ1" instancedRef="#rev1" occurrenceRefs="occ2 occ3"/>
  </ProductView>
  <Vendor:Extension xmlns:Vendor="urn:vendor">
    <Vendor:Thing id="v1"/>
  </Vendor:Extension>
  <ProductRevision id="rev1" name="Part A" revision="A"/>
</PLMXML>"##;

    #[test]
    fn indexes_known_elements() {
        let index = RawIndex::parse(SIMPLE).unwrap();
        let occ = index.resolve("occ1").unwrap();
        assert_eq!(occ.kind, ElementKind::Occurrence);
        assert_eq!(index.attr(occ, "instancedRef"), Some("#rev1"));

        let children: Vec<_> = index
            .references(occ, "occurrenceRefs")
            .into_iter()
            .map(|s| index.text(s).to_string())
            .collect();
        assert_eq!(children, vec!["occ2", "occ3"]);
    }

    #[test]
    fn unknown_elements_are_not_indexed() {
        let index = RawIndex::parse(SIMPLE).unwrap();
        assert!(index.resolve("v1").is_none());
        assert!(index.resolve("missing").is_none());
    }

    #[test]
    fn hash_prefixed_lookup() {
        let index = RawIndex::parse(SIMPLE).unwrap();
        assert_eq!(index.lookup("#rev1"), index.lookup("rev1"));
        assert!(index.lookup("rev").is_none());
    }

    #[test]
    fn header_is_captured() {
        let index = RawIndex::parse(SIMPLE).unwrap();
        let header = index.header();
        assert_eq!(header.schema_version.as_deref(), Some("6"));
        assert_eq!(header.author.as_deref(), Some("Test User"));
        assert_eq!(header.transfer_context.as_deref(), Some("TestCtx"));
    }

    #[test]
    fn duplicate_ids_last_write_wins() {
        let xml = r#"<PLMXML>
  <Product id="x" name="first"/>
  <DataSet id="x" name="second"/>
</PLMXML>"#;
        let index = RawIndex::parse(xml).unwrap();
        let el = index.resolve("x").unwrap();
        assert_eq!(el.kind, ElementKind::DataSet);
        assert_eq!(index.attr(el, "name"), Some("second"));
        assert_eq!(index.duplicates().collect::<Vec<_>>(), vec!["x"]);
    }

    #[test]
    fn children_skip_unknown_wrappers() {
        let xml = r#"<PLMXML>
  <ProductRevision id="r1">
    <Wrapper><UserData><UserValue title="a" value="1"/></UserData></Wrapper>
  </ProductRevision>
</PLMXML>"#;
        let index = RawIndex::parse(xml).unwrap();
        let rev = index.resolve("r1").unwrap();
        assert_eq!(index.children_of(rev, ElementKind::UserData).count(), 1);
    }

    #[test]
    fn malformed_and_empty_documents() {
        assert!(matches!(
            RawIndex::parse("<PLMXML><Occurrence></PLMXML>"),
            Err(ParseError::MalformedXml(_))
        ));
        assert!(matches!(RawIndex::parse("   "), Err(ParseError::EmptyDocument)));
        assert!(matches!(
            RawIndex::from_bytes(b""),
            Err(ParseError::EmptyDocument)
        ));
    }
}
