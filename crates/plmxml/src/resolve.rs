// Per-kind resolvers: raw element records -> typed records.
//
// Each resolver looks at one element (plus whatever it references) and
// either produces its typed record or returns `None` when the element is
// not of the shape it understands. Heterogeneous pools are normal, so a
// mismatch is never an error.

use std::collections::HashMap;
use std::path::Path;

use crate::diagnostics::Diagnostic;
use crate::refs::Resolver;
use crate::types::*;
use crate::RawIndex;

/// UserValue titles with a meaning beyond plain display
pub const OBJECT_STRING: &str = "object_string";
pub const LAST_MOD_DATE: &str = "last_mod_date";

/// Resolve item metadata from a part / product / design element
///
/// The revision comes from the element the item "uses" (`revisionRef`)
/// when present, else from its own `revision` attribute. Name, id and type
/// fall back to the master (`masterRef`) when the element itself is silent.
pub fn resolve_item(el: &RawElement, resolver: &mut Resolver<'_>) -> Option<ItemInfo> {
    if !el.kind.is_item() {
        return None;
    }
    let index = resolver.index();
    let master = resolver.follow(el, "masterRef").map(|(_, m)| m);
    let used_revision = resolver.follow(el, "revisionRef").map(|(_, r)| r);
    let values = resolve_attributes(el, index);

    let name = attr_of(index, Some(el), "name")
        .or_else(|| attr_of(index, master, "name"))
        .or_else(|| index.id_str(el))
        .unwrap_or_default()
        .to_string();

    let display_name = user_value(&values, OBJECT_STRING)
        .map(String::from)
        .unwrap_or_else(|| name.clone());

    let id = attr_of(index, Some(el), "productId")
        .or_else(|| attr_of(index, master, "productId"))
        .map(String::from);

    let item_type = attr_of(index, Some(el), "subType")
        .or_else(|| attr_of(index, Some(el), "type"))
        .or_else(|| attr_of(index, master, "subType"))
        .or_else(|| attr_of(index, master, "type"))
        .unwrap_or_default()
        .to_string();

    let revision = attr_of(index, used_revision, "revision")
        .or_else(|| attr_of(index, Some(el), "revision"))
        .unwrap_or_default()
        .to_string();

    let uid = application_label(el, index)
        .or_else(|| master.and_then(|m| application_label(m, index)))
        .map(String::from);

    Some(ItemInfo {
        source_id: index.id_str(el).map(String::from),
        id,
        name,
        display_name,
        item_type,
        revision,
        last_modified: user_value(&values, LAST_MOD_DATE).map(String::from),
        uid,
        unresolved: false,
    })
}

/// Flatten every UserValue under an element's UserData groups
///
/// Declaration order is preserved and duplicate titles are kept as
/// separate entries.
pub fn resolve_attributes(el: &RawElement, index: &RawIndex) -> Vec<AttributeEntry> {
    let mut entries = Vec::new();
    for (_, user_data) in index.children_of(el, ElementKind::UserData) {
        collect_user_data(user_data, None, index, &mut entries);
    }
    entries
}

fn collect_user_data(
    user_data: &RawElement,
    inherited_group: Option<&str>,
    index: &RawIndex,
    out: &mut Vec<AttributeEntry>,
) {
    let group = index
        .attr_non_empty(user_data, "type")
        .or(inherited_group);

    for &child_id in &user_data.children {
        let child = index.element(child_id);
        match child.kind {
            ElementKind::UserValue => {
                let Some(title) = index.attr_non_empty(child, "title") else {
                    continue;
                };
                out.push(AttributeEntry {
                    name: title.to_string(),
                    value: user_value_text(child, index),
                    group: group.map(String::from),
                });
                // UserValues may carry their own nested groups
                for (_, nested) in index.children_of(child, ElementKind::UserData) {
                    collect_user_data(nested, group, index, out);
                }
            }
            ElementKind::UserData => collect_user_data(child, group, index, out),
            _ => {}
        }
    }
}

/// `value`, else the items of a `UserList` joined with ", "
fn user_value_text(user_value: &RawElement, index: &RawIndex) -> String {
    if let Some(value) = index.attr(user_value, "value") {
        return value.to_string();
    }
    index
        .children_of(user_value, ElementKind::UserList)
        .flat_map(|(_, list)| index.children_of(list, ElementKind::ListItem))
        .filter_map(|(_, item)| index.attr(item, "value"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolve a DataSet and the ExternalFiles it references
///
/// A dataset whose members are all missing still resolves, with an empty
/// file list, so the caller can show "dataset present, files missing".
pub fn resolve_dataset(el: &RawElement, resolver: &mut Resolver<'_>) -> Option<DatasetRef> {
    if el.kind != ElementKind::DataSet {
        return None;
    }
    let index = resolver.index();

    let mut files = Vec::new();
    let mut missing_members = Vec::new();
    for member in index.references(el, "memberRefs") {
        match resolver.resolve(member) {
            Some(file) if file.kind == ElementKind::ExternalFile => {
                files.push(file_entry(file, index));
            }
            _ => missing_members.push(index.text(member).to_string()),
        }
    }

    Some(DatasetRef {
        id: index.id_str(el).map(String::from),
        role: None,
        dataset_type: index.attr_non_empty(el, "type").unwrap_or_default().to_string(),
        name: index
            .attr_non_empty(el, "name")
            .or_else(|| index.id_str(el))
            .unwrap_or_default()
            .to_string(),
        version: index.attr_non_empty(el, "version").map(String::from),
        files,
        missing_members,
    })
}

fn file_entry(file: &RawElement, index: &RawIndex) -> FileEntry {
    let location = index.attr(file, "locationRef").unwrap_or_default().trim();
    // Exporters on Windows write backslash separated locations
    let filename = location
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(location)
        .to_string();
    let path = match index.base_dir() {
        Some(dir) if !location.is_empty() => Some(dir.join(Path::new(location))),
        _ => None,
    };

    FileEntry {
        filename,
        location: location.to_string(),
        format: index.attr_non_empty(file, "format").map(String::from),
        path,
    }
}

/// Datasets attached to an element, with their roles
///
/// Follows `associatedAttachmentRefs` -> AssociatedAttachment -> DataSet and
/// nested `AssociatedDataSet` children. Attachments pointing at anything
/// other than a DataSet (e.g. Forms) are skipped.
pub fn resolve_attachments(
    el: &RawElement,
    resolver: &mut Resolver<'_>,
    datasets: &HashMap<ElementId, DatasetRef>,
) -> Vec<DatasetRef> {
    let index = resolver.index();
    let mut links: Vec<(Option<&str>, ElementId)> = Vec::new();

    for attachment_ref in index.references(el, "associatedAttachmentRefs") {
        let Some(attachment) = resolver.resolve(attachment_ref) else {
            continue;
        };
        if attachment.kind != ElementKind::AssociatedAttachment {
            continue;
        }
        if let Some((target, _)) = resolver.follow(attachment, "attachmentRef") {
            links.push((index.attr_non_empty(attachment, "role"), target));
        }
    }

    for (_, associated) in index.children_of(el, ElementKind::AssociatedDataSet) {
        if let Some((target, _)) = resolver.follow(associated, "dataSetRef") {
            links.push((index.attr_non_empty(associated, "role"), target));
        }
    }

    let mut seen: Vec<(Option<&str>, ElementId)> = Vec::new();
    let mut out = Vec::new();
    for (role, target) in links {
        if seen.contains(&(role, target)) {
            continue;
        }
        seen.push((role, target));

        let dataset = match datasets.get(&target) {
            Some(dataset) => Some(dataset.clone()),
            None => resolve_dataset(index.element(target), resolver),
        };
        if let Some(dataset) = dataset {
            out.push(dataset.with_role(role.map(String::from)));
        }
    }
    out
}

/// Typed lookup tables keyed by element, produced by one pass over the index
#[derive(Debug, Clone, Default)]
pub struct TypedTables {
    items: HashMap<ElementId, ItemInfo>,
    attributes: HashMap<ElementId, Vec<AttributeEntry>>,
    datasets: HashMap<ElementId, DatasetRef>,
    attachments: HashMap<ElementId, Vec<DatasetRef>>,
    diagnostics: Vec<Diagnostic>,
}

impl TypedTables {
    pub fn build(index: &RawIndex) -> Self {
        let mut resolver = Resolver::new(index);
        let mut tables = Self::default();

        for id in index.duplicates() {
            tables.diagnostics.push(Diagnostic::DuplicateIdentifier { id: id.to_string() });
        }

        // Datasets first so attachments can reuse them
        for (id, el) in index.elements_of(ElementKind::DataSet) {
            if let Some(dataset) = resolve_dataset(el, &mut resolver) {
                for member in &dataset.missing_members {
                    tables.diagnostics.push(Diagnostic::MissingFileEntry {
                        dataset: dataset.id.clone().unwrap_or_else(|| dataset.name.clone()),
                        member: member.clone(),
                    });
                }
                tables.datasets.insert(id, dataset);
            }
        }

        for (id, el) in index.elements() {
            if let Some(item) = resolve_item(el, &mut resolver) {
                tables.items.insert(id, item);
            }

            if el.kind.is_item() || el.kind.is_usage() {
                let attached = resolve_attachments(el, &mut resolver, &tables.datasets);
                if !attached.is_empty() {
                    tables.attachments.insert(id, attached);
                }
            }

            if !el.kind.owns_attributes() {
                continue;
            }
            let attributes = resolve_attributes(el, index);
            if !attributes.is_empty() {
                tables.check_ambiguous(index.label(el), &attributes);
                tables.attributes.insert(id, attributes);
            }
        }

        tables.scan_dangling(index);

        log::debug!(
            "Resolved {} items, {} datasets, {} attribute owners ({} diagnostics)",
            tables.items.len(),
            tables.datasets.len(),
            tables.attributes.len(),
            tables.diagnostics.len()
        );
        tables
    }

    fn check_ambiguous(&mut self, owner: &str, attributes: &[AttributeEntry]) {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for entry in attributes {
            match counts.iter_mut().find(|(name, _)| *name == entry.name) {
                Some((_, count)) => *count += 1,
                None => counts.push((&entry.name, 1)),
            }
        }
        for (name, count) in counts.into_iter().filter(|(_, count)| *count > 1) {
            self.diagnostics.push(Diagnostic::AmbiguousAttributeName {
                owner: owner.to_string(),
                name: name.to_string(),
                count,
            });
        }
    }

    /// One diagnostic per reference value whose target is declared nowhere
    /// in the document. Dataset members are reported as missing file
    /// entries instead.
    fn scan_dangling(&mut self, index: &RawIndex) {
        for (_, el) in index.elements() {
            for reference in &el.references {
                let attribute = index.text(reference.attribute);
                if el.kind == ElementKind::DataSet && attribute == "memberRefs" {
                    continue;
                }
                if !index.declares(reference.target) {
                    self.diagnostics.push(Diagnostic::UnresolvedReference {
                        source: index.label(el).to_string(),
                        attribute: attribute.to_string(),
                        target: index.text(reference.target).to_string(),
                    });
                }
            }
        }
    }

    pub fn item(&self, id: ElementId) -> Option<&ItemInfo> {
        self.items.get(&id)
    }

    pub fn attributes(&self, id: ElementId) -> &[AttributeEntry] {
        self.attributes.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn dataset(&self, id: ElementId) -> Option<&DatasetRef> {
        self.datasets.get(&id)
    }

    pub fn attachments(&self, id: ElementId) -> &[DatasetRef] {
        self.attachments.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn dataset_count(&self) -> usize {
        self.datasets.len()
    }

    /// Diagnostics found while resolving (document-wide, not only the
    /// part reachable from the roots)
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

fn attr_of<'a>(index: &'a RawIndex, el: Option<&RawElement>, name: &str) -> Option<&'a str> {
    el.and_then(|el| index.attr_non_empty(el, name))
}

fn user_value<'a>(values: &'a [AttributeEntry], title: &str) -> Option<&'a str> {
    values
        .iter()
        .find(|entry| entry.name == title && !entry.value.is_empty())
        .map(|entry| entry.value.as_str())
}

fn application_label<'a>(el: &RawElement, index: &'a RawIndex) -> Option<&'a str> {
    index
        .children_of(el, ElementKind::ApplicationRef)
        .find_map(|(_, app)| index.attr_non_empty(app, "label"))
}
