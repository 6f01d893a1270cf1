use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::cancel::CancelToken;
use crate::diagnostics::Diagnostic;
use crate::refs::Resolver;
use crate::resolve::TypedTables;
use crate::tree::BomTree;
use crate::types::*;
use crate::{RawIndex, Result, StructureError, Symbol};

/// What to do when more than one root candidate is found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RootPolicy {
    /// Keep every candidate, in document order
    #[default]
    All,
    /// Keep the first candidate in document order
    First,
    /// Fail with `AmbiguousRoot` unless there is exactly one candidate
    Single,
}

impl RootPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::First => "first",
            Self::Single => "single",
        }
    }
}

impl fmt::Display for RootPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RootPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "first" => Ok(Self::First),
            "single" => Ok(Self::Single),
            other => Err(format!("unknown root policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub root_policy: RootPolicy,
    /// Identifier of the ProductView / InstanceGraph to build from
    pub view: Option<String>,
    /// Poll the cancel token every this many created nodes
    pub cancel_check_interval: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            root_policy: RootPolicy::All,
            view: None,
            cancel_check_interval: 256,
        }
    }
}

impl BuildOptions {
    pub fn with_root_policy(mut self, policy: RootPolicy) -> Self {
        self.root_policy = policy;
        self
    }

    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.view = Some(view.into());
        self
    }
}

/// Tree plus the diagnostics found while building it
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub tree: BomTree,
    pub diagnostics: Vec<Diagnostic>,
}

/// Something to place in the tree
#[derive(Debug, Clone, Copy)]
enum Entry {
    /// An Occurrence / Instance, expanded through its target
    Usage(ElementId),
    /// An item referenced directly (InstanceGraph roots)
    Item(ElementId),
    /// Reference to an identifier that does not exist
    Dangling(Symbol),
}

enum Step {
    Visit {
        parent: Option<NodeId>,
        entry: Entry,
    },
    /// Pops the keys pushed by the matching visit off the active path
    Leave([Option<ElementId>; 2]),
}

/// Assemble the BOM tree from the index and its resolved tables
///
/// Expansion uses an explicit work stack; the active path holds the usage
/// and target element of every open branch so a repeated one is attached
/// as a truncated leaf instead of being expanded again.
pub fn build_tree(
    index: &RawIndex,
    tables: &TypedTables,
    options: &BuildOptions,
    cancel: &CancelToken,
) -> Result<BuildOutput> {
    let roots = find_roots(index, options)?;
    let mut builder = Builder {
        index,
        tables,
        resolver: Resolver::new(index),
        nodes: Vec::new(),
        roots: Vec::new(),
        active: HashSet::new(),
        diagnostics: Vec::new(),
    };

    let interval = options.cancel_check_interval.max(1);
    let mut stack: Vec<Step> = roots
        .into_iter()
        .rev()
        .map(|entry| Step::Visit {
            parent: None,
            entry,
        })
        .collect();

    while let Some(step) = stack.pop() {
        let (parent, entry) = match step {
            Step::Leave(keys) => {
                for key in keys.into_iter().flatten() {
                    builder.active.remove(&key);
                }
                continue;
            }
            Step::Visit { parent, entry } => (parent, entry),
        };

        if parent.is_none() || builder.nodes.len() % interval == 0 {
            cancel.check()?;
        }

        if let Some((node_id, keys, children)) = builder.visit(parent, entry)? {
            stack.push(Step::Leave(keys));
            stack.extend(children.into_iter().rev().map(|entry| Step::Visit {
                parent: Some(node_id),
                entry,
            }));
        }
    }

    log::debug!(
        "Built tree: {} roots, {} nodes, {} cycles",
        builder.roots.len(),
        builder.nodes.len(),
        builder.diagnostics.len()
    );

    Ok(BuildOutput {
        tree: BomTree::new(builder.nodes, builder.roots),
        diagnostics: builder.diagnostics,
    })
}

struct Builder<'a> {
    index: &'a RawIndex,
    tables: &'a TypedTables,
    resolver: Resolver<'a>,
    nodes: Vec<BomNode>,
    roots: Vec<NodeId>,
    active: HashSet<ElementId>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Builder<'a> {
    /// Create the node for `entry`. Returns the node, the active-path keys
    /// it opened and its child entries when it should be expanded.
    fn visit(
        &mut self,
        parent: Option<NodeId>,
        entry: Entry,
    ) -> Result<Option<(NodeId, [Option<ElementId>; 2], Vec<Entry>)>> {
        let index = self.index;

        let (usage, target) = match entry {
            Entry::Dangling(sym) => {
                self.push_node(parent, placeholder_node(None, index.text(sym)))?;
                return Ok(None);
            }
            Entry::Item(target) => (None, Target::Found(target)),
            Entry::Usage(usage) => (Some(usage), self.usage_target(usage)),
        };

        let target_id = match target {
            Target::Found(id) => Some(id),
            _ => None,
        };
        let keys = [usage, target_id];

        let mut node = self.make_node(usage, &target);
        let on_path = keys.iter().flatten().any(|key| self.active.contains(key));
        if on_path {
            node.truncated = true;
            self.record_cycle(parent, usage, target_id);
        }
        let node_id = self.push_node(parent, node)?;

        // A usage whose target is missing or dangling still carries its own
        // child usages
        if on_path {
            return Ok(None);
        }

        for key in keys.iter().flatten() {
            self.active.insert(*key);
        }
        Ok(Some((node_id, keys, self.child_entries(usage, target_id))))
    }

    fn usage_target(&mut self, usage: ElementId) -> Target {
        let index = self.index;
        let el = index.element(usage);
        let reference = index
            .first_reference(el, "instancedRef")
            .or_else(|| index.first_reference(el, "partRef"));
        match reference {
            None => Target::Missing,
            Some(sym) => match self.resolver.resolve_id(sym) {
                Some(id) => Target::Found(id),
                None => Target::Dangling(sym),
            },
        }
    }

    fn make_node(&self, usage: Option<ElementId>, target: &Target) -> BomNode {
        let index = self.index;
        let tables = self.tables;
        let usage_el = usage.map(|u| index.element(u));

        let item = match *target {
            Target::Found(id) => tables.item(id).cloned().unwrap_or_else(|| {
                let mut item = ItemInfo::unresolved(index.label(index.element(id)));
                item.source_id = index.id_str(index.element(id)).map(String::from);
                item
            }),
            Target::Dangling(sym) => ItemInfo::unresolved(index.text(sym)),
            Target::Missing => {
                let label = usage_el
                    .and_then(|el| index.attr_non_empty(el, "name").or_else(|| index.id_str(el)))
                    .unwrap_or_default();
                ItemInfo::unresolved(label)
            }
        };

        let occurrence_attributes = usage.map(|u| tables.attributes(u).to_vec()).unwrap_or_default();
        let quantity = usage_el
            .and_then(|el| index.attr_non_empty(el, "quantity"))
            .or_else(|| find_value(&occurrence_attributes, "Quantity"))
            .map(parse_quantity)
            .unwrap_or(1);
        let sequence_number = find_value(&occurrence_attributes, "SequenceNumber")
            .or_else(|| usage_el.and_then(|el| index.attr_non_empty(el, "sequenceNumber")))
            .map(String::from);

        let (attributes, mut datasets) = match *target {
            Target::Found(id) => (tables.attributes(id).to_vec(), tables.attachments(id).to_vec()),
            _ => (Vec::new(), Vec::new()),
        };
        if let Some(u) = usage {
            datasets.extend_from_slice(tables.attachments(u));
        }

        let occurrence_id = match (usage_el, *target) {
            (Some(el), _) => index.id_str(el).map(String::from),
            (None, Target::Found(id)) => index.id_str(index.element(id)).map(String::from),
            _ => None,
        };

        BomNode {
            occurrence_id,
            item,
            quantity,
            sequence_number,
            attributes,
            occurrence_attributes,
            datasets,
            children: Vec::new(),
            parent: None,
            depth: 0,
            truncated: false,
        }
    }

    /// The usage's own child usages, then those declared on its target
    fn child_entries(&mut self, usage: Option<ElementId>, target: Option<ElementId>) -> Vec<Entry> {
        let index = self.index;
        let mut refs = Vec::new();
        if let Some(u) = usage {
            refs.extend(index.references(index.element(u), "occurrenceRefs"));
        }
        if let Some(t) = target {
            let el = index.element(t);
            refs.extend(index.references(el, "occurrenceRefs"));
            refs.extend(index.references(el, "instanceRefs"));
        }

        refs.into_iter()
            .map(|sym| match self.resolver.resolve_id(sym) {
                Some(id) if index.element(id).kind.is_usage() => Entry::Usage(id),
                Some(id) => Entry::Item(id),
                None => Entry::Dangling(sym),
            })
            .collect()
    }

    fn push_node(&mut self, parent: Option<NodeId>, mut node: BomNode) -> Result<NodeId> {
        let id = u32::try_from(self.nodes.len())
            .map(NodeId)
            .map_err(|_| StructureError::TooManyNodes)?;
        node.parent = parent;
        match parent {
            Some(p) => {
                node.depth = self.nodes[p.index()].depth + 1;
                self.nodes[p.index()].children.push(id);
            }
            None => self.roots.push(id),
        }
        self.nodes.push(node);
        Ok(id)
    }

    fn record_cycle(&mut self, parent: Option<NodeId>, usage: Option<ElementId>, target: Option<ElementId>) {
        let index = self.index;
        let label = |el: Option<ElementId>| {
            el.map(|id| index.label(index.element(id)).to_string())
                .unwrap_or_default()
        };

        let mut path = Vec::new();
        let mut cursor = parent;
        while let Some(id) = cursor {
            let node = &self.nodes[id.index()];
            path.push(
                node.occurrence_id
                    .clone()
                    .unwrap_or_else(|| node.item.label().to_string()),
            );
            cursor = node.parent;
        }
        path.reverse();
        path.push(label(usage.or(target)));

        let diagnostic = Diagnostic::CycleDetected {
            occurrence: label(usage.or(target)),
            target: label(target),
            path,
        };
        log::debug!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}

#[derive(Debug, Clone, Copy)]
enum Target {
    Found(ElementId),
    Dangling(Symbol),
    /// The usage names no target at all
    Missing,
}

fn placeholder_node(occurrence_id: Option<String>, label: &str) -> BomNode {
    BomNode {
        occurrence_id,
        item: ItemInfo::unresolved(label),
        quantity: 1,
        sequence_number: None,
        attributes: Vec::new(),
        occurrence_attributes: Vec::new(),
        datasets: Vec::new(),
        children: Vec::new(),
        parent: None,
        depth: 0,
        truncated: false,
    }
}

fn find_value<'a>(attributes: &'a [AttributeEntry], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|a| a.name.eq_ignore_ascii_case(name) && !a.value.trim().is_empty())
        .map(|a| a.value.trim())
}

/// Positive integer quantity; anything else counts as 1
pub fn parse_quantity(value: &str) -> u32 {
    let value = value.trim();
    if let Ok(n) = value.parse::<u32>() {
        return n.max(1);
    }
    match value.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 && f >= 1.0 && f <= u32::MAX as f64 => f as u32,
        _ => 1,
    }
}

/// Root entries in document order, after the root policy is applied
fn find_roots(index: &RawIndex, options: &BuildOptions) -> std::result::Result<Vec<Entry>, StructureError> {
    let candidates = match &options.view {
        Some(view) => {
            let el = index
                .resolve(view)
                .filter(|el| el.kind.is_view())
                .ok_or_else(|| StructureError::UnknownView(view.clone()))?;
            view_roots(index, el)
        }
        None => {
            let declared = index
                .elements()
                .filter(|(_, el)| el.kind.is_view())
                .map(|(_, el)| view_roots(index, el))
                .find(|roots| !roots.is_empty());
            match declared {
                Some(roots) => roots,
                None => inferred_roots(index),
            }
        }
    };

    match (options.root_policy, candidates.len()) {
        (_, 0) => Err(StructureError::NoRootFound),
        (RootPolicy::Single, n) if n > 1 => Err(StructureError::AmbiguousRoot {
            candidates: candidates.iter().map(|e| entry_label(index, *e)).collect(),
        }),
        (RootPolicy::First, n) if n > 1 => {
            log::info!(
                "{} root candidates, keeping '{}'",
                n,
                entry_label(index, candidates[0])
            );
            Ok(candidates.into_iter().take(1).collect())
        }
        _ => Ok(candidates),
    }
}

/// `rootRefs`, else `primaryOccurrenceRef`
fn view_roots(index: &RawIndex, view: &RawElement) -> Vec<Entry> {
    let mut refs = index.references(view, "rootRefs");
    if refs.is_empty() {
        refs = index.references(view, "primaryOccurrenceRef");
    }
    refs.into_iter()
        .map(|sym| match index.lookup_symbol(sym) {
            Some(id) if index.element(id).kind.is_usage() => Entry::Usage(id),
            Some(id) => Entry::Item(id),
            None => Entry::Dangling(sym),
        })
        .collect()
}

/// Usages and parts that nothing refers to as a child or as a target
fn inferred_roots(index: &RawIndex) -> Vec<Entry> {
    let mut referenced: HashSet<Symbol> = HashSet::new();
    for (_, el) in index.elements() {
        for attribute in ["occurrenceRefs", "instanceRefs", "instancedRef", "partRef"] {
            referenced.extend(index.references(el, attribute));
        }
    }

    index
        .elements()
        .filter(|(_, el)| {
            matches!(
                el.kind,
                ElementKind::Occurrence | ElementKind::Instance | ElementKind::Part
            )
        })
        .filter(|(_, el)| el.id.is_none_or(|id| !referenced.contains(&id)))
        .map(|(id, el)| match el.kind {
            ElementKind::Part => Entry::Item(id),
            _ => Entry::Usage(id),
        })
        .collect()
}

fn entry_label(index: &RawIndex, entry: Entry) -> String {
    match entry {
        Entry::Usage(id) | Entry::Item(id) => index.label(index.element(id)).to_string(),
        Entry::Dangling(sym) => index.text(sym).to_string(),
    }
}
