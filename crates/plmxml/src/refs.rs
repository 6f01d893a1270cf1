use std::collections::HashMap;

use crate::types::{ElementId, RawElement};
use crate::{RawIndex, Symbol};

/// Reference resolver used for the duration of one build pass
///
/// Every reference-following path in the crate goes through here, so a
/// reference symbol is looked up in the identifier table at most once per
/// pass. Resolution is by exact identifier only and never fails: a dangling
/// reference is simply `None`.
pub struct Resolver<'a> {
    index: &'a RawIndex,
    memo: HashMap<Symbol, Option<ElementId>>,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a RawIndex) -> Self {
        Self {
            index,
            memo: HashMap::new(),
        }
    }

    pub fn index(&self) -> &'a RawIndex {
        self.index
    }

    /// Resolve an interned reference target
    pub fn resolve_id(&mut self, target: Symbol) -> Option<ElementId> {
        let index = self.index;
        *self
            .memo
            .entry(target)
            .or_insert_with(|| index.lookup_symbol(target))
    }

    pub fn resolve(&mut self, target: Symbol) -> Option<&'a RawElement> {
        let index = self.index;
        self.resolve_id(target).map(|id| index.element(id))
    }

    /// Resolve the first target of a reference attribute
    pub fn follow(&mut self, el: &RawElement, attribute: &str) -> Option<(ElementId, &'a RawElement)> {
        let index = self.index;
        let target = index.first_reference(el, attribute)?;
        let id = self.resolve_id(target)?;
        Some((id, index.element(id)))
    }

    /// Number of distinct reference targets looked up so far
    pub fn memoized(&self) -> usize {
        self.memo.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memoizes_and_tolerates_dangling() {
        let index = RawIndex::parse(
            r##"<PLMXML>
  <Occurrence id="o1" instancedRef="#r1"/>
  <Occurrence id="o2" instancedRef="#r1"/>
  <Occurrence id="o3" instancedRef="#gone"/>
  <ProductRevision id="r1"/>
</PLMXML>"##,
        )
        .unwrap();
        let mut resolver = Resolver::new(&index);

        for id in ["o1", "o2"] {
            let occ = index.resolve(id).unwrap();
            let (_, rev) = resolver.follow(occ, "instancedRef").unwrap();
            assert_eq!(index.id_str(rev), Some("r1"));
        }
        assert_eq!(resolver.memoized(), 1);

        let dangling = index.resolve("o3").unwrap();
        assert!(resolver.follow(dangling, "instancedRef").is_none());
        assert_eq!(resolver.memoized(), 2);
    }
}
