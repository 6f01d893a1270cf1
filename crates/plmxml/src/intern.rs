// String interner for PLMXML parsing
// Identifiers, tag names and attribute names repeat heavily across a
// product structure export (every Occurrence carries `instancedRef`,
// every UserValue carries `title`), so they are stored once and handed
// around as 4-byte symbols.

use std::collections::HashMap;
use std::sync::Arc;

use crate::ParseError;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

#[derive(Debug, Clone)]
pub struct Interner {
    map: HashMap<Arc<str>, Symbol>,
    strings: Vec<Arc<str>>,
}

impl Default for Interner {
    fn default() -> Self {
        Self::with_capacity(1024)
    }
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            map: HashMap::with_capacity(cap),
            strings: Vec::with_capacity(cap),
        }
    }

    /// Fails once every `u32` symbol is taken
    pub fn intern(&mut self, s: &str) -> Result<Symbol, ParseError> {
        if let Some(&sym) = self.map.get(s) {
            return Ok(sym);
        }

        let sym = u32::try_from(self.strings.len())
            .map(Symbol)
            .map_err(|_| ParseError::TooLarge("distinct strings"))?;
        let shared: Arc<str> = Arc::from(s);
        self.map.insert(Arc::clone(&shared), sym);
        self.strings.push(shared);
        Ok(sym)
    }

    /// Look up a string without interning it
    pub fn get(&self, s: &str) -> Option<Symbol> {
        self.map.get(s).copied()
    }

    pub fn resolve(&self, sym: Symbol) -> &str {
        self.strings
            .get(sym.0 as usize)
            .map(|s| &**s)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_interning() {
        let mut interner = Interner::new();
        let x1 = interner.intern("Occurrence").unwrap();
        let x2 = interner.intern("Occurrence").unwrap();
        assert_eq!(x1, x2);
        assert_eq!(interner.resolve(x1), "Occurrence");
    }

    #[test]
    fn different_strings() {
        let mut interner = Interner::new();
        let occ = interner.intern("Occurrence").unwrap();
        let rev = interner.intern("ProductRevision").unwrap();
        assert_ne!(occ, rev);
        assert_eq!(interner.resolve(occ), "Occurrence");
        assert_eq!(interner.resolve(rev), "ProductRevision");
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn get_does_not_intern() {
        let mut interner = Interner::new();
        interner.intern("id1").unwrap();
        assert!(interner.get("id1").is_some());
        assert!(interner.get("id2").is_none());
        assert_eq!(interner.len(), 1);
    }
}
