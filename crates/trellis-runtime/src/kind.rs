//! Value kinds and the kind table
//!
//! Kinds stand in for open-ended runtime type introspection: every value
//! kind that owns callables (or that a callable returns) is declared up
//! front in a [`KindTable`], optionally with a parent kind. Compatibility
//! checks walk the parent chain, so polymorphic substitution stays an
//! explicit, exhaustive lookup.

/// Identifier of a declared value kind. An index into the owning
/// [`KindTable`]; cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KindId(u32);

#[derive(Debug, Clone)]
struct KindInfo {
    name: String,
    parent: Option<KindId>,
}

/// Interned table of value kinds with optional parent links.
#[derive(Debug, Clone, Default)]
pub struct KindTable {
    kinds: Vec<KindInfo>,
}

impl KindTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a new kind. Declaration order is significant: it fixes the
    /// deterministic traversal order used everywhere else.
    pub fn declare(&mut self, name: impl Into<String>, parent: Option<KindId>) -> KindId {
        if let Some(parent) = parent {
            assert!(
                (parent.0 as usize) < self.kinds.len(),
                "parent kind must be declared first"
            );
        }
        let id = KindId(self.kinds.len() as u32);
        self.kinds.push(KindInfo {
            name: name.into(),
            parent,
        });
        id
    }

    pub fn name(&self, id: KindId) -> &str {
        &self.kinds[id.0 as usize].name
    }

    pub fn parent(&self, id: KindId) -> Option<KindId> {
        self.kinds[id.0 as usize].parent
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Iterate all declared kind ids in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = KindId> + '_ {
        (0..self.kinds.len()).map(|i| KindId(i as u32))
    }

    /// True if `actual` is `expected` or a descendant of it.
    pub fn is_instance_of(&self, actual: KindId, expected: KindId) -> bool {
        let mut current = Some(actual);
        while let Some(kind) = current {
            if kind == expected {
                return true;
            }
            current = self.parent(kind);
        }
        false
    }
}
