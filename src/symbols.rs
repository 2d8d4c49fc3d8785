//! Interned predicate and constant symbols.
//!
//! All symbol names live in a [`SymbolStore`] backed by a `lasso` interner;
//! the rest of the crate only handles the small `Copy` handles
//! [`Predicate`] and [`Constant`]. Handles from different stores must not be
//! mixed; the store does not check for this.

use lasso::{Rodeo, Spur};
use rustc_hash::FxHashMap;
use std::fmt;

/// An uninterpreted predicate symbol with a fixed arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Predicate {
    id: u32,
    arity: u32,
}

impl Predicate {
    /// Number of arguments the predicate takes.
    #[must_use]
    pub const fn arity(self) -> usize {
        self.arity as usize
    }

    /// Numeric identity within the originating [`SymbolStore`].
    #[must_use]
    pub const fn index(self) -> usize {
        self.id as usize
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}/{}", self.id, self.arity)
    }
}

/// A free constant symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Constant {
    id: u32,
}

impl Constant {
    /// Numeric identity within the originating [`SymbolStore`].
    #[must_use]
    pub const fn index(self) -> usize {
        self.id as usize
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.id)
    }
}

/// Interner for predicate and constant names.
#[derive(Debug)]
pub struct SymbolStore {
    names: Rodeo,
    predicates: Vec<Spur>,
    constants: Vec<Spur>,
    predicate_index: FxHashMap<(Spur, u32), u32>,
    constant_index: FxHashMap<Spur, u32>,
}

impl SymbolStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            names: Rodeo::default(),
            predicates: Vec::new(),
            constants: Vec::new(),
            predicate_index: FxHashMap::default(),
            constant_index: FxHashMap::default(),
        }
    }

    /// Intern a predicate symbol. Repeated calls with the same name and
    /// arity return the same handle; the same name with a different arity is
    /// a distinct predicate.
    pub fn predicate(&mut self, name: &str, arity: usize) -> Predicate {
        let spur = self.names.get_or_intern(name);
        let arity = arity as u32;
        let id = *self
            .predicate_index
            .entry((spur, arity))
            .or_insert_with(|| {
                let id = self.predicates.len() as u32;
                self.predicates.push(spur);
                id
            });
        Predicate { id, arity }
    }

    /// Intern a constant symbol.
    pub fn constant(&mut self, name: &str) -> Constant {
        let spur = self.names.get_or_intern(name);
        let id = *self.constant_index.entry(spur).or_insert_with(|| {
            let id = self.constants.len() as u32;
            self.constants.push(spur);
            id
        });
        Constant { id }
    }

    /// Resolve a predicate handle back to its name.
    #[must_use]
    pub fn predicate_name(&self, pred: Predicate) -> &str {
        self.names.resolve(&self.predicates[pred.index()])
    }

    /// Resolve a constant handle back to its name.
    #[must_use]
    pub fn constant_name(&self, constant: Constant) -> &str {
        self.names.resolve(&self.constants[constant.index()])
    }

    /// All constants interned so far, in creation order.
    pub fn constants(&self) -> impl Iterator<Item = Constant> + '_ {
        (0..self.constants.len() as u32).map(|id| Constant { id })
    }
}

impl Default for SymbolStore {
    fn default() -> Self {
        Self::new()
    }
}
