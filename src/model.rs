//! The trained model: a symbol table plus the dual trie, at a fixed order.

use serde::{Deserialize, Serialize};

use crate::symbol::SymbolTable;
use crate::trie::Trie;

/// Everything that persists across `learn` calls: the vocabulary and both
/// n-gram trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub(crate) symbols: SymbolTable,
    pub(crate) trie: Trie,
    order: u8,
}

impl Model {
    pub fn new(order: u8) -> Self {
        Model {
            symbols: SymbolTable::new(),
            trie: Trie::new(),
            order,
        }
    }

    /// Assemble a model from already-built parts — used when restoring a
    /// persisted model, where the trie and symbol table are decoded
    /// directly rather than grown through `learn`.
    pub(crate) fn from_parts(symbols: SymbolTable, trie: Trie, order: u8) -> Self {
        Model { symbols, trie, order }
    }

    pub fn order(&self) -> u8 {
        self.order
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn trie(&self) -> &Trie {
        &self.trie
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_model_has_empty_trees_and_reserved_symbols() {
        let model = Model::new(5);
        assert_eq!(model.order(), 5);
        assert_eq!(model.symbols().len(), 2);
        assert_eq!(model.trie().node(model.trie().forward_root()).branch(), 0);
    }
}
