//! Symbol table — interns byte-strings to stable 16-bit IDs.
//!
//! Two views of one dataset, kept in lockstep: `words` is the insertion-order
//! vector that gives `SymbolId -> bytes` in O(1), and `by_word` is the
//! `BTreeMap` that gives `bytes -> SymbolId` in `O(log n)`. IDs 0 and 1 are
//! reserved for `<ERROR>` and `<FIN>` and exist before any caller interns
//! anything.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A 16-bit symbol identifier. IDs `0` and `1` are reserved (see
/// [`ERROR_SYMBOL`], [`FIN_SYMBOL`]); callers receive `2` and up.
pub type SymbolId = u16;

/// Reserved ID for `<ERROR>`: returned by lookups for unknown words and
/// treated as a stop symbol by generation. Never emitted as user-visible
/// output.
pub const ERROR_SYMBOL: SymbolId = 0;

/// Reserved ID for `<FIN>`: the sentence-termination sentinel appended
/// during learning and recognized as a stop by generation.
pub const FIN_SYMBOL: SymbolId = 1;

/// Maximum length, in bytes, of an interned word.
pub const MAX_WORD_LEN: usize = 255;

const MAX_SYMBOLS: usize = u16::MAX as usize + 1;

/// Bidirectional byte-string <-> [`SymbolId`] mapping.
///
/// All words are expected to already be uppercased by the caller (the
/// tokenizer guarantees this on the learn/reply paths); the table itself is
/// case-sensitive and does no normalization, keeping it a pure storage
/// primitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolTable {
    words: Vec<Box<[u8]>>,
    by_word: BTreeMap<Box<[u8]>, SymbolId>,
}

impl SymbolTable {
    /// Construct a table with the two reserved symbols already present.
    pub fn new() -> Self {
        let mut table = Self {
            words: Vec::new(),
            by_word: BTreeMap::new(),
        };
        table.insert_reserved(b"<ERROR>");
        table.insert_reserved(b"<FIN>");
        table
    }

    fn insert_reserved(&mut self, word: &[u8]) {
        let id = self.words.len() as SymbolId;
        self.words.push(word.into());
        self.by_word.insert(word.into(), id);
    }

    /// Return the existing ID for `word`, or assign and return the next one.
    ///
    /// Fails with [`EngineError::SymbolSpaceExhausted`] if `word` is longer
    /// than [`MAX_WORD_LEN`] bytes or the `2^16` ID space is full.
    pub fn intern(&mut self, word: &[u8]) -> Result<SymbolId, EngineError> {
        if let Some(&id) = self.by_word.get(word) {
            return Ok(id);
        }
        if word.len() > MAX_WORD_LEN || self.words.len() >= MAX_SYMBOLS {
            return Err(EngineError::SymbolSpaceExhausted {
                word: word.to_vec(),
            });
        }
        let id = self.words.len() as SymbolId;
        self.words.push(word.into());
        self.by_word.insert(word.into(), id);
        Ok(id)
    }

    /// Look up `word`'s ID without interning it.
    pub fn lookup(&self, word: &[u8]) -> Option<SymbolId> {
        self.by_word.get(word).copied()
    }

    /// Return the bytes a symbol was interned from.
    ///
    /// Returns the `<ERROR>` bytes for an ID outside the table — this
    /// mirrors the reserved symbol's role as the universal "not found"
    /// sentinel rather than panicking on a stale or out-of-range ID.
    pub fn word_of(&self, id: SymbolId) -> &[u8] {
        self.words
            .get(id as usize)
            .map(|w| w.as_ref())
            .unwrap_or(b"<ERROR>")
    }

    /// Number of interned symbols, including the two reserved ones.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// `true` if only the reserved symbols have been interned.
    pub fn is_empty(&self) -> bool {
        self.words.len() <= 2
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_symbols_exist_from_construction() {
        let table = SymbolTable::new();
        assert_eq!(table.word_of(ERROR_SYMBOL), b"<ERROR>");
        assert_eq!(table.word_of(FIN_SYMBOL), b"<FIN>");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn intern_assigns_next_id_starting_at_two() {
        let mut table = SymbolTable::new();
        let fox = table.intern(b"FOX").unwrap();
        let dog = table.intern(b"DOG").unwrap();
        assert_eq!(fox, 2);
        assert_eq!(dog, 3);
    }

    #[test]
    fn intern_is_idempotent() {
        let mut table = SymbolTable::new();
        let a = table.intern(b"FOX").unwrap();
        let b = table.intern(b"FOX").unwrap();
        assert_eq!(a, b);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn lookup_matches_intern() {
        let mut table = SymbolTable::new();
        let id = table.intern(b"JUMPS").unwrap();
        assert_eq!(table.lookup(b"JUMPS"), Some(id));
        assert_eq!(table.lookup(b"NEVER SEEN"), None);
    }

    #[test]
    fn word_of_round_trips() {
        let mut table = SymbolTable::new();
        let id = table.intern(b"BROWN").unwrap();
        assert_eq!(table.word_of(id), b"BROWN");
    }

    #[test]
    fn word_of_out_of_range_falls_back_to_error() {
        let table = SymbolTable::new();
        assert_eq!(table.word_of(9999), b"<ERROR>");
    }

    #[test]
    fn intern_rejects_words_over_max_len() {
        let mut table = SymbolTable::new();
        let long = vec![b'A'; MAX_WORD_LEN + 1];
        let err = table.intern(&long).unwrap_err();
        assert!(matches!(err, EngineError::SymbolSpaceExhausted { .. }));
    }

    #[test]
    fn is_empty_true_for_fresh_table() {
        let table = SymbolTable::new();
        assert!(table.is_empty());
    }

    #[test]
    fn is_empty_false_after_intern() {
        let mut table = SymbolTable::new();
        table.intern(b"X").unwrap();
        assert!(!table.is_empty());
    }

    #[test]
    fn serde_roundtrip_preserves_ids() {
        let mut table = SymbolTable::new();
        let fox = table.intern(b"FOX").unwrap();
        let json = serde_json::to_string(&table).unwrap();
        let back: SymbolTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back.lookup(b"FOX"), Some(fox));
        assert_eq!(back.len(), table.len());
    }
}
