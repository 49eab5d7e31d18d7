//! Host-supplied configuration: model order and the banned/aux/swap/greeting
//! word lists.
//!
//! Everything here is plain, serializable, in-memory data. *Loading* these
//! lists from a particular file format or location is a host concern and
//! stays out of this crate — see the crate-level non-goals.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// The default Markov order used when a host does not specify one.
pub const DEFAULT_ORDER: u8 = 5;

/// Bundles everything [`crate::Engine::new`] needs beyond the model itself.
///
/// All word lists are plain uppercased byte-strings, matching the
/// tokenizer's output alphabet. Construct from any iterator the host
/// already has in memory; every list defaults to empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordLists {
    order: u8,
    banned: HashSet<Vec<u8>>,
    aux: HashSet<Vec<u8>>,
    swap: HashMap<Vec<u8>, Vec<Vec<u8>>>,
    greeting: Vec<Vec<u8>>,
}

impl WordLists {
    /// Start from the default order (5) and empty lists.
    pub fn new() -> Self {
        WordLists {
            order: DEFAULT_ORDER,
            banned: HashSet::new(),
            aux: HashSet::new(),
            swap: HashMap::new(),
            greeting: Vec::new(),
        }
    }

    /// Override the Markov order (the `order + 1`-deep context window).
    pub fn with_order(mut self, order: u8) -> Self {
        self.order = order;
        self
    }

    /// Populate the banned-word list from uppercased words.
    pub fn with_banned<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.banned = words
            .into_iter()
            .map(|w| w.as_ref().to_ascii_uppercase().into_bytes())
            .collect();
        self
    }

    /// Populate the auxiliary (weak) keyword list.
    pub fn with_aux<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.aux = words
            .into_iter()
            .map(|w| w.as_ref().to_ascii_uppercase().into_bytes())
            .collect();
        self
    }

    /// Populate swap pairs (`from -> [to, ...]`), e.g. `I -> YOU`.
    pub fn with_swap<I, S>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let mut swap: HashMap<Vec<u8>, Vec<Vec<u8>>> = HashMap::new();
        for (from, to) in pairs {
            let from = from.as_ref().to_ascii_uppercase().into_bytes();
            let to = to.as_ref().to_ascii_uppercase().into_bytes();
            swap.entry(from).or_default().push(to);
        }
        self.swap = swap;
        self
    }

    /// Populate the greeting word list used by [`crate::Engine::greet`].
    pub fn with_greeting<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.greeting = words
            .into_iter()
            .map(|w| w.as_ref().to_ascii_uppercase().into_bytes())
            .collect();
        self
    }

    pub fn order(&self) -> u8 {
        self.order
    }

    pub fn is_banned(&self, word: &[u8]) -> bool {
        self.banned.contains(word)
    }

    pub fn is_aux(&self, word: &[u8]) -> bool {
        self.aux.contains(word)
    }

    /// Swap targets for `word`, if any rewrite rule matches.
    pub fn swap_targets(&self, word: &[u8]) -> Option<&[Vec<u8>]> {
        self.swap.get(word).map(|v| v.as_slice())
    }

    pub fn greeting(&self) -> &[Vec<u8>] {
        &self.greeting
    }
}

impl Default for WordLists {
    /// Agrees with [`WordLists::new`] — in particular `order` defaults to
    /// [`DEFAULT_ORDER`], not `0`, which a derived `Default` would give.
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_order_is_five() {
        assert_eq!(WordLists::new().order(), DEFAULT_ORDER);
    }

    #[test]
    fn derived_default_agrees_with_new() {
        // `WordLists::default()` must not silently regress to order 0 —
        // it has to match `new()`'s order-5 default.
        assert_eq!(WordLists::default().order(), WordLists::new().order());
        assert_eq!(WordLists::default().order(), DEFAULT_ORDER);
    }

    #[test]
    fn with_order_overrides_default() {
        assert_eq!(WordLists::new().with_order(3).order(), 3);
    }

    #[test]
    fn banned_words_are_uppercased() {
        let lists = WordLists::new().with_banned(["the", "a"]);
        assert!(lists.is_banned(b"THE"));
        assert!(!lists.is_banned(b"the"));
    }

    #[test]
    fn aux_words_are_uppercased() {
        let lists = WordLists::new().with_aux(["it", "he"]);
        assert!(lists.is_aux(b"IT"));
        assert!(lists.is_aux(b"HE"));
        assert!(!lists.is_aux(b"FOX"));
    }

    #[test]
    fn swap_pairs_support_multiple_targets() {
        let lists = WordLists::new().with_swap([("I", "YOU"), ("I", "U")]);
        let targets = lists.swap_targets(b"I").unwrap();
        assert_eq!(targets, &[b"YOU".to_vec(), b"U".to_vec()]);
        assert!(lists.swap_targets(b"YOU").is_none());
    }

    #[test]
    fn greeting_list_round_trips() {
        let lists = WordLists::new().with_greeting(["hello", "hi"]);
        assert_eq!(lists.greeting(), &[b"HELLO".to_vec(), b"HI".to_vec()]);
    }

    #[test]
    fn serde_roundtrip() {
        let lists = WordLists::new()
            .with_order(4)
            .with_banned(["the"])
            .with_greeting(["hi"]);
        let json = serde_json::to_string(&lists).unwrap();
        let back: WordLists = serde_json::from_str(&json).unwrap();
        assert_eq!(back.order(), 4);
        assert!(back.is_banned(b"THE"));
        assert_eq!(back.greeting(), &[b"HI".to_vec()]);
    }
}
