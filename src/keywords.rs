//! Keyword extraction: candidate generation via swap rewriting, banned-word
//! rejection, and the primary/auxiliary split that drives babble's
//! `used_key` gate.

use crate::config::WordLists;
use crate::model::Model;
use crate::symbol::SymbolId;

/// The keyword sets a candidate reply is generated and scored against.
#[derive(Debug, Clone, Default)]
pub struct Keywords {
    /// Insertion-ordered, duplicate-free primary keywords.
    pub primary: Vec<SymbolId>,
    /// Insertion-ordered, duplicate-free auxiliary (weak) keywords.
    pub aux: Vec<SymbolId>,
}

impl Keywords {
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.aux.is_empty()
    }

    pub fn contains(&self, sym: SymbolId) -> bool {
        self.primary.contains(&sym) || self.aux.contains(&sym)
    }

    pub fn is_aux(&self, sym: SymbolId) -> bool {
        self.aux.contains(&sym)
    }

    /// All keywords, primary first, in generation order — used by seed
    /// selection's circular scan.
    pub fn all(&self) -> Vec<SymbolId> {
        let mut v = self.primary.clone();
        v.extend(self.aux.iter().copied());
        v
    }
}

/// Extract keywords from already-tokenized input.
///
/// For each token, the candidate word set is either its swap targets (if
/// any `from == token` rule matches) or the token itself. Each candidate is
/// rejected if unknown to the model, if its first byte is non-alphanumeric,
/// or if it is banned. Surviving candidates not in the aux list become
/// primary keywords; aux-listed candidates are only added once at least one
/// primary keyword has been found.
pub fn extract(model: &Model, lists: &WordLists, tokens: &[Vec<u8>]) -> Keywords {
    let mut primary = Vec::new();
    let mut aux = Vec::new();

    for token in tokens {
        for candidate in candidates_for(lists, token) {
            if candidate.is_empty() || !candidate[0].is_ascii_alphanumeric() {
                continue;
            }
            if lists.is_banned(candidate) {
                continue;
            }
            let Some(sym) = model.symbols().lookup(candidate) else {
                continue;
            };
            if lists.is_aux(candidate) {
                if !aux.contains(&sym) {
                    aux.push(sym);
                }
            } else if !primary.contains(&sym) {
                primary.push(sym);
            }
        }
    }

    let aux = if primary.is_empty() { Vec::new() } else { aux };
    Keywords { primary, aux }
}

fn candidates_for<'a>(lists: &'a WordLists, token: &'a [u8]) -> Vec<&'a [u8]> {
    match lists.swap_targets(token) {
        Some(targets) => targets.iter().map(|t| t.as_slice()).collect(),
        None => vec![token],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learner::learn_text;
    use crate::token::tokenize;

    fn trained_model() -> Model {
        let mut model = Model::new(2);
        learn_text(&mut model, "THE QUICK BROWN FOX JUMPS OVER THE LAZY DOG.").unwrap();
        model
    }

    #[test]
    fn unknown_words_are_rejected() {
        let model = trained_model();
        let lists = WordLists::new();
        let tokens = tokenize("giraffe");
        let kw = extract(&model, &lists, &tokens);
        assert!(kw.is_empty());
    }

    #[test]
    fn known_word_becomes_primary_keyword() {
        let model = trained_model();
        let lists = WordLists::new();
        let tokens = tokenize("fox");
        let kw = extract(&model, &lists, &tokens);
        let fox = model.symbols().lookup(b"FOX").unwrap();
        assert_eq!(kw.primary, vec![fox]);
        assert!(kw.aux.is_empty());
    }

    #[test]
    fn banned_words_are_rejected() {
        let model = trained_model();
        let lists = WordLists::new().with_banned(["fox"]);
        let tokens = tokenize("fox");
        let kw = extract(&model, &lists, &tokens);
        assert!(kw.is_empty());
    }

    #[test]
    fn non_alphanumeric_leading_byte_is_rejected() {
        let model = trained_model();
        let lists = WordLists::new();
        // The separator token " " (space) should never become a keyword.
        let tokens = tokenize("fox");
        for tok in &tokens {
            if tok == b" " {
                let kw = extract(&model, &lists, std::slice::from_ref(tok));
                assert!(kw.is_empty());
            }
        }
    }

    #[test]
    fn aux_words_are_dropped_without_a_primary() {
        let model = trained_model();
        let lists = WordLists::new().with_aux(["the"]);
        let tokens = tokenize("the");
        let kw = extract(&model, &lists, &tokens);
        assert!(kw.primary.is_empty());
        assert!(kw.aux.is_empty(), "aux-only input should not surface aux keywords");
    }

    #[test]
    fn aux_words_are_kept_alongside_a_primary() {
        let model = trained_model();
        let lists = WordLists::new().with_aux(["the"]);
        let tokens = tokenize("the fox");
        let kw = extract(&model, &lists, &tokens);
        assert!(!kw.primary.is_empty());
        assert!(!kw.aux.is_empty());
    }

    #[test]
    fn swap_rewrites_candidate_before_lookup() {
        let mut model = Model::new(2);
        learn_text(&mut model, "YOU ARE A QUICK FOX INDEED TODAY.").unwrap();
        let lists = WordLists::new().with_swap([("I", "YOU")]);
        let tokens = tokenize("i");
        let kw = extract(&model, &lists, &tokens);
        let you = model.symbols().lookup(b"YOU").unwrap();
        assert_eq!(kw.primary, vec![you]);
    }

    #[test]
    fn duplicate_candidates_collapse() {
        let model = trained_model();
        let lists = WordLists::new();
        let tokens = tokenize("the fox the");
        let kw = extract(&model, &lists, &tokens);
        let the = model.symbols().lookup(b"THE").unwrap();
        assert_eq!(kw.primary.iter().filter(|&&s| s == the).count(), 1);
    }
}
