//! A conversational agent built on a pair of variable-order Markov tries,
//! in the lineage of the MegaHAL algorithm: [`Engine::learn`] walks a line
//! of text into both a forward and a backward n-gram trie, and
//! [`Engine::reply`] babbles a keyword-biased reply back out, scoring
//! candidates by how "surprising" they are relative to the trained model.
//!
//! The four host-facing operations are [`Engine::learn`], [`Engine::reply`],
//! [`Engine::greet`], and [`Engine::converse`]. Everything the engine needs
//! beyond raw text — the Markov order, and the banned/aux/swap/greeting word
//! lists — arrives as an in-memory [`WordLists`]; *locating* those lists on
//! disk, a CLI, and a network front end are all left to the host.
//!
//! ```
//! use haltrie_core::{Engine, WordLists};
//!
//! let mut engine = Engine::new(WordLists::new());
//! engine.learn("THE QUICK BROWN FOX JUMPS OVER THE LAZY DOG.").unwrap();
//! let reply = engine.reply("fox", 5);
//! assert!(!reply.is_empty());
//! ```

pub mod config;
pub mod error;
pub mod keywords;
pub mod learner;
pub mod model;
pub mod persist;
pub mod reply;
pub mod symbol;
pub mod token;
pub mod trie;

pub use config::WordLists;
pub use error::EngineError;
pub use learner::LearnSummary;
pub use model::Model;

use rand::Rng;

/// The facade a host embeds: a trained [`Model`] plus the [`WordLists`] it
/// was configured with, wired into `learn`/`reply`/`greet`/`converse`.
pub struct Engine {
    model: Model,
    lists: WordLists,
}

impl Engine {
    /// Construct a fresh engine with empty trees, at `lists.order()`.
    pub fn new(lists: WordLists) -> Self {
        Engine {
            model: Model::new(lists.order()),
            lists,
        }
    }

    /// Assemble an engine from an already-trained model and a (possibly
    /// different) set of word lists — used when restoring a model via
    /// [`persist::load_from`], where the host supplies its own lists rather
    /// than persisting them alongside the trie.
    pub fn from_model(model: Model, lists: WordLists) -> Self {
        Engine { model, lists }
    }

    /// Split `text` on newlines, skip blank and `#`-prefixed lines, and
    /// learn each surviving line into both tries. Fails only if interning a
    /// word exhausts the 16-bit symbol space; lines already learned before
    /// that point remain learned (the trie's growth is append-only, so
    /// there is nothing to roll back).
    pub fn learn(&mut self, text: &str) -> Result<LearnSummary, EngineError> {
        learner::learn_text(&mut self.model, text)
    }

    /// Run one conversational turn without learning: tokenize, extract
    /// keywords, generate `num_candidates` keyword-biased candidates plus an
    /// unbiased baseline, and return the best-scoring non-echo survivor.
    pub fn reply(&self, text: &str, num_candidates: usize) -> String {
        reply::reply(&self.model, &self.lists, text, num_candidates)
    }

    /// Pick a random word from the greeting list and reply to it, as if it
    /// had been typed by the other party. Falls back to the canned string
    /// (same as an unanswerable [`Engine::reply`]) when the greeting list is
    /// empty, since there is nothing to seed a greeting with.
    pub fn greet(&self, num_candidates: usize) -> String {
        let greeting = self.lists.greeting();
        if greeting.is_empty() {
            return reply::FALLBACK.to_string();
        }
        let word = &greeting[rand::thread_rng().gen_range(0..greeting.len())];
        self.reply(&String::from_utf8_lossy(word), num_candidates)
    }

    /// Learn from `text`, then reply to it.
    pub fn converse(&mut self, text: &str, num_candidates: usize) -> Result<String, EngineError> {
        self.learn(text)?;
        Ok(self.reply(text, num_candidates))
    }

    /// The trained model backing this engine.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The word lists this engine was configured with.
    pub fn word_lists(&self) -> &WordLists {
        &self.lists
    }
}
