//! Learner — extends both trees along one tokenized line, in both
//! directions, to depth `order + 1`.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::model::Model;
use crate::symbol::FIN_SYMBOL;
use crate::token::tokenize;
use crate::trie::Context;

/// Aggregate result of a [`crate::Engine::learn`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnSummary {
    pub tokens_learned: usize,
    pub lines_learned: usize,
    pub lines_processed: usize,
}

/// Learn one already-tokenized line. Returns `Ok(false)` (not an error) if
/// the line is too short (`tokens.len() <= order`) to seed a meaningful
/// path. The length guard runs before any interning, so short lines never
/// grow the symbol table either.
pub fn learn_line(model: &mut Model, tokens: &[Vec<u8>]) -> Result<bool, EngineError> {
    let order = model.order() as usize;
    if tokens.len() <= order {
        return Ok(false);
    }

    let mut symbols = Vec::with_capacity(tokens.len());
    for tok in tokens {
        symbols.push(model.symbols.intern(tok)?);
    }

    // Forward pass: tokens in input order, then a trailing <FIN>.
    let mut ctx = Context::new(order, model.trie.forward_root());
    for &sym in &symbols {
        ctx.observe(&mut model.trie, sym);
    }
    ctx.observe(&mut model.trie, FIN_SYMBOL);

    // Backward pass: tokens in reverse order, then a trailing <FIN>.
    let mut ctx = Context::new(order, model.trie.backward_root());
    for &sym in symbols.iter().rev() {
        ctx.observe(&mut model.trie, sym);
    }
    ctx.observe(&mut model.trie, FIN_SYMBOL);

    Ok(true)
}

/// Learn every surviving line of `text`: split on `\n`, skip blank and
/// `#`-prefixed lines (counted in `lines_processed` but not
/// `lines_learned`), tokenize and learn the rest independently.
pub fn learn_text(model: &mut Model, text: &str) -> Result<LearnSummary, EngineError> {
    let mut summary = LearnSummary::default();

    for line in text.split('\n') {
        let trimmed = line.trim();
        summary.lines_processed += 1;
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let tokens = tokenize(line);
        if learn_line(model, &tokens)? {
            summary.lines_learned += 1;
            summary.tokens_learned += tokens.len();
        }
    }

    Ok(summary)
}
