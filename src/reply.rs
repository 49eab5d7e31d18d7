//! Reply engine: seed selection, keyword-biased babble in both directions,
//! surprise scoring, candidate ranking, and output formatting.

use rand::Rng;

use crate::config::WordLists;
use crate::keywords::{extract, Keywords};
use crate::model::Model;
use crate::symbol::{SymbolId, ERROR_SYMBOL, FIN_SYMBOL};
use crate::token::tokenize;
use crate::trie::{Context, NodeId, Trie};

/// Safety cap on babble steps per direction, replacing the source's wall
/// clock with a deterministic bound.
const BABBLE_STEP_CAP: usize = 200;

/// Returned when every candidate echoes the input.
pub const FALLBACK: &str = "I don't know enough to answer you yet!";

#[derive(Clone)]
struct Candidate {
    symbols: Vec<SymbolId>,
    score: f64,
}

/// Run one conversational turn: tokenize, extract keywords, generate
/// `num_candidates` keyword-biased candidates plus one unbiased baseline,
/// and format the best non-echo survivor.
pub fn reply(model: &Model, lists: &WordLists, text: &str, num_candidates: usize) -> String {
    let mut rng = rand::thread_rng();
    reply_with_rng(model, lists, text, num_candidates, &mut rng)
}

/// Like [`reply`], but takes an explicit RNG — used by tests that need
/// deterministic sequences.
pub fn reply_with_rng<R: Rng>(
    model: &Model,
    lists: &WordLists,
    text: &str,
    num_candidates: usize,
    rng: &mut R,
) -> String {
    let tokens = tokenize(text);
    let input_symbols = encode(model, &tokens);
    let keywords = extract(model, lists, &tokens);

    let mut candidates = Vec::with_capacity(num_candidates + 1);

    let baseline = generate_reply(model, &Keywords::default(), rng);
    candidates.push(Candidate {
        symbols: baseline,
        score: 0.0,
    });

    for _ in 0..num_candidates {
        let symbols = generate_reply(model, &keywords, rng);
        let score = evaluate(model, &keywords, &symbols);
        candidates.push(Candidate { symbols, score });
    }

    match select_best(&candidates, &input_symbols) {
        Some(best) => format_reply(model, &best.symbols),
        None => FALLBACK.to_string(),
    }
}

fn encode(model: &Model, tokens: &[Vec<u8>]) -> Vec<SymbolId> {
    tokens
        .iter()
        .map(|t| model.symbols().lookup(t).unwrap_or(ERROR_SYMBOL))
        .collect()
}

/// Highest-scoring candidate among non-echo survivors with `len > 1`. Ties
/// keep the earliest-generated candidate (only a strictly greater score
/// replaces the incumbent).
fn select_best<'a>(candidates: &'a [Candidate], input: &[SymbolId]) -> Option<&'a Candidate> {
    let mut best: Option<&Candidate> = None;
    for c in candidates {
        if c.symbols.len() <= 1 || c.symbols == input {
            continue;
        }
        match best {
            None => best = Some(c),
            Some(b) if c.score > b.score => best = Some(c),
            _ => {}
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Seed selection
// ---------------------------------------------------------------------------

fn select_seed<R: Rng>(model: &Model, keywords: &Keywords, rng: &mut R) -> SymbolId {
    let all = keywords.all();
    if !all.is_empty() {
        let start = rng.gen_range(0..all.len());
        for offset in 0..all.len() {
            let sym = all[(start + offset) % all.len()];
            if keywords.primary.contains(&sym) {
                return sym;
            }
        }
    }

    let trie = model.trie();
    let root = trie.forward_root();
    let candidates: Vec<SymbolId> = trie
        .node(root)
        .children()
        .iter()
        .map(|&(sym, _)| sym)
        .filter(|&sym| sym != ERROR_SYMBOL && sym != FIN_SYMBOL)
        .collect();

    if candidates.is_empty() {
        // Seeding fails: the candidate collapses to a lone <FIN>, which the
        // non-echo/len>1 filter discards.
        return FIN_SYMBOL;
    }
    candidates[rng.gen_range(0..candidates.len())]
}

// ---------------------------------------------------------------------------
// Babble
// ---------------------------------------------------------------------------

fn babble<R: Rng>(
    trie: &Trie,
    ctx: &Context,
    order: usize,
    keywords: &Keywords,
    used_key: &mut bool,
    reply: &[SymbolId],
    rng: &mut R,
) -> Option<SymbolId> {
    let node = ctx.deepest(order);
    let n = trie.node(node);
    let branch = n.branch();
    if branch == 0 {
        return None;
    }

    let children = n.children();
    let start = rng.gen_range(0..branch);
    let mut c: i64 = rng.gen_range(0..n.usage.max(1)) as i64;

    for offset in 0..branch {
        let (sym, child_id) = children[(start + offset) % branch];
        if keywords.contains(sym) && (*used_key || !keywords.is_aux(sym)) && !reply.contains(&sym) {
            *used_key = true;
            return Some(sym);
        }
        c -= trie.node(child_id).count as i64;
        if c < 0 {
            return Some(sym);
        }
    }

    // Unreachable given the usage/count invariant (cumulative counts sum to
    // usage, so the loop always returns before running out of children),
    // but kept so babble is total rather than panicking on a broken model.
    None
}

fn generate_reply<R: Rng>(model: &Model, keywords: &Keywords, rng: &mut R) -> Vec<SymbolId> {
    let seed = select_seed(model, keywords, rng);
    let mut used_key = false;
    let mut reply = forward_generate(model, keywords, seed, &mut used_key, rng);
    backward_generate(model, keywords, &mut reply, &mut used_key, rng);
    reply
}

fn forward_generate<R: Rng>(
    model: &Model,
    keywords: &Keywords,
    seed: SymbolId,
    used_key: &mut bool,
    rng: &mut R,
) -> Vec<SymbolId> {
    let order = model.order() as usize;
    let trie = model.trie();
    let mut ctx = Context::new(order, trie.forward_root());
    let mut reply = vec![seed];
    ctx.walk(trie, seed);

    for _ in 0..BABBLE_STEP_CAP {
        match babble(trie, &ctx, order, keywords, used_key, &reply, rng) {
            None => break,
            Some(sym) if sym == ERROR_SYMBOL || sym == FIN_SYMBOL => break,
            Some(sym) => {
                reply.push(sym);
                ctx.walk(trie, sym);
            }
        }
    }
    reply
}

fn backward_generate<R: Rng>(
    model: &Model,
    keywords: &Keywords,
    reply: &mut Vec<SymbolId>,
    used_key: &mut bool,
    rng: &mut R,
) {
    let order = model.order() as usize;
    let trie = model.trie();
    let mut ctx = Context::new(order, trie.backward_root());

    let start = (reply.len() - 1).min(order);
    for idx in (0..=start).rev() {
        ctx.walk(trie, reply[idx]);
    }

    for _ in 0..BABBLE_STEP_CAP {
        match babble(trie, &ctx, order, keywords, used_key, reply, rng) {
            None => break,
            Some(sym) if sym == ERROR_SYMBOL || sym == FIN_SYMBOL => break,
            Some(sym) => {
                reply.insert(0, sym);
                ctx.walk(trie, sym);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Surprise evaluation
// ---------------------------------------------------------------------------

fn evaluate(model: &Model, keywords: &Keywords, reply: &[SymbolId]) -> f64 {
    let order = model.order() as usize;
    let trie = model.trie();

    let (entropy_f, num_f) = evaluate_direction(
        trie,
        trie.forward_root(),
        order,
        keywords,
        reply.iter().copied(),
    );
    let (entropy_b, num_b) = evaluate_direction(
        trie,
        trie.backward_root(),
        order,
        keywords,
        reply.iter().rev().copied(),
    );

    let mut entropy = entropy_f + entropy_b;
    let num = num_f + num_b;

    if num >= 8 {
        entropy /= ((num - 1) as f64).sqrt();
    }
    if num >= 16 {
        entropy /= num as f64;
    }
    entropy
}

fn evaluate_direction(
    trie: &Trie,
    root: NodeId,
    order: usize,
    keywords: &Keywords,
    symbols: impl Iterator<Item = SymbolId>,
) -> (f64, usize) {
    let mut ctx = Context::new(order, root);
    let mut entropy = 0.0;
    let mut num = 0usize;

    // Context depths 0..order-1 only: the deepest level is written during
    // learning/generation but deliberately skipped here.
    let depth_bound = order.saturating_sub(1);

    for sym in symbols {
        if keywords.contains(sym) {
            let mut prob = 0.0;
            let mut n = 0usize;
            for j in 0..depth_bound {
                if let Some(node) = ctx.get(j) {
                    if let Some(child) = trie.child(node, sym) {
                        let usage = trie.node(node).usage as f64;
                        if usage > 0.0 {
                            prob += trie.node(child).count as f64 / usage;
                            n += 1;
                        }
                    }
                }
            }
            if n > 0 {
                entropy -= (prob / n as f64).ln();
                num += 1;
            }
        }
        ctx.walk(trie, sym);
    }

    (entropy, num)
}

// ---------------------------------------------------------------------------
// Output formatting
// ---------------------------------------------------------------------------

fn format_reply(model: &Model, symbols: &[SymbolId]) -> String {
    let mut bytes = Vec::new();
    for &sym in symbols {
        bytes.extend_from_slice(model.symbols().word_of(sym));
    }
    capitalize(&mut bytes);
    String::from_utf8_lossy(&bytes).into_owned()
}

fn capitalize(bytes: &mut [u8]) {
    let mut cap_next = true;
    let mut awaiting_whitespace = false;

    for b in bytes.iter_mut() {
        if b.is_ascii_alphabetic() {
            if cap_next {
                *b = b.to_ascii_uppercase();
                cap_next = false;
            } else {
                *b = b.to_ascii_lowercase();
            }
            awaiting_whitespace = false;
        } else if matches!(*b, b'!' | b'.' | b'?') {
            awaiting_whitespace = true;
        } else if awaiting_whitespace && b.is_ascii_whitespace() {
            cap_next = true;
            awaiting_whitespace = false;
        }
    }
}
