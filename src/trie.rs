//! The dual trie: two n-gram trees sharing one arena, indexed by `u32`.
//!
//! Both the forward and backward trees live in the same `Vec<Node>`; a
//! [`NodeId`] is simply an index into it. This sidesteps the lifetime
//! gymnastics a borrowed-reference sliding context would otherwise force
//! onto every learn/babble/eval pass.

use serde::{Deserialize, Serialize};

use crate::symbol::SymbolId;

/// Index into the trie arena. `u32` keeps nodes compact; a model with more
/// than four billion nodes is not a concern this crate needs to handle.
pub type NodeId = u32;

/// A single trie node.
///
/// `count` is how many times this node was observed as the "next symbol"
/// given its parent's context; it saturates at `u16::MAX` rather than
/// wrapping. `usage` is the sum of children's counts — i.e. observations
/// that passed *through* this node when a child was chosen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub symbol: SymbolId,
    pub count: u16,
    pub usage: u32,
    /// Children sorted by symbol, enabling binary-search lookup. Sorting by
    /// symbol (rather than insertion order) also guarantees the symbol
    /// order never leaks into the babble draw's randomized walk.
    children: Vec<(SymbolId, NodeId)>,
}

impl Node {
    fn root() -> Self {
        Node {
            symbol: 0,
            count: 0,
            usage: 0,
            children: Vec::new(),
        }
    }

    fn leaf(symbol: SymbolId) -> Self {
        Node {
            symbol,
            count: 0,
            usage: 0,
            children: Vec::new(),
        }
    }

    /// Children in symbol order, as `(symbol, node id)` pairs.
    pub fn children(&self) -> &[(SymbolId, NodeId)] {
        &self.children
    }

    pub fn branch(&self) -> usize {
        self.children.len()
    }
}

/// Arena holding both the forward and backward n-gram trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trie {
    nodes: Vec<Node>,
    forward_root: NodeId,
    backward_root: NodeId,
}

impl Trie {
    pub fn new() -> Self {
        let mut nodes = Vec::new();
        nodes.push(Node::root());
        nodes.push(Node::root());
        Trie {
            nodes,
            forward_root: 0,
            backward_root: 1,
        }
    }

    pub fn forward_root(&self) -> NodeId {
        self.forward_root
    }

    pub fn backward_root(&self) -> NodeId {
        self.backward_root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// `O(log b)` lookup of `node`'s child for `symbol`.
    pub fn child(&self, node: NodeId, symbol: SymbolId) -> Option<NodeId> {
        let children = &self.nodes[node as usize].children;
        children
            .binary_search_by_key(&symbol, |&(sym, _)| sym)
            .ok()
            .map(|idx| children[idx].1)
    }

    /// Return the existing child for `symbol`, or create one with
    /// `count = 0, usage = 0`.
    pub fn upsert_child(&mut self, node: NodeId, symbol: SymbolId) -> NodeId {
        let children = &self.nodes[node as usize].children;
        match children.binary_search_by_key(&symbol, |&(sym, _)| sym) {
            Ok(idx) => children[idx].1,
            Err(insert_at) => {
                let new_id = self.nodes.len() as NodeId;
                self.nodes.push(Node::leaf(symbol));
                self.nodes[node as usize]
                    .children
                    .insert(insert_at, (symbol, new_id));
                new_id
            }
        }
    }

    /// The learning primitive: upsert the child for `symbol`, bump its
    /// count (saturating at `u16::MAX`, dropping the matching `usage`
    /// increment on saturation too), and return the child.
    pub fn observe(&mut self, node: NodeId, symbol: SymbolId) -> NodeId {
        let child = self.upsert_child(node, symbol);
        if self.nodes[child as usize].count < u16::MAX {
            self.nodes[child as usize].count += 1;
            self.nodes[node as usize].usage += 1;
        }
        child
    }

    /// Append a blank node and return its id, without linking it as anyone's
    /// child yet. Used by [`crate::persist`] to allocate a node before its
    /// `(symbol, count, usage)` fields are known — the wire format writes a
    /// child's own header before any of its descendants, so the reader must
    /// reserve the slot first and fill it once the header is parsed.
    pub(crate) fn reserve_node(&mut self) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(Node::root());
        id
    }

    /// Overwrite a reserved node's own fields, leaving its children alone.
    pub(crate) fn set_node_fields(&mut self, id: NodeId, symbol: SymbolId, count: u16, usage: u32) {
        let n = &mut self.nodes[id as usize];
        n.symbol = symbol;
        n.count = count;
        n.usage = usage;
    }

    /// Link `child` as `parent`'s next child under `symbol`. Trusts the
    /// caller to attach children in ascending symbol order, matching how
    /// the wire format walks `children()` when writing.
    pub(crate) fn attach_child(&mut self, parent: NodeId, symbol: SymbolId, child: NodeId) {
        self.nodes[parent as usize].children.push((symbol, child));
    }
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

/// The sliding context window: `context[d]` is the node reached by the last
/// `d` observed symbols from `context[0]`'s root, or `None` if no path has
/// been observed yet at that depth.
#[derive(Debug, Clone)]
pub struct Context {
    slots: Vec<Option<NodeId>>,
}

impl Context {
    /// `order + 2` slots: `context[0]` pinned to a root, `context[1..=order+1]`
    /// tracking progressively longer suffixes.
    pub fn new(order: usize, root: NodeId) -> Self {
        let mut slots = vec![None; order + 2];
        slots[0] = Some(root);
        Context { slots }
    }

    pub fn reset(&mut self, root: NodeId) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.slots[0] = Some(root);
    }

    pub fn get(&self, depth: usize) -> Option<NodeId> {
        self.slots[depth]
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Update the context window to reflect one more observed `symbol`,
    /// read-only: `walk` never creates nodes, so a miss truncates the
    /// deeper slots to `None`.
    pub fn walk(&mut self, trie: &Trie, symbol: SymbolId) {
        let top = self.slots.len() - 1;
        for d in (1..=top).rev() {
            self.slots[d] = self.slots[d - 1].and_then(|parent| trie.child(parent, symbol));
        }
    }

    /// Update the context window while also extending the trie: the
    /// learning cascade. Depths whose parent slot is `None` are skipped
    /// (no path exists yet at that depth).
    pub fn observe(&mut self, trie: &mut Trie, symbol: SymbolId) {
        let top = self.slots.len() - 1;
        for d in (1..=top).rev() {
            self.slots[d] = match self.slots[d - 1] {
                Some(parent) => Some(trie.observe(parent, symbol)),
                None => None,
            };
        }
    }

    /// The deepest non-`None` slot within `0..=max_depth`, and its node id.
    pub fn deepest(&self, max_depth: usize) -> NodeId {
        for d in (0..=max_depth.min(self.slots.len() - 1)).rev() {
            if let Some(node) = self.slots[d] {
                return node;
            }
        }
        self.slots[0].expect("context[0] is always Some")
    }
}
