//! Binary persistence, compatible with the documented `MegaHALv8` wire
//! format: magic `b"MegaHALv8"`, a 1-byte order, a pre-order recursive dump
//! of the forward tree then the backward tree, then a word dictionary.
//!
//! Per-node fields are `symbol:u16, usage:u32, count:u16, branch:u16`. The
//! dictionary is `size:u32` followed by `size` entries of `length:u8,
//! bytes`, in insertion (symbol-id) order. Everything is little-endian,
//! committed to regardless of the host's native endianness, so a file
//! written on one machine loads on another. This is the only I/O this
//! crate performs; the core engine stays free of it.

use std::io::{Read, Write};

use anyhow::{bail, Context as _, Result};

use crate::model::Model;
use crate::symbol::SymbolTable;
use crate::trie::{NodeId, Trie};

const MAGIC: &[u8; 9] = b"MegaHALv8";

/// Write `model`'s dual trie and symbol table to `w` in the documented
/// layout.
pub fn save_to<W: Write>(model: &Model, w: &mut W) -> Result<()> {
    w.write_all(MAGIC).context("writing magic")?;
    w.write_all(&[model.order()]).context("writing order")?;
    write_tree(model.trie(), model.trie().forward_root(), w)?;
    write_tree(model.trie(), model.trie().backward_root(), w)?;
    write_dictionary(model.symbols(), w)?;
    Ok(())
}

/// Read a model previously written by [`save_to`] back from `r`.
pub fn load_from<R: Read>(r: &mut R) -> Result<Model> {
    let mut magic = [0u8; 9];
    r.read_exact(&mut magic).context("reading magic")?;
    if &magic != MAGIC {
        bail!(
            "not a MegaHALv8 stream: expected magic {:?}, found {:?}",
            String::from_utf8_lossy(MAGIC),
            String::from_utf8_lossy(&magic)
        );
    }

    let mut order_byte = [0u8; 1];
    r.read_exact(&mut order_byte).context("reading order")?;
    let order = order_byte[0];

    let mut trie = Trie::new();
    read_subtree(&mut trie, trie.forward_root(), r).context("reading forward tree")?;
    read_subtree(&mut trie, trie.backward_root(), r).context("reading backward tree")?;
    let symbols = read_dictionary(r).context("reading dictionary")?;

    Ok(Model::from_parts(symbols, trie, order))
}

fn write_tree<W: Write>(trie: &Trie, node_id: NodeId, w: &mut W) -> Result<()> {
    let node = trie.node(node_id);
    w.write_all(&node.symbol.to_le_bytes())?;
    w.write_all(&node.usage.to_le_bytes())?;
    w.write_all(&node.count.to_le_bytes())?;
    let branch = node.children().len() as u16;
    w.write_all(&branch.to_le_bytes())?;
    for &(_, child_id) in node.children() {
        write_tree(trie, child_id, w)?;
    }
    Ok(())
}

/// Mirror of [`write_tree`]: reads one node's header into `node_id` (already
/// allocated by the caller), then recursively reserves and fills each of
/// its children.
fn read_subtree<R: Read>(trie: &mut Trie, node_id: NodeId, r: &mut R) -> Result<()> {
    let symbol = read_u16(r)?;
    let usage = read_u32(r)?;
    let count = read_u16(r)?;
    let branch = read_u16(r)?;
    trie.set_node_fields(node_id, symbol, count, usage);

    for _ in 0..branch {
        let child_id = trie.reserve_node();
        read_subtree(trie, child_id, r)?;
        let child_symbol = trie.node(child_id).symbol;
        trie.attach_child(node_id, child_symbol, child_id);
    }
    Ok(())
}

fn write_dictionary<W: Write>(symbols: &SymbolTable, w: &mut W) -> Result<()> {
    let size = symbols.len() as u32;
    w.write_all(&size.to_le_bytes())?;
    for id in 0..symbols.len() {
        let word = symbols.word_of(id as u16);
        if word.len() > u8::MAX as usize {
            bail!(
                "word {:?} is longer than 255 bytes, cannot persist",
                String::from_utf8_lossy(word)
            );
        }
        w.write_all(&[word.len() as u8])?;
        w.write_all(word)?;
    }
    Ok(())
}

/// Rebuilds the table by re-interning every persisted word in order.
/// `<ERROR>`/`<FIN>` are already present at ids 0/1 from
/// [`SymbolTable::new`]; interning them again from the stream is a no-op by
/// construction (`intern` is idempotent), so ids line up without special
/// casing the two reserved entries.
fn read_dictionary<R: Read>(r: &mut R) -> Result<SymbolTable> {
    let size = read_u32(r)?;
    let mut table = SymbolTable::new();
    for _ in 0..size {
        let mut len_byte = [0u8; 1];
        r.read_exact(&mut len_byte)?;
        let len = len_byte[0] as usize;
        let mut buf = vec![0u8; len];
        r.read_exact(&mut buf)?;
        table.intern(&buf)?;
    }
    Ok(table)
}

fn read_u16<R: Read>(r: &mut R) -> Result<u16> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32<R: Read>(r: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learner::learn_text;

    fn node_usage_equals_child_counts(trie: &Trie, node: NodeId) -> bool {
        let n = trie.node(node);
        let sum: u32 = n.children().iter().map(|&(_, c)| trie.node(c).count as u32).sum();
        n.usage == sum
    }

    fn check_invariant_everywhere(model: &Model) {
        for id in 0..model.trie().node_count() as NodeId {
            assert!(node_usage_equals_child_counts(model.trie(), id));
        }
    }

    #[test]
    fn round_trip_preserves_order_and_vocabulary() {
        let mut model = Model::new(3);
        learn_text(&mut model, "THE QUICK BROWN FOX JUMPS OVER THE LAZY DOG.").unwrap();

        let mut buf = Vec::new();
        save_to(&model, &mut buf).unwrap();
        let restored = load_from(&mut &buf[..]).unwrap();

        assert_eq!(restored.order(), model.order());
        assert_eq!(restored.symbols().len(), model.symbols().len());
        for id in 0..model.symbols().len() {
            let id = id as u16;
            assert_eq!(restored.symbols().word_of(id), model.symbols().word_of(id));
        }
    }

    #[test]
    fn round_trip_preserves_every_node_field() {
        let mut model = Model::new(2);
        learn_text(
            &mut model,
            "THE QUICK BROWN FOX JUMPS OVER THE LAZY DOG.\nTHE DOG BARKS AT THE FOX AGAIN TODAY.",
        )
        .unwrap();

        let mut buf = Vec::new();
        save_to(&model, &mut buf).unwrap();
        let restored = load_from(&mut &buf[..]).unwrap();

        assert_eq!(restored.trie().node_count(), model.trie().node_count());
        for id in 0..model.trie().node_count() as NodeId {
            let orig = model.trie().node(id);
            let back = restored.trie().node(id);
            assert_eq!(back.symbol, orig.symbol, "symbol mismatch at node {id}");
            assert_eq!(back.count, orig.count, "count mismatch at node {id}");
            assert_eq!(back.usage, orig.usage, "usage mismatch at node {id}");
            assert_eq!(back.branch(), orig.branch(), "branch mismatch at node {id}");
        }
        check_invariant_everywhere(&restored);
    }

    #[test]
    fn round_trip_through_a_real_file() {
        let mut model = Model::new(4);
        learn_text(&mut model, "A STITCH IN TIME SAVES NINE INDEED.").unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.hal");
        let mut file = std::fs::File::create(&path).unwrap();
        save_to(&model, &mut file).unwrap();

        let mut file = std::fs::File::open(&path).unwrap();
        let restored = load_from(&mut file).unwrap();
        assert_eq!(restored.symbols().len(), model.symbols().len());
    }

    #[test]
    fn starts_with_documented_magic() {
        let model = Model::new(5);
        let mut buf = Vec::new();
        save_to(&model, &mut buf).unwrap();
        assert_eq!(&buf[0..9], MAGIC);
        assert_eq!(buf[9], 5);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let buf = b"NotAHalFile".to_vec();
        let err = load_from(&mut &buf[..]).unwrap_err();
        assert!(err.to_string().contains("MegaHALv8") || err.to_string().contains("magic"));
    }

    #[test]
    fn empty_model_round_trips() {
        let model = Model::new(5);
        let mut buf = Vec::new();
        save_to(&model, &mut buf).unwrap();
        let restored = load_from(&mut &buf[..]).unwrap();
        assert_eq!(restored.symbols().len(), 2);
        assert_eq!(restored.trie().node(restored.trie().forward_root()).branch(), 0);
    }
}
