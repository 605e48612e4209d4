use thiserror::Error;

use crate::blockchain::block::{shape_hash, Block, OpKind};
use crate::blockchain::state::{InkAccount, LedgerState, LiveShape, ShapeLogEntry};
use crate::error::ArtError;
use crate::settings::MinerNetSettings;
use crate::svg::rasterize;

/// Why a candidate chain (or block) was rejected. Never surfaced to art
/// apps; invalid peer chains are logged and discarded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("chain does not start at the genesis block")]
    BadGenesis,

    #[error("block {0} has a non-consecutive index")]
    BadIndex(u64),

    #[error("block {0} does not link to its predecessor")]
    BadLinkage(u64),

    #[error("block {0} fails proof-of-work")]
    BadProofOfWork(u64),

    #[error("block {0} mislabels its op flag")]
    BadOpFlag(u64),

    #[error("operation signature mismatch in block {0}")]
    BadOpSignature(u64),

    #[error("miner {0} overdraws ink")]
    InkOverdraw(String),

    #[error("delete references unknown or dead shape [{0}]")]
    UnknownShape(String),

    #[error("shape rejected during replay: {0}")]
    Shape(#[from] ArtError),
}

/// Replay one block on top of `prev`, producing the successor state.
///
/// Enforces, in order: the op flag, op signatures, the funding rule (the
/// block's add costs must fit in the miner's pre-block balance, before the
/// block's own reward), overlap against foreign pixels, and delete
/// liveness/ownership.
pub fn apply_block(
    prev: &LedgerState,
    block: &Block,
    settings: &MinerNetSettings,
) -> Result<LedgerState, ChainError> {
    if block.no_op != block.ops.is_empty() {
        return Err(ChainError::BadOpFlag(block.index));
    }

    // Rasterize and sign-check every add up front; the summed cost gates
    // the whole block on the miner's pre-block balance.
    let mut rasters = Vec::with_capacity(block.ops.len());
    let mut add_cost: u32 = 0;
    for op in &block.ops {
        match op.kind {
            OpKind::Add => {
                if shape_hash(&block.miner_key, &op.svg_element()) != op.shape_hash {
                    return Err(ChainError::BadOpSignature(block.index));
                }
                let raster = rasterize(&op.svg_path, &op.fill, &settings.canvas_settings)?;
                add_cost += raster.ink;
                rasters.push(Some(raster));
            }
            OpKind::Delete => rasters.push(None),
        }
    }
    if add_cost > prev.ink_remain(&block.miner_key) {
        return Err(ChainError::InkOverdraw(block.miner_key.clone()));
    }

    let mut state = prev.clone();
    let reward = if block.no_op {
        settings.ink_per_no_op_block
    } else {
        settings.ink_per_op_block
    };
    state
        .miner_inks
        .entry(block.miner_key.clone())
        .or_insert_with(InkAccount::default)
        .credit(reward);

    for (op, raster) in block.ops.iter().zip(rasters) {
        match op.kind {
            OpKind::Add => {
                let raster = raster.expect("add ops are rasterized above");
                state.canvas.check_shape(&raster.pixels, &block.miner_key)?;
                state.canvas.add_shape(&raster.pixels, &block.miner_key);
                state
                    .miner_inks
                    .get_mut(&block.miner_key)
                    .expect("credited above")
                    .debit(raster.ink)
                    .map_err(|_| ChainError::InkOverdraw(block.miner_key.clone()))?;

                let seq = state.next_seq;
                state.next_seq += 1;
                state.live.insert(
                    op.shape_hash.clone(),
                    LiveShape {
                        svg_element: op.svg_element(),
                        miner_key: block.miner_key.clone(),
                        art_node_key: op.art_node_key.clone(),
                        cost: raster.ink,
                        pixels: raster.pixels,
                        seq,
                    },
                );
                state
                    .shape_log
                    .entry(block.miner_key.clone())
                    .or_default()
                    .push(ShapeLogEntry {
                        kind: OpKind::Add,
                        shape_hash: op.shape_hash.clone(),
                        svg_element: op.svg_element(),
                    });
            }
            OpKind::Delete => {
                let shape = state
                    .live
                    .remove(&op.shape_hash)
                    .ok_or_else(|| ChainError::UnknownShape(op.shape_hash.clone()))?;
                if shape.art_node_key != op.art_node_key {
                    return Err(ArtError::ShapeOwner(op.shape_hash.clone()).into());
                }
                state.canvas.remove_shape(&shape.pixels, &shape.miner_key)?;
                // the refund goes to the miner that paid for the add
                state
                    .miner_inks
                    .get_mut(&shape.miner_key)
                    .ok_or_else(|| ChainError::UnknownShape(op.shape_hash.clone()))?
                    .refund(shape.cost)
                    .map_err(|_| ChainError::InkOverdraw(shape.miner_key.clone()))?;
                state
                    .shape_log
                    .entry(block.miner_key.clone())
                    .or_default()
                    .push(ShapeLogEntry {
                        kind: OpKind::Delete,
                        shape_hash: op.shape_hash.clone(),
                        svg_element: String::new(),
                    });
            }
        }
    }

    Ok(state)
}

/// Validate a whole candidate chain from genesis, returning the block
/// hashes and the per-block derived states. Any failure rejects the
/// candidate wholesale.
pub fn validate_chain(
    blocks: &[Block],
    settings: &MinerNetSettings,
) -> Result<(Vec<String>, Vec<LedgerState>), ChainError> {
    let mut hashes = Vec::with_capacity(blocks.len());
    let mut states = Vec::with_capacity(blocks.len());
    let mut prev_state = LedgerState::default();

    for (i, block) in blocks.iter().enumerate() {
        if block.index != i as u64 + 1 {
            return Err(ChainError::BadIndex(block.index));
        }
        if i == 0 {
            if block.prev_hash != settings.genesis_block_hash {
                return Err(ChainError::BadGenesis);
            }
        } else if block.prev_hash != hashes[i - 1] {
            return Err(ChainError::BadLinkage(block.index));
        }

        if !block.is_valid(block.difficulty(settings)) {
            return Err(ChainError::BadProofOfWork(block.index));
        }
        let hash = block.compute_hash();

        let state = apply_block(&prev_state, block, settings)?;
        hashes.push(hash);
        prev_state = state.clone();
        states.push(state);
    }

    Ok((hashes, states))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::block::Operation;

    const MINER: &str = "miner-a";

    fn settings() -> MinerNetSettings {
        MinerNetSettings {
            pow_difficulty_op_block: 1,
            pow_difficulty_no_op_block: 1,
            // one no-op reward must fund the 25-ink triangle below
            ink_per_no_op_block: 30,
            ..MinerNetSettings::default()
        }
    }

    fn mined(prev: &str, index: u64, miner: &str, ops: Vec<Operation>, s: &MinerNetSettings) -> Block {
        let mut b = Block::new(prev.into(), index, miner.into(), ops);
        b.mine(b.difficulty(s));
        b
    }

    fn add_op(svg: &str, fill: &str, miner: &str) -> Operation {
        Operation::add(svg.into(), fill.into(), "red".into(), miner, "art-1".into())
    }

    /// A chain: one no-op block, then an op block adding the triangle.
    fn chain_with_triangle(s: &MinerNetSettings) -> Vec<Block> {
        let b1 = mined(&s.genesis_block_hash, 1, MINER, vec![], s);
        let b2 = mined(
            &b1.compute_hash(),
            2,
            MINER,
            vec![add_op("M 4 0 L 0 4 h 8 l -4 -4", "red", MINER)],
            s,
        );
        vec![b1, b2]
    }

    #[test]
    fn valid_chain_replays_to_expected_ink() {
        let s = settings();
        let blocks = chain_with_triangle(&s);
        let (hashes, states) = validate_chain(&blocks, &s).unwrap();
        assert_eq!(hashes.len(), 2);

        let tip = states.last().unwrap();
        let acc = &tip.miner_inks[MINER];
        // one no-op reward + one op reward - triangle fill cost
        assert_eq!(acc.ink_mined, s.ink_per_no_op_block + s.ink_per_op_block);
        assert_eq!(acc.ink_spent, 25);
        assert_eq!(acc.ink_remain, acc.ink_mined - 25);
        assert_eq!(tip.canvas.len(), 25);
        assert_eq!(tip.live.len(), 1);
    }

    #[test]
    fn replay_is_idempotent() {
        let s = settings();
        let blocks = chain_with_triangle(&s);
        let (_, first) = validate_chain(&blocks, &s).unwrap();
        let (_, second) = validate_chain(&blocks, &s).unwrap();
        let (a, b) = (first.last().unwrap(), second.last().unwrap());
        assert_eq!(a.miner_inks, b.miner_inks);
        assert_eq!(a.canvas.len(), b.canvas.len());
    }

    #[test]
    fn delete_restores_ink_and_clears_pixels() {
        let s = settings();
        let mut blocks = chain_with_triangle(&s);
        let shape = blocks[1].ops[0].shape_hash.clone();
        let del = Operation::delete(shape, "art-1".into());
        let b3 = mined(&blocks[1].compute_hash(), 3, MINER, vec![del], &s);
        blocks.push(b3);

        let (_, states) = validate_chain(&blocks, &s).unwrap();
        let tip = states.last().unwrap();
        let acc = &tip.miner_inks[MINER];
        assert_eq!(acc.ink_spent, 0);
        assert_eq!(acc.ink_remain, acc.ink_mined);
        assert!(tip.canvas.is_empty());
        assert!(tip.live.is_empty());
    }

    #[test]
    fn tampered_linkage_is_rejected() {
        let s = settings();
        let mut blocks = chain_with_triangle(&s);
        blocks[1].prev_hash = "0".repeat(32);
        assert_eq!(
            validate_chain(&blocks, &s),
            Err(ChainError::BadLinkage(2))
        );
    }

    #[test]
    fn wrong_genesis_is_rejected() {
        let s = settings();
        let b1 = mined("ffffffffffffffffffffffffffffffff", 1, MINER, vec![], &s);
        assert_eq!(validate_chain(&[b1], &s), Err(ChainError::BadGenesis));
    }

    #[test]
    fn bad_nonce_is_rejected() {
        let s = settings();
        let mut blocks = chain_with_triangle(&s);
        // find a nonce that fails difficulty for the tip block
        let mut bad_nonce = None;
        for n in 0..1000 {
            let mut probe = blocks[1].clone();
            probe.nonce = n;
            if !probe.is_valid(probe.difficulty(&s)) {
                bad_nonce = Some(n);
                break;
            }
        }
        blocks[1].nonce = bad_nonce.expect("some nonce fails difficulty 1");
        assert_eq!(
            validate_chain(&blocks, &s),
            Err(ChainError::BadProofOfWork(2))
        );
    }

    #[test]
    fn forged_shape_hash_is_rejected() {
        let s = settings();
        let b1 = mined(&s.genesis_block_hash, 1, MINER, vec![], &s);
        let mut op = add_op("M 0 0 L 0 5", "transparent", MINER);
        op.shape_hash = "0".repeat(32);
        let b2 = mined(&b1.compute_hash(), 2, MINER, vec![op], &s);
        assert_eq!(
            validate_chain(&[b1, b2], &s),
            Err(ChainError::BadOpSignature(2))
        );
    }

    #[test]
    fn unfunded_ops_are_rejected() {
        let mut s = settings();
        s.ink_per_no_op_block = 1; // too little to afford the triangle
        let blocks = chain_with_triangle(&s);
        assert_eq!(
            validate_chain(&blocks, &s),
            Err(ChainError::InkOverdraw(MINER.into()))
        );
    }

    #[test]
    fn foreign_overlap_is_rejected_during_replay() {
        let s = settings();
        let b1 = mined(&s.genesis_block_hash, 1, MINER, vec![], &s);
        let b2 = mined(
            &b1.compute_hash(),
            2,
            MINER,
            vec![add_op("M 0 0 L 0 5", "transparent", MINER)],
            &s,
        );
        let b3 = mined(&b2.compute_hash(), 3, "miner-b", vec![], &s);
        let b4 = mined(
            &b3.compute_hash(),
            4,
            "miner-b",
            vec![add_op("M 0 3 L 0 7", "transparent", "miner-b")],
            &s,
        );
        let err = validate_chain(&[b1, b2, b3, b4], &s).unwrap_err();
        assert_eq!(err, ChainError::Shape(ArtError::Overlap("0,3".into())));
    }

    #[test]
    fn delete_of_unknown_shape_is_rejected() {
        let s = settings();
        let b1 = mined(&s.genesis_block_hash, 1, MINER, vec![], &s);
        let del = Operation::delete("0".repeat(32), "art-1".into());
        let b2 = mined(&b1.compute_hash(), 2, MINER, vec![del], &s);
        assert!(matches!(
            validate_chain(&[b1, b2], &s),
            Err(ChainError::UnknownShape(_))
        ));
    }

    #[test]
    fn delete_by_wrong_art_node_is_rejected() {
        let s = settings();
        let mut blocks = chain_with_triangle(&s);
        let shape = blocks[1].ops[0].shape_hash.clone();
        let del = Operation::delete(shape, "art-2".into());
        let b3 = mined(&blocks[1].compute_hash(), 3, MINER, vec![del], &s);
        blocks.push(b3);
        let err = validate_chain(&blocks, &s).unwrap_err();
        assert!(matches!(err, ChainError::Shape(ArtError::ShapeOwner(_))));
    }
}
