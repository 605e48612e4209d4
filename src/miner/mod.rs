pub mod mempool;

pub use mempool::Mempool;

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::api::models::AppState;
use crate::blockchain::{apply_block, validate_chain, Block, LedgerState, LiveShape, OpKind, Operation};
use crate::error::ArtError;
use crate::settings::MinerNetSettings;
use crate::svg::rasterize;

/// How long the loop idles between blocks.
const MINE_INTERVAL: Duration = Duration::from_millis(500);

/// Revalidate pending ops against the tip state and keep the ones the next
/// block can carry, in submission order.
///
/// Adds are gated on the miner's pre-block balance (the block's own reward
/// never funds its own ops) and on overlap against a working copy of the
/// canvas, so ops queued behind each other see each other's pixels.
/// Refused ops are returned with the error the submitter should see.
pub fn select_ops(
    tip: &LedgerState,
    pending: Vec<Operation>,
    miner_key: &str,
    settings: &MinerNetSettings,
) -> (Vec<Operation>, Vec<(Operation, ArtError)>) {
    let mut working = tip.clone();
    let budget = tip.ink_remain(miner_key);
    let mut add_cost: u32 = 0;
    let mut accepted = Vec::new();
    let mut dropped = Vec::new();

    for op in pending {
        match op.kind {
            OpKind::Add => {
                let raster = match rasterize(&op.svg_path, &op.fill, &settings.canvas_settings) {
                    Ok(r) => r,
                    Err(e) => {
                        dropped.push((op, e));
                        continue;
                    }
                };
                if let Err(e) = working.canvas.check_shape(&raster.pixels, miner_key) {
                    dropped.push((op, e));
                    continue;
                }
                if add_cost + raster.ink > budget {
                    let needed = raster.ink;
                    dropped.push((op, ArtError::InsufficientInk(needed)));
                    continue;
                }
                working.canvas.add_shape(&raster.pixels, miner_key);
                working.live.insert(
                    op.shape_hash.clone(),
                    LiveShape {
                        svg_element: op.svg_element(),
                        miner_key: miner_key.to_string(),
                        art_node_key: op.art_node_key.clone(),
                        cost: raster.ink,
                        pixels: raster.pixels,
                        seq: working.next_seq,
                    },
                );
                working.next_seq += 1;
                add_cost += raster.ink;
                accepted.push(op);
            }
            OpKind::Delete => match working.live.get(&op.shape_hash) {
                Some(shape) if shape.art_node_key == op.art_node_key => {
                    let shape = working.live.remove(&op.shape_hash).expect("checked above");
                    let _ = working.canvas.remove_shape(&shape.pixels, &shape.miner_key);
                    accepted.push(op);
                }
                Some(_) => {
                    let hash = op.shape_hash.clone();
                    dropped.push((op, ArtError::ShapeOwner(hash)));
                }
                None => {
                    let hash = op.shape_hash.clone();
                    dropped.push((op, ArtError::InvalidShapeHash(hash)));
                }
            },
        }
    }

    (accepted, dropped)
}

/// Run the mining loop on a dedicated thread.
pub fn spawn_mining_loop(app: Arc<AppState>) -> thread::JoinHandle<()> {
    thread::Builder::new()
        .name("miner".into())
        .spawn(move || mining_loop(app))
        .expect("spawn mining thread")
}

fn mining_loop(app: Arc<AppState>) {
    let miner_key = app.keys.public_key_hex.clone();
    loop {
        thread::sleep(MINE_INTERVAL);

        // snapshot the tip under the read lock, then mine without it
        let (tip_hash, tip_index, tip_state) = {
            let chain = app.chain.read().expect("lock poisoned");
            (chain.tip_hash(&app.settings), chain.tip_index(), chain.tip_state())
        };

        let pending = app.mempool.drain();
        let (ops, dropped) = select_ops(&tip_state, pending, &miner_key, &app.settings);
        for (op, err) in dropped {
            warn!("dropping op {} from mempool: {err}", op.shape_hash);
            app.mempool.reject(&op, err);
        }

        let mut block = Block::new(tip_hash, tip_index + 1, miner_key.clone(), ops);
        block.mine(block.difficulty(&app.settings));

        // commit only if the tip did not advance while we were hashing
        let mut chain = app.chain.write().expect("lock poisoned");
        if chain.tip_hash(&app.settings) != block.prev_hash {
            debug!(
                "tip advanced while mining block #{}; discarding candidate",
                block.index
            );
            app.mempool.requeue_front(block.ops);
            continue;
        }
        match apply_block(&chain.tip_state(), &block, &app.settings) {
            Ok(state) => {
                info!(
                    "mined block #{} ({} ops, nonce {})",
                    block.index,
                    block.ops.len(),
                    block.nonce
                );
                chain.append(block, state);
            }
            Err(e) => {
                warn!("mined candidate #{} no longer applies: {e}", block.index);
                app.mempool.requeue_front(block.ops);
            }
        }
    }
}

/// Longest-chain fork-choice for a chain received from a peer.
///
/// A strictly longer candidate replaces the local chain iff it validates
/// from genesis; anything else is discarded without touching local state.
/// Our own ops orphaned by the switch go back into the mempool.
pub fn adopt_if_longer(app: &AppState, candidate: Vec<Block>) -> bool {
    {
        let chain = app.chain.read().expect("lock poisoned");
        if candidate.len() <= chain.len() {
            debug!(
                "peer chain of length {} is not longer than ours ({})",
                candidate.len(),
                chain.len()
            );
            return false;
        }
    }

    // validate outside the write lock; mining stays unblocked
    let (hashes, states) = match validate_chain(&candidate, &app.settings) {
        Ok(v) => v,
        Err(e) => {
            warn!("rejecting peer chain: {e}");
            return false;
        }
    };

    let mut chain = app.chain.write().expect("lock poisoned");
    if candidate.len() <= chain.len() {
        return false;
    }

    let kept: HashSet<(OpKind, &str)> = candidate
        .iter()
        .flat_map(|b| b.ops.iter())
        .map(|op| (op.kind, op.shape_hash.as_str()))
        .collect();
    let orphaned: Vec<Operation> = chain
        .blocks()
        .iter()
        .filter(|b| b.miner_key == app.keys.public_key_hex)
        .flat_map(|b| b.ops.iter())
        .filter(|op| !kept.contains(&(op.kind, op.shape_hash.as_str())))
        .cloned()
        .collect();

    info!(
        "adopting peer chain of length {} (was {}); re-queueing {} orphaned ops",
        candidate.len(),
        chain.len(),
        orphaned.len()
    );
    chain.replace(candidate, hashes, states);
    drop(chain);

    for op in orphaned {
        app.mempool.push(op);
    }
    true
}
