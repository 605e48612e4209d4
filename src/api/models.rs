use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::blockchain::{Block, Chain};
use crate::miner::Mempool;
use crate::peer::PeerTable;
use crate::settings::{CanvasSettings, MinerNetSettings};
use crate::wallet::MinerKeys;

/// Shared application state: the chain behind a read-write lock, the
/// mempool, the peer table, and the immutable identity/settings.
pub struct AppState {
    pub settings: MinerNetSettings,
    pub keys: MinerKeys,
    /// Address peers can reach our miner-to-miner API on.
    pub miner_addr: String,
    pub chain: RwLock<Chain>,
    pub mempool: Mempool,
    pub peers: PeerTable,
}

impl AppState {
    pub fn new(settings: MinerNetSettings, keys: MinerKeys, miner_addr: String) -> Self {
        Self {
            settings,
            keys,
            miner_addr,
            chain: RwLock::new(Chain::new()),
            mempool: Mempool::new(),
            peers: PeerTable::new(),
        }
    }
}

/* ---------- Request/Reply Models ---------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShapeType {
    Path,
}

#[derive(Deserialize)]
pub struct ConnectRequest {
    pub private_key: String,
}

#[derive(Serialize)]
pub struct ConnectReply {
    pub canvas_settings: CanvasSettings,
    pub valid: bool,
}

#[derive(Deserialize)]
pub struct InkRequest {
    pub private_key: String,
}

#[derive(Serialize)]
pub struct InkReply {
    pub ink_remaining: u32,
}

#[derive(Deserialize)]
pub struct AddShapeRequest {
    pub validate_num: u64,
    pub shape_type: ShapeType,
    pub svg: String,
    pub fill: String,
    pub stroke: String,
    pub art_node_key: String,
}

#[derive(Serialize)]
pub struct AddShapeReply {
    pub shape_hash: String,
    pub block_hash: String,
    pub ink_remaining: u32,
}

#[derive(Deserialize)]
pub struct DeleteShapeRequest {
    pub validate_num: u64,
    pub shape_hash: String,
    pub art_node_key: String,
}

#[derive(Serialize)]
pub struct DeleteShapeReply {
    pub ink_remaining: u32,
}

#[derive(Serialize)]
pub struct SvgStringReply {
    pub svg_string: String,
}

#[derive(Serialize)]
pub struct ShapesReply {
    pub shape_hashes: Vec<String>,
}

#[derive(Serialize)]
pub struct GenesisReply {
    pub block_hash: String,
}

#[derive(Serialize)]
pub struct ChildrenReply {
    pub block_hashes: Vec<String>,
}

#[derive(Serialize)]
pub struct CloseCanvasReply {
    /// Per-miner `svg:hash` / `delete:hash` entries in commit order.
    pub canvas_ops: HashMap<String, Vec<String>>,
    pub ink_remaining: u32,
    /// Rendered snapshot of the live shapes.
    pub html: String,
}

#[derive(Serialize)]
pub struct ChainResponse {
    pub length: usize,
    pub chain: Vec<Block>,
}
