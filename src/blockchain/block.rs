use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::settings::MinerNetSettings;

/// MD5 of `data` as a 32-char lowercase hex string. The consensus hash of
/// the whole network: block hashes and shape hashes both use it.
pub fn md5_hex(data: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(data.as_bytes());
    hex::encode(hasher.finalize())
}

/// Proof-of-work test: the hash must end with `n` hex zeros.
pub fn has_trailing_zeros(hash: &str, n: u32) -> bool {
    hash.ends_with(&"0".repeat(n as usize))
}

/// The hash naming an add operation: MD5 over the submitting miner's key
/// followed by the rendered svg element.
pub fn shape_hash(miner_key: &str, svg_element: &str) -> String {
    md5_hex(&format!("{miner_key}{svg_element}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Add,
    Delete,
}

/// A drawing operation committed to the chain. Immutable once placed in a
/// block. Delete operations carry only the shape hash they revoke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub kind: OpKind,
    pub svg_path: String,
    pub fill: String,
    pub stroke: String,
    pub shape_hash: String,
    pub art_node_key: String,
}

impl Operation {
    /// Build an add op; the shape hash is derived from the miner that will
    /// commit it.
    pub fn add(
        svg_path: String,
        fill: String,
        stroke: String,
        miner_key: &str,
        art_node_key: String,
    ) -> Self {
        let mut op = Self {
            kind: OpKind::Add,
            svg_path,
            fill,
            stroke,
            shape_hash: String::new(),
            art_node_key,
        };
        op.shape_hash = shape_hash(miner_key, &op.svg_element());
        op
    }

    pub fn delete(shape_hash: String, art_node_key: String) -> Self {
        Self {
            kind: OpKind::Delete,
            svg_path: String::new(),
            fill: String::new(),
            stroke: String::new(),
            shape_hash,
            art_node_key,
        }
    }

    /// The rendered `<path/>` element; covered by the shape hash and pasted
    /// verbatim into canvas snapshots.
    pub fn svg_element(&self) -> String {
        format!(
            "<path d=\"{}\" stroke=\"{}\" fill=\"{}\"/>",
            self.svg_path, self.stroke, self.fill
        )
    }

    fn canonical(&self) -> String {
        format!("{}{}{}", self.svg_path, self.shape_hash, self.art_node_key)
    }
}

/// One block of the ledger. The hash covers `prev_hash`, the ops, the
/// miner key, the index and the nonce -- derived state never enters it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub prev_hash: String,
    pub index: u64,
    pub miner_key: String,
    pub nonce: u64,
    pub ops: Vec<Operation>,
    pub no_op: bool,
}

impl Block {
    /// Create an unmined block on top of `prev_hash`. Call `mine()` to
    /// perform the proof-of-work.
    pub fn new(prev_hash: String, index: u64, miner_key: String, ops: Vec<Operation>) -> Self {
        let no_op = ops.is_empty();
        Self {
            prev_hash,
            index,
            miner_key,
            nonce: 0,
            ops,
            no_op,
        }
    }

    /// Canonical serialization hashed together with the nonce.
    fn canonical(&self) -> String {
        let mut s = String::new();
        s.push_str(&self.prev_hash);
        for op in &self.ops {
            s.push_str(&op.canonical());
        }
        s.push_str(&self.miner_key);
        s.push_str(&self.index.to_string());
        s
    }

    pub fn compute_hash(&self) -> String {
        md5_hex(&format!("{}{}", self.canonical(), self.nonce))
    }

    /// The difficulty this block must satisfy under the given settings.
    pub fn difficulty(&self, settings: &MinerNetSettings) -> u32 {
        if self.no_op {
            settings.pow_difficulty_no_op_block
        } else {
            settings.pow_difficulty_op_block
        }
    }

    /// Search nonces from zero and keep the smallest whose hash carries the
    /// required trailing zeros. Runs to completion.
    pub fn mine(&mut self, difficulty: u32) {
        let base = self.canonical();
        let mut nonce: u64 = 0;
        loop {
            if has_trailing_zeros(&md5_hex(&format!("{base}{nonce}")), difficulty) {
                self.nonce = nonce;
                return;
            }
            nonce += 1;
        }
    }

    /// Validate that the stored nonce satisfies the difficulty. (Does NOT
    /// validate chain linkage.)
    pub fn is_valid(&self, difficulty: u32) -> bool {
        has_trailing_zeros(&self.compute_hash(), difficulty)
    }
}
