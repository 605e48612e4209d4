use crate::blockchain::block::{Block, OpKind, Operation};
use crate::blockchain::state::LedgerState;
use crate::settings::MinerNetSettings;

/// The longest valid chain this node has observed, with one cached hash
/// and one derived-state snapshot per block.
///
/// The chain starts empty; the genesis block exists only as the configured
/// hash constant that `blocks[0].prev_hash` must carry.
#[derive(Debug, Default)]
pub struct Chain {
    blocks: Vec<Block>,
    hashes: Vec<String>,
    states: Vec<LedgerState>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Index of the tip block; 0 when only the genesis constant exists.
    pub fn tip_index(&self) -> u64 {
        self.blocks.last().map(|b| b.index).unwrap_or(0)
    }

    /// Hash new blocks must link to: the tip's hash, or the genesis
    /// constant on an empty chain.
    pub fn tip_hash(&self, settings: &MinerNetSettings) -> String {
        self.hashes
            .last()
            .cloned()
            .unwrap_or_else(|| settings.genesis_block_hash.clone())
    }

    /// Snapshot of the tip's derived state (empty ledger on an empty chain).
    pub fn tip_state(&self) -> LedgerState {
        self.states.last().cloned().unwrap_or_default()
    }

    pub fn tip_state_ref(&self) -> Option<&LedgerState> {
        self.states.last()
    }

    pub fn ink_remain(&self, miner_key: &str) -> u32 {
        self.states
            .last()
            .map(|s| s.ink_remain(miner_key))
            .unwrap_or(0)
    }

    /// Append a block whose derived state was already computed by replay.
    pub fn append(&mut self, block: Block, state: LedgerState) {
        self.hashes.push(block.compute_hash());
        self.blocks.push(block);
        self.states.push(state);
    }

    /// Replace the whole chain after fork-choice validated a longer one.
    pub fn replace(&mut self, blocks: Vec<Block>, hashes: Vec<String>, states: Vec<LedgerState>) {
        self.blocks = blocks;
        self.hashes = hashes;
        self.states = states;
    }

    pub fn hash_at(&self, position: usize) -> Option<&str> {
        self.hashes.get(position).map(String::as_str)
    }

    pub fn position_of_hash(&self, hash: &str) -> Option<usize> {
        self.hashes.iter().position(|h| h == hash)
    }

    pub fn block_by_hash(&self, hash: &str) -> Option<&Block> {
        self.position_of_hash(hash).map(|i| &self.blocks[i])
    }

    /// Hashes of the blocks following `hash`. `None` means the hash names
    /// neither the genesis constant nor any block of this chain; a known
    /// but childless block yields an empty list.
    pub fn children(&self, hash: &str, settings: &MinerNetSettings) -> Option<Vec<String>> {
        if hash == settings.genesis_block_hash {
            return Some(self.hashes.first().cloned().into_iter().collect());
        }
        self.position_of_hash(hash)
            .map(|i| self.hashes.get(i + 1).cloned().into_iter().collect())
    }

    /// Most recent op of the given kind and shape hash, searching from the
    /// tip backwards. Returns the position of its block.
    pub fn find_op(&self, kind: OpKind, shape_hash: &str) -> Option<(usize, &Operation)> {
        for (i, block) in self.blocks.iter().enumerate().rev() {
            if let Some(op) = block
                .ops
                .iter()
                .find(|op| op.kind == kind && op.shape_hash == shape_hash)
            {
                return Some((i, op));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::validate::validate_chain;

    const MINER: &str = "miner-a";

    fn settings() -> MinerNetSettings {
        MinerNetSettings {
            pow_difficulty_op_block: 1,
            pow_difficulty_no_op_block: 1,
            ..MinerNetSettings::default()
        }
    }

    fn build_chain(len: usize, s: &MinerNetSettings) -> Chain {
        let mut chain = Chain::new();
        for i in 0..len {
            let mut b = Block::new(chain.tip_hash(s), i as u64 + 1, MINER.into(), vec![]);
            b.mine(b.difficulty(s));
            let state =
                crate::blockchain::validate::apply_block(&chain.tip_state(), &b, s).unwrap();
            chain.append(b, state);
        }
        chain
    }

    #[test]
    fn empty_chain_tips_at_genesis() {
        let s = settings();
        let chain = Chain::new();
        assert_eq!(chain.tip_hash(&s), s.genesis_block_hash);
        assert_eq!(chain.tip_index(), 0);
        assert_eq!(chain.ink_remain(MINER), 0);
    }

    #[test]
    fn genesis_children_is_first_block() {
        let s = settings();
        let chain = build_chain(2, &s);
        let kids = chain.children(&s.genesis_block_hash, &s).unwrap();
        assert_eq!(kids, vec![chain.hash_at(0).unwrap().to_string()]);
    }

    #[test]
    fn tip_has_no_children_but_is_known() {
        let s = settings();
        let chain = build_chain(2, &s);
        let tip = chain.tip_hash(&s);
        assert_eq!(chain.children(&tip, &s), Some(vec![]));
        assert_eq!(chain.children(&"f".repeat(32), &s), None);
    }

    #[test]
    fn appended_blocks_validate_as_a_chain() {
        let s = settings();
        let chain = build_chain(3, &s);
        assert!(validate_chain(chain.blocks(), &s).is_ok());
        assert_eq!(chain.tip_index(), 3);
        assert_eq!(chain.ink_remain(MINER), 3 * s.ink_per_no_op_block);
    }

    #[test]
    fn find_op_returns_latest_match() {
        let s = settings();
        let mut chain = build_chain(1, &s);
        let op = Operation::add(
            "M 0 0 L 0 5".into(),
            "transparent".into(),
            "red".into(),
            MINER,
            "art-1".into(),
        );
        let mut b = Block::new(chain.tip_hash(&s), 2, MINER.into(), vec![op.clone()]);
        b.mine(b.difficulty(&s));
        let state = crate::blockchain::validate::apply_block(&chain.tip_state(), &b, &s).unwrap();
        chain.append(b, state);

        let (pos, found) = chain.find_op(OpKind::Add, &op.shape_hash).unwrap();
        assert_eq!(pos, 1);
        assert_eq!(found.svg_path, "M 0 0 L 0 5");
        assert!(chain.find_op(OpKind::Delete, &op.shape_hash).is_none());
    }
}
