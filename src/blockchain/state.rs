use std::collections::HashMap;

use crate::blockchain::block::OpKind;
use crate::canvas::CanvasState;
use crate::svg::Point;

/// Per-miner ink ledger. `ink_remain` is always `ink_mined - ink_spent`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InkAccount {
    pub ink_mined: u32,
    pub ink_spent: u32,
    pub ink_remain: u32,
}

impl InkAccount {
    pub fn credit(&mut self, amount: u32) {
        self.ink_mined += amount;
        self.ink_remain = self.ink_mined - self.ink_spent;
    }

    /// Spend ink; fails on overdraw.
    pub fn debit(&mut self, amount: u32) -> Result<(), ()> {
        if self.ink_remain < amount {
            return Err(());
        }
        self.ink_spent += amount;
        self.ink_remain = self.ink_mined - self.ink_spent;
        Ok(())
    }

    /// Return ink spent on a deleted shape.
    pub fn refund(&mut self, amount: u32) -> Result<(), ()> {
        if self.ink_spent < amount {
            return Err(());
        }
        self.ink_spent -= amount;
        self.ink_remain = self.ink_mined - self.ink_spent;
        Ok(())
    }
}

/// One entry of a miner's on-canvas operation log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeLogEntry {
    pub kind: OpKind,
    pub shape_hash: String,
    pub svg_element: String,
}

impl ShapeLogEntry {
    /// Wire form used by CloseCanvas: `svg:hash` for adds, `delete:hash`
    /// for deletes.
    pub fn wire(&self) -> String {
        match self.kind {
            OpKind::Add => format!("{}:{}", self.svg_element, self.shape_hash),
            OpKind::Delete => format!("delete:{}", self.shape_hash),
        }
    }
}

/// A shape currently alive on the canvas, with everything a delete needs
/// to undo it without re-rasterizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveShape {
    pub svg_element: String,
    pub miner_key: String,
    pub art_node_key: String,
    pub cost: u32,
    pub pixels: Vec<Point>,
    /// Chain-order sequence number, used to render snapshots in the order
    /// the shapes were committed.
    pub seq: u64,
}

/// Derived state of a chain prefix: ink accounts, the pixel map, each
/// miner's op log and the fold of live shapes. Excluded from block hashes
/// and from the gossip wire format; always reproducible by replay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerState {
    pub miner_inks: HashMap<String, InkAccount>,
    pub canvas: CanvasState,
    pub shape_log: HashMap<String, Vec<ShapeLogEntry>>,
    pub live: HashMap<String, LiveShape>,
    pub next_seq: u64,
}

impl LedgerState {
    pub fn ink_remain(&self, miner_key: &str) -> u32 {
        self.miner_inks
            .get(miner_key)
            .map(|a| a.ink_remain)
            .unwrap_or(0)
    }

    /// Live shapes in the order their adds were committed.
    pub fn live_shapes_in_order(&self) -> Vec<&LiveShape> {
        let mut shapes: Vec<&LiveShape> = self.live.values().collect();
        shapes.sort_by_key(|s| s.seq);
        shapes
    }

    /// Find the svg element recorded for a shape hash in any miner's log.
    /// Deleted shapes remain findable; the log is append-only.
    pub fn find_svg_element(&self, shape_hash: &str) -> Option<&str> {
        self.shape_log.values().flatten().find_map(|entry| {
            (entry.kind == OpKind::Add && entry.shape_hash == shape_hash)
                .then_some(entry.svg_element.as_str())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ink_account_invariant_holds() {
        let mut acc = InkAccount::default();
        acc.credit(50);
        assert_eq!(acc.ink_remain, 50);
        acc.debit(20).unwrap();
        assert_eq!((acc.ink_mined, acc.ink_spent, acc.ink_remain), (50, 20, 30));
        acc.refund(20).unwrap();
        assert_eq!(acc.ink_remain, 50);
    }

    #[test]
    fn overdraw_and_overrefund_fail() {
        let mut acc = InkAccount::default();
        acc.credit(10);
        assert!(acc.debit(11).is_err());
        assert!(acc.refund(1).is_err());
    }

    #[test]
    fn wire_forms() {
        let add = ShapeLogEntry {
            kind: OpKind::Add,
            shape_hash: "abc".into(),
            svg_element: "<path/>".into(),
        };
        assert_eq!(add.wire(), "<path/>:abc");
        let del = ShapeLogEntry {
            kind: OpKind::Delete,
            shape_hash: "abc".into(),
            svg_element: String::new(),
        };
        assert_eq!(del.wire(), "delete:abc");
    }
}
