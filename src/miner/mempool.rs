use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::blockchain::{OpKind, Operation};
use crate::error::ArtError;

fn op_key(kind: OpKind, shape_hash: &str) -> String {
    match kind {
        OpKind::Add => format!("add:{shape_hash}"),
        OpKind::Delete => format!("delete:{shape_hash}"),
    }
}

/// FIFO queue of operations awaiting inclusion in a block.
///
/// Multi-producer (art-app handlers), single-consumer (the mining loop).
/// Ops the mining loop refuses at block-building time land in the
/// rejection log so the handler awaiting confirmation can surface the
/// error instead of polling forever.
#[derive(Debug, Default)]
pub struct Mempool {
    queue: Mutex<VecDeque<Operation>>,
    rejected: Mutex<HashMap<String, ArtError>>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, op: Operation) {
        self.queue.lock().expect("mutex poisoned").push_back(op);
    }

    /// Take every pending op, preserving submission order.
    pub fn drain(&self) -> Vec<Operation> {
        self.queue
            .lock()
            .expect("mutex poisoned")
            .drain(..)
            .collect()
    }

    /// Put ops back at the head of the queue (a mined candidate went
    /// stale); their relative order is preserved.
    pub fn requeue_front(&self, ops: Vec<Operation>) {
        let mut queue = self.queue.lock().expect("mutex poisoned");
        for op in ops.into_iter().rev() {
            queue.push_front(op);
        }
    }

    pub fn len(&self) -> usize {
        self.queue.lock().expect("mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record that an op was refused at block-building time.
    pub fn reject(&self, op: &Operation, err: ArtError) {
        self.rejected
            .lock()
            .expect("mutex poisoned")
            .insert(op_key(op.kind, &op.shape_hash), err);
    }

    /// Consume a recorded rejection for the given op, if any.
    pub fn take_rejection(&self, kind: OpKind, shape_hash: &str) -> Option<ArtError> {
        self.rejected
            .lock()
            .expect("mutex poisoned")
            .remove(&op_key(kind, shape_hash))
    }
}
