use std::collections::HashSet;
use std::sync::RwLock;

/// Addresses of the miners we hold a gossip link with. Peer identities are
/// addresses, never connection handles.
#[derive(Debug, Default)]
pub struct PeerTable {
    peers: RwLock<HashSet<String>>,
}

impl PeerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a peer slot. Returns false if the peer is already connected,
    /// which makes dialing idempotent.
    pub fn add(&self, addr: &str) -> bool {
        self.peers
            .write()
            .expect("lock poisoned")
            .insert(addr.to_string())
    }

    pub fn remove(&self, addr: &str) {
        self.peers.write().expect("lock poisoned").remove(addr);
    }

    pub fn contains(&self, addr: &str) -> bool {
        self.peers.read().expect("lock poisoned").contains(addr)
    }

    pub fn count(&self) -> usize {
        self.peers.read().expect("lock poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent() {
        let table = PeerTable::new();
        assert!(table.add("10.0.0.1:9100"));
        assert!(!table.add("10.0.0.1:9100"));
        assert_eq!(table.count(), 1);
    }

    #[test]
    fn removed_peers_can_be_redialed() {
        let table = PeerTable::new();
        table.add("10.0.0.1:9100");
        table.remove("10.0.0.1:9100");
        assert!(!table.contains("10.0.0.1:9100"));
        assert!(table.add("10.0.0.1:9100"));
    }
}
