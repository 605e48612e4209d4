use serde::{Deserialize, Serialize};

/// Canvas dimensions shared by every miner on the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSettings {
    #[serde(rename = "canvas-x-max")]
    pub canvas_x_max: u32,
    #[serde(rename = "canvas-y-max")]
    pub canvas_y_max: u32,
}

/// Network settings handed out by the directory at registration time.
///
/// Field names match the directory's JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerNetSettings {
    #[serde(rename = "genesis-block-hash")]
    pub genesis_block_hash: String,

    #[serde(rename = "min-num-miner-connections")]
    pub min_num_miner_connections: u32,

    /// Mining ink reward per op and no-op blocks.
    #[serde(rename = "ink-per-op-block")]
    pub ink_per_op_block: u32,
    #[serde(rename = "ink-per-no-op-block")]
    pub ink_per_no_op_block: u32,

    /// Milliseconds the directory allows between heartbeats.
    #[serde(rename = "heartbeat")]
    pub heart_beat: u64,

    /// Proof-of-work difficulty: trailing hex zeros required of a block hash.
    #[serde(rename = "pow-difficulty-op-block")]
    pub pow_difficulty_op_block: u32,
    #[serde(rename = "pow-difficulty-no-op-block")]
    pub pow_difficulty_no_op_block: u32,

    #[serde(rename = "canvas-settings")]
    pub canvas_settings: CanvasSettings,
}

impl Default for MinerNetSettings {
    /// Standalone-mode defaults used when no directory is configured.
    fn default() -> Self {
        Self {
            genesis_block_hash: "83218ac34c1834c26781fe4bde918ee4".to_string(),
            min_num_miner_connections: 1,
            ink_per_op_block: 50,
            ink_per_no_op_block: 10,
            heart_beat: 2000,
            pow_difficulty_op_block: 3,
            pow_difficulty_no_op_block: 3,
            canvas_settings: CanvasSettings {
                canvas_x_max: 1024,
                canvas_y_max: 1024,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_directory_document() {
        let doc = r#"{
            "genesis-block-hash": "83218ac34c1834c26781fe4bde918ee4",
            "min-num-miner-connections": 3,
            "ink-per-op-block": 50,
            "ink-per-no-op-block": 10,
            "heartbeat": 2500,
            "pow-difficulty-op-block": 5,
            "pow-difficulty-no-op-block": 6,
            "canvas-settings": { "canvas-x-max": 1024, "canvas-y-max": 768 }
        }"#;
        let s: MinerNetSettings = serde_json::from_str(doc).unwrap();
        assert_eq!(s.min_num_miner_connections, 3);
        assert_eq!(s.heart_beat, 2500);
        assert_eq!(s.pow_difficulty_no_op_block, 6);
        assert_eq!(s.canvas_settings.canvas_y_max, 768);
    }

    #[test]
    fn settings_round_trip() {
        let s = MinerNetSettings::default();
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(serde_json::from_str::<MinerNetSettings>(&json).unwrap(), s);
    }
}
