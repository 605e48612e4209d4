pub mod directory;
pub mod gossip;
pub mod routes;
pub mod table;

pub use directory::{DirectoryClient, MinerInfo};
pub use table::PeerTable;

use actix_web::web::{self, ServiceConfig};

/// Register the miner-to-miner API under `/miner`.
pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/miner")
            .service(routes::send_block_chain)
            .service(routes::establish_reverse_rpc)
            .service(routes::ping),
    );
}
