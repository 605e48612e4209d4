use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};

use super::directory::DirectoryClient;
use super::routes::ReverseRequest;
use crate::api::models::AppState;

/// Seconds between chain pushes on an established peer link.
const GOSSIP_INTERVAL: Duration = Duration::from_secs(5);
/// How often the monitor checks whether we are below the connection floor.
const MONITOR_INTERVAL: Duration = Duration::from_secs(10);

/// Dial a peer: claim its table slot, ask it to connect back, then gossip
/// until the link dies. Dialing an already-connected peer is a no-op.
pub async fn connect_to_peer(app: Arc<AppState>, addr: String) {
    if addr == app.miner_addr || !app.peers.add(&addr) {
        return;
    }

    let client = reqwest::Client::new();
    let reverse = client
        .post(format!("http://{addr}/miner/reverse/"))
        .json(&ReverseRequest {
            address: app.miner_addr.clone(),
        })
        .send()
        .await
        .and_then(|r| r.error_for_status());
    if let Err(e) = reverse {
        warn!("could not reach peer {addr}: {e}");
        app.peers.remove(&addr);
        return;
    }

    info!("peer link established with {addr}");
    gossip_loop(app, addr, client).await;
}

/// Periodically push our whole chain to the other side; the receiver runs
/// fork-choice. Any transport error tears the link down.
async fn gossip_loop(app: Arc<AppState>, addr: String, client: reqwest::Client) {
    loop {
        actix_web::rt::time::sleep(GOSSIP_INTERVAL).await;

        let blocks = {
            let chain = app.chain.read().expect("lock poisoned");
            chain.blocks().to_vec()
        };
        debug!("pushing chain of length {} to {addr}", blocks.len());
        let push = client
            .post(format!("http://{addr}/miner/chain/"))
            .json(&blocks)
            .send()
            .await
            .and_then(|r| r.error_for_status());
        if let Err(e) = push {
            warn!("peer link {addr} failed: {e}");
            app.peers.remove(&addr);
            return;
        }
    }
}

/// Keep the peer count at or above the configured floor by asking the
/// directory for more nodes and dialing the new ones.
pub async fn connection_monitor(app: Arc<AppState>, directory: DirectoryClient) {
    loop {
        actix_web::rt::time::sleep(MONITOR_INTERVAL).await;

        let connected = app.peers.count();
        if connected >= app.settings.min_num_miner_connections as usize {
            continue;
        }
        debug!(
            "{connected} peers connected, below the floor of {}",
            app.settings.min_num_miner_connections
        );
        match directory.get_nodes(&app.keys.public_key_hex).await {
            Ok(addrs) => {
                for addr in addrs {
                    actix_web::rt::spawn(connect_to_peer(app.clone(), addr));
                }
            }
            Err(e) => warn!("directory GetNodes failed: {e}"),
        }
    }
}

/// Heartbeat the directory at a twentieth of the allowed interval. A
/// missed heartbeat means the directory has dropped us -- that is fatal.
pub async fn heartbeat_loop(app: Arc<AppState>, directory: DirectoryClient) {
    let interval = Duration::from_millis((app.settings.heart_beat / 20).max(1));
    loop {
        actix_web::rt::time::sleep(interval).await;
        if let Err(e) = directory.heart_beat(&app.keys.public_key_hex).await {
            error!("late heartbeat, exiting: {e}");
            std::process::exit(1);
        }
    }
}
