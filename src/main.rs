mod api;
mod blockchain;
mod canvas;
mod error;
mod miner;
mod peer;
mod render;
mod settings;
mod svg;
mod wallet;

use std::env;
use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use dotenvy::dotenv;
use log::{info, warn};

use api::AppState;
use peer::{DirectoryClient, MinerInfo};
use settings::MinerNetSettings;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let art_port: u16 = env::var("ART_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080);
    let miner_port: u16 = env::var("MINER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(9100);
    let directory_addr = env::var("DIRECTORY_ADDR").ok();

    let keys = match wallet::load_or_generate(env::var("MINER_PRIVATE_KEY").ok()) {
        Ok(keys) => keys,
        Err(e) => {
            eprintln!("bad MINER_PRIVATE_KEY: {e}");
            std::process::exit(1);
        }
    };
    info!("miner identity {}", keys.public_key_hex);

    let miner_addr = format!("{host}:{miner_port}");

    // Register with the directory for network settings, or run standalone.
    let directory = directory_addr.map(DirectoryClient::new);
    let net_settings = match &directory {
        Some(dir) => {
            let info = MinerInfo {
                address: miner_addr.clone(),
                public_key: keys.public_key_hex.clone(),
            };
            match dir.register(&info).await {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("directory registration failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        None => {
            warn!("no DIRECTORY_ADDR configured, running standalone with default settings");
            MinerNetSettings::default()
        }
    };

    let state = Arc::new(AppState::new(net_settings, keys, miner_addr));

    miner::spawn_mining_loop(state.clone());
    if let Some(dir) = directory {
        actix_web::rt::spawn(peer::gossip::heartbeat_loop(state.clone(), dir.clone()));
        actix_web::rt::spawn(peer::gossip::connection_monitor(state.clone(), dir));
    }

    info!("art-app API at http://{host}:{art_port}, miner API at http://{host}:{miner_port}");

    let art_data = web::Data::from(state.clone());
    let peer_data = art_data.clone();

    let peer_server = HttpServer::new(move || {
        App::new()
            .app_data(peer_data.clone())
            // whole chains arrive on this surface
            .app_data(web::JsonConfig::default().limit(16 * 1024 * 1024))
            .configure(peer::init_routes)
    })
    .bind((host.as_str(), miner_port))?
    .run();
    actix_web::rt::spawn(peer_server);

    HttpServer::new(move || {
        App::new()
            .app_data(art_data.clone())
            .configure(api::init_routes)
    })
    .bind((host.as_str(), art_port))?
    .run()
    .await
}
