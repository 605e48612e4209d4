use actix_web::{get, post, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use super::gossip;
use crate::api::models::AppState;
use crate::blockchain::Block;
use crate::miner;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReverseRequest {
    pub address: String,
}

#[derive(Serialize)]
struct ReverseReply {
    connected: bool,
}

#[derive(Serialize)]
struct SendChainReply {
    adopted: bool,
}

/// A peer pushed us its chain; run fork-choice on it.
#[post("/chain/")]
pub async fn send_block_chain(
    state: web::Data<AppState>,
    body: web::Json<Vec<Block>>,
) -> impl Responder {
    let adopted = miner::adopt_if_longer(&state, body.into_inner());
    HttpResponse::Ok().json(SendChainReply { adopted })
}

/// A peer asks us to connect back so gossip flows both ways.
#[post("/reverse/")]
pub async fn establish_reverse_rpc(
    state: web::Data<AppState>,
    body: web::Json<ReverseRequest>,
) -> impl Responder {
    let addr = body.into_inner().address;
    let fresh = !state.peers.contains(&addr);
    if fresh {
        let app = state.clone().into_inner();
        actix_web::rt::spawn(gossip::connect_to_peer(app, addr));
    }
    HttpResponse::Ok().json(ReverseReply { connected: fresh })
}

#[get("/ping/")]
pub async fn ping() -> impl Responder {
    HttpResponse::Ok().body("ok")
}
