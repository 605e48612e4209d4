use std::collections::HashMap;

use actix_web::{post, web, HttpResponse};

use super::models::{AppState, CloseCanvasReply, ConnectReply, ConnectRequest, InkReply, InkRequest};
use crate::error::ArtError;
use crate::render::render_canvas;

fn check_miner_key(state: &AppState, private_key: &str) -> Result<(), ArtError> {
    if private_key != state.keys.private_key_hex {
        return Err(ArtError::InvalidMinerPk);
    }
    Ok(())
}

/// Open the canvas: the art app proves it holds this miner's private key
/// and learns the canvas dimensions.
#[post("/connect/")]
pub async fn connect(
    state: web::Data<AppState>,
    body: web::Json<ConnectRequest>,
) -> Result<HttpResponse, ArtError> {
    check_miner_key(&state, &body.private_key)?;
    Ok(HttpResponse::Ok().json(ConnectReply {
        canvas_settings: state.settings.canvas_settings,
        valid: true,
    }))
}

/// The miner's ink balance at the current tip.
#[post("/ink/")]
pub async fn get_ink(
    state: web::Data<AppState>,
    body: web::Json<InkRequest>,
) -> Result<HttpResponse, ArtError> {
    check_miner_key(&state, &body.private_key)?;
    let ink_remaining = {
        let chain = state.chain.read().expect("lock poisoned");
        chain.ink_remain(&state.keys.public_key_hex)
    };
    Ok(HttpResponse::Ok().json(InkReply { ink_remaining }))
}

/// Final snapshot: every miner's op log, the caller's remaining ink and
/// the rendered HTML of the live shapes.
#[post("/close/")]
pub async fn close_canvas(state: web::Data<AppState>) -> HttpResponse {
    let tip = {
        let chain = state.chain.read().expect("lock poisoned");
        chain.tip_state()
    };

    let canvas_ops: HashMap<String, Vec<String>> = tip
        .shape_log
        .iter()
        .map(|(miner, entries)| {
            (
                miner.clone(),
                entries.iter().map(|e| e.wire()).collect(),
            )
        })
        .collect();
    let ink_remaining = tip.ink_remain(&state.keys.public_key_hex);
    let html = render_canvas(&tip, &state.settings.canvas_settings);

    HttpResponse::Ok().json(CloseCanvasReply {
        canvas_ops,
        ink_remaining,
        html,
    })
}
