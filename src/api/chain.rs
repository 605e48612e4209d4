use actix_web::{get, web, HttpResponse, Responder};

use super::models::{AppState, ChainResponse, ChildrenReply, GenesisReply, ShapesReply};
use crate::error::ArtError;

/// Get the full blockchain (debug/observability endpoint).
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let chain = state.chain.read().expect("lock poisoned");
    HttpResponse::Ok().json(ChainResponse {
        length: chain.len(),
        chain: chain.blocks().to_vec(),
    })
}

/// Shape hashes carried by the block with the given hash.
#[get("/shapes/{block_hash}/")]
pub async fn get_shapes(
    state: web::Data<AppState>,
    path: web::Path<(String,)>,
) -> Result<HttpResponse, ArtError> {
    let block_hash = path.into_inner().0;
    let chain = state.chain.read().expect("lock poisoned");
    let block = chain
        .block_by_hash(&block_hash)
        .ok_or(ArtError::InvalidBlockHash(block_hash))?;
    Ok(HttpResponse::Ok().json(ShapesReply {
        shape_hashes: block.ops.iter().map(|op| op.shape_hash.clone()).collect(),
    }))
}

/// The configured genesis block hash.
#[get("/genesis/")]
pub async fn get_genesis_block(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(GenesisReply {
        block_hash: state.settings.genesis_block_hash.clone(),
    })
}

/// Hashes of the blocks whose `prev_hash` is the given hash.
#[get("/children/{block_hash}/")]
pub async fn get_children(
    state: web::Data<AppState>,
    path: web::Path<(String,)>,
) -> Result<HttpResponse, ArtError> {
    let block_hash = path.into_inner().0;
    let chain = state.chain.read().expect("lock poisoned");
    let block_hashes = chain
        .children(&block_hash, &state.settings)
        .ok_or(ArtError::InvalidBlockHash(block_hash))?;
    Ok(HttpResponse::Ok().json(ChildrenReply { block_hashes }))
}
