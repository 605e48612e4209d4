use std::time::Duration;

use actix_web::{get, post, web, HttpResponse};
use log::{debug, info};

use super::models::{
    AddShapeReply, AddShapeRequest, AppState, DeleteShapeReply, DeleteShapeRequest, SvgStringReply,
};
use crate::blockchain::{OpKind, Operation};
use crate::error::ArtError;
use crate::svg::{rasterize, MAX_SVG_LEN};

const CONFIRM_POLL: Duration = Duration::from_millis(500);

/// Block until the op is included above the tip observed at submission and
/// `validate_num` further blocks follow it. Returns the including block's
/// hash and the miner's balance at confirmation time.
///
/// A dropped client connection cancels the wait; the op itself stays
/// queued and may still confirm.
async fn await_confirmation(
    state: &AppState,
    kind: OpKind,
    shape_hash: &str,
    submitted_at: u64,
    validate_num: u64,
) -> Result<(String, u32), ArtError> {
    loop {
        if let Some(err) = state.mempool.take_rejection(kind, shape_hash) {
            return Err(err);
        }
        {
            let chain = state.chain.read().expect("lock poisoned");
            if let Some((pos, _)) = chain.find_op(kind, shape_hash) {
                let included = chain.blocks()[pos].index;
                if included > submitted_at && chain.tip_index() >= included + validate_num {
                    let block_hash = chain
                        .hash_at(pos)
                        .expect("found block has a cached hash")
                        .to_string();
                    let ink = chain.ink_remain(&state.keys.public_key_hex);
                    return Ok((block_hash, ink));
                }
            }
        }
        actix_web::rt::time::sleep(CONFIRM_POLL).await;
    }
}

/// Validate a shape against the current tip, queue it for mining and wait
/// for confirmation.
#[post("/shape/add/")]
pub async fn add_shape(
    state: web::Data<AppState>,
    body: web::Json<AddShapeRequest>,
) -> Result<HttpResponse, ArtError> {
    let req = body.into_inner();
    if req.svg.len() > MAX_SVG_LEN {
        return Err(ArtError::ShapeSvgStringTooLong(req.svg));
    }
    if req.fill == "transparent" && req.stroke == "transparent" {
        return Err(ArtError::InvalidShapeSvgString(
            "fill and stroke can't both be transparent".into(),
        ));
    }

    let miner_key = state.keys.public_key_hex.clone();
    let (submitted_at, tip_state) = {
        let chain = state.chain.read().expect("lock poisoned");
        (chain.tip_index(), chain.tip_state())
    };

    let raster = rasterize(&req.svg, &req.fill, &state.settings.canvas_settings)?;
    tip_state.canvas.check_shape(&raster.pixels, &miner_key)?;
    if raster.ink > tip_state.ink_remain(&miner_key) {
        return Err(ArtError::InsufficientInk(raster.ink));
    }

    let op = Operation::add(req.svg, req.fill, req.stroke, &miner_key, req.art_node_key);
    let shape_hash = op.shape_hash.clone();
    debug!(
        "queueing add {} ({:?}, cost {}, validate_num {})",
        shape_hash, req.shape_type, raster.ink, req.validate_num
    );
    state.mempool.push(op);

    let (block_hash, ink_remaining) =
        await_confirmation(&state, OpKind::Add, &shape_hash, submitted_at, req.validate_num).await?;
    info!("shape {shape_hash} confirmed in block {block_hash}");
    Ok(HttpResponse::Ok().json(AddShapeReply {
        shape_hash,
        block_hash,
        ink_remaining,
    }))
}

/// Queue a delete of a live shape owned by the requesting art node.
#[post("/shape/delete/")]
pub async fn delete_shape(
    state: web::Data<AppState>,
    body: web::Json<DeleteShapeRequest>,
) -> Result<HttpResponse, ArtError> {
    let req = body.into_inner();
    let (submitted_at, tip_state) = {
        let chain = state.chain.read().expect("lock poisoned");
        (chain.tip_index(), chain.tip_state())
    };

    let shape = tip_state
        .live
        .get(&req.shape_hash)
        .ok_or_else(|| ArtError::InvalidShapeHash(req.shape_hash.clone()))?;
    if shape.art_node_key != req.art_node_key {
        return Err(ArtError::ShapeOwner(req.shape_hash));
    }

    let op = Operation::delete(req.shape_hash.clone(), req.art_node_key);
    debug!("queueing delete {}", req.shape_hash);
    state.mempool.push(op);

    let (_, ink_remaining) = await_confirmation(
        &state,
        OpKind::Delete,
        &req.shape_hash,
        submitted_at,
        req.validate_num,
    )
    .await?;
    Ok(HttpResponse::Ok().json(DeleteShapeReply { ink_remaining }))
}

/// Look up the svg element recorded for a shape hash.
#[get("/svg/{shape_hash}/")]
pub async fn get_svg_string(
    state: web::Data<AppState>,
    path: web::Path<(String,)>,
) -> Result<HttpResponse, ArtError> {
    let shape_hash = path.into_inner().0;
    let chain = state.chain.read().expect("lock poisoned");
    let svg_string = chain
        .tip_state_ref()
        .and_then(|s| s.find_svg_element(&shape_hash))
        .map(str::to_string)
        .ok_or(ArtError::InvalidShapeHash(shape_hash))?;
    Ok(HttpResponse::Ok().json(SvgStringReply { svg_string }))
}
