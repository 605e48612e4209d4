mod canvas;
mod chain;
mod health;
pub mod models;
mod shapes;

use actix_web::web::{self, ServiceConfig};

pub use models::AppState;

/// Register the art-app API under `/api/v1` (with trailing slash for each
/// endpoint).
pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(health::health_check)
            .service(canvas::connect)
            .service(canvas::get_ink)
            .service(canvas::close_canvas)
            .service(shapes::add_shape)
            .service(shapes::delete_shape)
            .service(shapes::get_svg_string)
            .service(chain::get_chain)
            .service(chain::get_shapes)
            .service(chain::get_genesis_block)
            .service(chain::get_children),
    );
}
