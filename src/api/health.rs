use actix_web::{get, HttpResponse, Responder};

#[get("/health/")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("ink miner is up and running")
}
