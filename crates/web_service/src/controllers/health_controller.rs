use actix_web::{get, web, HttpResponse, Responder};
use serde_json::json;

/// GET /api/health
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health);
}
