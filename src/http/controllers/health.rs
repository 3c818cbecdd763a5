use actix_web::HttpResponse;
use chrono::Utc;
use serde_json::json;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "gatehouse",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
