use crate::middleware::ClientIp;
use actix_web::HttpResponse;
use serde_json::json;

/// Echo the address the request appears to come from
pub async fn client_ip(ip: ClientIp) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "ip": ip.0 }))
}
