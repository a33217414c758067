use actix_web::{HttpResponse, Result, web};
use log::{error, info};
use serde_json::json;

use crate::services::PaymentLogService;

/// Provider payment callback. The body is stored verbatim as a payment log
/// entry; reconciliation against orders and top-ups happens offline.
pub async fn payment_webhook(
    payment_log_service: web::Data<PaymentLogService>,
    path: web::Path<String>,
    payload: web::Json<serde_json::Value>,
) -> Result<HttpResponse> {
    let provider = path.into_inner();
    info!("Received payment webhook from provider: {provider}");

    match payment_log_service
        .record_webhook(&provider, payload.into_inner())
        .await
    {
        Ok(entry) => Ok(HttpResponse::Ok().json(json!({
            "received": true,
            "log_id": entry.id
        }))),
        Err(e) => {
            error!("Failed to store webhook payload from {provider}: {e}");
            Ok(HttpResponse::InternalServerError().json(json!({
                "received": false
            })))
        }
    }
}

pub fn webhook_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/webhook").route("/payment/{provider}", web::post().to(payment_webhook)),
    );
}
