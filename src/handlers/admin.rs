use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::error::AppError;
use crate::middlewares::current_user;
use crate::models::*;
use crate::services::{PaymentLogService, SubscriptionService, TopupService, WalletService};

#[utoipa::path(
    get,
    path = "/admin/wallets",
    tag = "admin",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Items per page")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "All wallets, newest first"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn list_wallets(
    wallet_service: web::Data<WalletService>,
    req: HttpRequest,
    query: web::Query<WalletQuery>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    if !user.is_admin() {
        return Ok(AppError::PermissionDenied.error_response());
    }

    match wallet_service.list_wallets(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/topups",
    tag = "admin",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Items per page"),
        ("status" = Option<String>, Query, description = "Filter by status, defaults to pending")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Top-up review queue"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn pending_topups(
    topup_service: web::Data<TopupService>,
    req: HttpRequest,
    query: web::Query<TopupQuery>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    if !user.is_admin() {
        return Ok(AppError::PermissionDenied.error_response());
    }

    match topup_service.list_pending(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/plans",
    tag = "admin",
    request_body = CreatePlanRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Plan created", body = PlanResponse),
        (status = 400, description = "Invalid plan or duplicate slug"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn create_plan(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    request: web::Json<CreatePlanRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    if !user.is_admin() {
        return Ok(AppError::PermissionDenied.error_response());
    }

    match subscription_service.create_plan(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/payment-logs",
    tag = "admin",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Items per page"),
        ("provider" = Option<String>, Query, description = "Filter by provider")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Payment log entries, newest first"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn payment_logs(
    payment_log_service: web::Data<PaymentLogService>,
    req: HttpRequest,
    query: web::Query<PaymentLogQuery>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    if !user.is_admin() {
        return Ok(AppError::PermissionDenied.error_response());
    }

    match payment_log_service.list(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/wallets", web::get().to(list_wallets))
            .route("/topups", web::get().to(pending_topups))
            .route("/plans", web::post().to(create_plan))
            .route("/payment-logs", web::get().to(payment_logs)),
    );
}
