use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::error::AppError;
use crate::middlewares::current_user;
use crate::models::*;
use crate::services::{TopupService, WalletService};

#[utoipa::path(
    get,
    path = "/wallet",
    tag = "wallet",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Wallet of the current user, created on first access", body = WalletResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_wallet(
    wallet_service: web::Data<WalletService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match wallet_service.get_or_create(&user).await {
        Ok(wallet) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": WalletResponse::from(wallet)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/wallet/transactions",
    tag = "wallet",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Latest ledger entries, newest first"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_transactions(
    wallet_service: web::Data<WalletService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match wallet_service.list_transactions(&user).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/wallet/topup",
    tag = "topup",
    request_body = CreateTopupRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Pending top-up request created", body = TopupResponse),
        (status = 400, description = "Invalid amount"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_topup(
    topup_service: web::Data<TopupService>,
    req: HttpRequest,
    request: web::Json<CreateTopupRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match topup_service.create(&user, request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/wallet/topups",
    tag = "topup",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Items per page"),
        ("status" = Option<String>, Query, description = "Filter by status (pending, completed, rejected, cancelled)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Top-up requests of the current user"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_topups(
    topup_service: web::Data<TopupService>,
    req: HttpRequest,
    query: web::Query<TopupQuery>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match topup_service.list_my(&user, &query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/wallet/topup/{id}/approve",
    tag = "topup",
    request_body = ReviewTopupRequest,
    params(
        ("id" = i64, Path, description = "Top-up request id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Request approved and wallet credited"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is not pending")
    )
)]
pub async fn approve_topup(
    topup_service: web::Data<TopupService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<ReviewTopupRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    if !user.is_admin() {
        return Ok(AppError::PermissionDenied.error_response());
    }

    let topup_id = path.into_inner();
    let notes = request.into_inner().admin_notes;

    match topup_service.approve(&user, topup_id, notes).await {
        Ok((topup, wallet)) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": {
                "topup": topup,
                "wallet": wallet
            },
            "message": "Top-up approved"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/wallet/topup/{id}/reject",
    tag = "topup",
    request_body = ReviewTopupRequest,
    params(
        ("id" = i64, Path, description = "Top-up request id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Request rejected", body = TopupResponse),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is not pending")
    )
)]
pub async fn reject_topup(
    topup_service: web::Data<TopupService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<ReviewTopupRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    if !user.is_admin() {
        return Ok(AppError::PermissionDenied.error_response());
    }

    let topup_id = path.into_inner();
    let notes = request.into_inner().admin_notes;

    match topup_service.reject(&user, topup_id, notes).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response,
            "message": "Top-up rejected"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/wallet/topup/{id}/cancel",
    tag = "topup",
    params(
        ("id" = i64, Path, description = "Top-up request id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Request cancelled", body = TopupResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is not pending")
    )
)]
pub async fn cancel_topup(
    topup_service: web::Data<TopupService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match topup_service.cancel(&user, path.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response,
            "message": "Top-up cancelled"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn wallet_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/wallet")
            .route("", web::get().to(my_wallet))
            .route("/transactions", web::get().to(my_transactions))
            .route("/topup", web::post().to(create_topup))
            .route("/topups", web::get().to(my_topups))
            .route("/topup/{id}/approve", web::post().to(approve_topup))
            .route("/topup/{id}/reject", web::post().to(reject_topup))
            .route("/topup/{id}/cancel", web::post().to(cancel_topup)),
    );
}
