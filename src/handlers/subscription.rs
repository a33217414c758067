use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::error::AppError;
use crate::middlewares::current_user;
use crate::models::*;
use crate::services::SubscriptionService;

#[utoipa::path(
    get,
    path = "/plans",
    tag = "subscription",
    responses(
        (status = 200, description = "Active subscription plans in catalog order")
    )
)]
pub async fn list_plans(
    subscription_service: web::Data<SubscriptionService>,
) -> Result<HttpResponse> {
    match subscription_service.list_plans().await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/subscriptions/subscribe",
    tag = "subscription",
    request_body = SubscribeRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Pending subscription created", body = SubscriptionResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Plan not found or inactive")
    )
)]
pub async fn subscribe(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    request: web::Json<SubscribeRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match subscription_service.subscribe(&user, request.plan_id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response,
            "message": "Subscription request created. Admin approval required."
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions",
    tag = "subscription",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Subscriptions of the current user, newest first"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_subscriptions(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match subscription_service.list_my(&user).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/subscriptions/{id}/approve",
    tag = "subscription",
    request_body = ApproveSubscriptionRequest,
    params(
        ("id" = i64, Path, description = "Subscription id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Subscription activated", body = SubscriptionResponse),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Subscription not found"),
        (status = 409, description = "Subscription is not pending")
    )
)]
pub async fn approve_subscription(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<ApproveSubscriptionRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    if !user.is_admin() {
        return Ok(AppError::PermissionDenied.error_response());
    }

    let sub_id = path.into_inner();
    let notes = request.into_inner().admin_notes;

    match subscription_service.approve(&user, sub_id, notes).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response,
            "message": "Subscription approved"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn subscription_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/plans").route("", web::get().to(list_plans)))
        .service(
            web::scope("/subscriptions")
                .route("", web::get().to(my_subscriptions))
                .route("/subscribe", web::post().to(subscribe))
                .route("/{id}/approve", web::post().to(approve_subscription)),
        );
}
