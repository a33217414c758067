use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::middlewares::current_user;
use crate::models::*;
use crate::services::OrderService;

#[utoipa::path(
    post,
    path = "/orders/create",
    tag = "order",
    request_body = CreateOrderRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Order created and paid", body = OrderResponse),
        (status = 400, description = "Payment rejected"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Image not found")
    )
)]
pub async fn create_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    request: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match order_service.create_order(&user, request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response,
            "message": "Order created successfully"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders",
    tag = "order",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Items per page"),
        ("status" = Option<String>, Query, description = "Filter by payment status (pending, paid, failed, cancelled)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Orders of the current user, newest first"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_orders(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    query: web::Query<OrderQuery>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match order_service.list_my_orders(&user, &query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/download/{token}",
    tag = "order",
    params(
        ("token" = String, Path, description = "Download token issued with the order")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Download authorized", body = DownloadResponse),
        (status = 403, description = "Token expired or download limit reached"),
        (status = 404, description = "Unknown token")
    )
)]
pub async fn download(
    order_service: web::Data<OrderService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let token = path.into_inner();

    match order_service.redeem_download(&token).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn order_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::get().to(my_orders))
            .route("/create", web::post().to(create_order))
            .route("/download/{token}", web::get().to(download)),
    );
}
