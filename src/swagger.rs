use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{
    LicenseType, PaymentLogType, PaymentMethod, PaymentStatus, QuotaType, SubscriptionStatus,
    TopupStatus, TransactionType,
};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::wallet::my_wallet,
        handlers::wallet::my_transactions,
        handlers::wallet::create_topup,
        handlers::wallet::my_topups,
        handlers::wallet::approve_topup,
        handlers::wallet::reject_topup,
        handlers::wallet::cancel_topup,
        handlers::subscription::list_plans,
        handlers::subscription::subscribe,
        handlers::subscription::my_subscriptions,
        handlers::subscription::approve_subscription,
        handlers::order::create_order,
        handlers::order::my_orders,
        handlers::order::download,
        handlers::admin::list_wallets,
        handlers::admin::pending_topups,
        handlers::admin::create_plan,
        handlers::admin::payment_logs,
    ),
    components(
        schemas(
            WalletResponse,
            WalletTransactionResponse,
            WalletQuery,
            TransactionType,
            CreateTopupRequest,
            ReviewTopupRequest,
            TopupResponse,
            TopupQuery,
            TopupStatus,
            CreatePlanRequest,
            PlanResponse,
            SubscribeRequest,
            ApproveSubscriptionRequest,
            SubscriptionResponse,
            SubscriptionStatus,
            QuotaType,
            CreateOrderRequest,
            OrderResponse,
            OrderQuery,
            DownloadResponse,
            LicenseType,
            PaymentMethod,
            PaymentStatus,
            PaymentLogResponse,
            PaymentLogQuery,
            PaymentLogType,
            ApiError,
            WalletApiResponse,
            TopupApiResponse,
            SubscriptionApiResponse,
            OrderApiResponse,
            DownloadApiResponse,
            PaginatedOrderResponse,
            PaginatedTopupResponse,
            PaginatedWalletResponse,
            PaginatedPaymentLogResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "wallet", description = "Wallet API"),
        (name = "topup", description = "Top-up request API"),
        (name = "subscription", description = "Subscription plan API"),
        (name = "order", description = "Image order API"),
        (name = "admin", description = "Admin review API"),
    ),
    info(
        title = "Agency Order Service API",
        version = "1.0.0",
        description = "Wallet, subscription and image order REST API documentation",
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
