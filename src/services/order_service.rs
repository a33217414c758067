use crate::entities::{LicenseType, PaymentMethod, PaymentStatus, order_entity as orders};
use crate::error::{AppError, AppResult};
use crate::external::ImageCatalog;
use crate::middlewares::AuthUser;
use crate::models::{
    CreateOrderRequest, DownloadResponse, OrderQuery, OrderResponse, PaginatedResponse,
    PaginationParams,
};
use crate::services::{SubscriptionService, WalletService};
use crate::utils::generate_unique_order_number;
use chrono::{Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

/// License price in centimes. The table is fixed; plans and wallets carry
/// the currency.
pub fn license_price(license_type: &LicenseType) -> i64 {
    match license_type {
        LicenseType::Standard => 50_000,
        LicenseType::Extended => 150_000,
        LicenseType::Exclusive => 500_000,
    }
}

#[derive(Clone)]
pub struct OrderService {
    pool: DatabaseConnection,
    wallet_service: WalletService,
    subscription_service: SubscriptionService,
    catalog: Arc<dyn ImageCatalog>,
}

impl OrderService {
    pub fn new(
        pool: DatabaseConnection,
        wallet_service: WalletService,
        subscription_service: SubscriptionService,
        catalog: Arc<dyn ImageCatalog>,
    ) -> Self {
        Self {
            pool,
            wallet_service,
            subscription_service,
            catalog,
        }
    }

    /// Creates the order, then settles payment. The pending order commits
    /// first so a failed payment leaves an auditable `failed` row instead of
    /// nothing.
    pub async fn create_order(
        &self,
        user: &AuthUser,
        req: CreateOrderRequest,
    ) -> AppResult<OrderResponse> {
        if req.payment_method == PaymentMethod::Manual {
            return Err(AppError::ValidationError(
                "Payment method must be wallet or subscription".to_string(),
            ));
        }

        let image = self.catalog.fetch_image(req.image_id).await?;
        let amount = license_price(&req.license_type);
        let order_number = generate_unique_order_number(&self.pool).await?;

        let now = Utc::now();
        let order = orders::ActiveModel {
            order_number: Set(order_number),
            user_id: Set(user.id),
            user_email: Set(user.email.clone()),
            image_id: Set(req.image_id),
            image_filename: Set(image.filename),
            license_type: Set(req.license_type),
            amount: Set(amount),
            currency: Set("DZD".to_string()),
            payment_method: Set(req.payment_method.clone()),
            payment_status: Set(PaymentStatus::Pending),
            download_token: Set(Uuid::new_v4().to_string()),
            download_count: Set(0),
            max_downloads: Set(3),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        match self.settle_payment(user, &order).await {
            Ok(paid) => Ok(OrderResponse::from(paid)),
            Err(err) => {
                self.mark_failed(order.id).await;
                Err(err)
            }
        }
    }

    async fn settle_payment(
        &self,
        user: &AuthUser,
        order: &orders::Model,
    ) -> AppResult<orders::Model> {
        match order.payment_method {
            PaymentMethod::Wallet => self.settle_from_wallet(user, order).await,
            PaymentMethod::Subscription => self.settle_from_subscription(user, order).await,
            PaymentMethod::Manual => Err(AppError::ValidationError(
                "Payment method must be wallet or subscription".to_string(),
            )),
        }
    }

    /// Debit and paid flip commit together: the order is never `paid`
    /// without the debit, and never vice versa.
    async fn settle_from_wallet(
        &self,
        user: &AuthUser,
        order: &orders::Model,
    ) -> AppResult<orders::Model> {
        let txn = self.pool.begin().await?;
        let wallet = self
            .wallet_service
            .get_or_create_in(&txn, user.id, &user.email)
            .await?;
        self.wallet_service
            .debit_in(
                &txn,
                wallet.id,
                order.amount,
                format!("Order: {}", order.order_number),
                Some(order.order_number.clone()),
            )
            .await?;
        let order = self.mark_paid_in(&txn, order.id, None).await?;
        txn.commit().await?;
        Ok(order)
    }

    /// The active lookup runs outside the payment transaction: a lapsed
    /// subscription stays expired even when the payment then fails. Credit
    /// consumption and the paid flip still commit together.
    async fn settle_from_subscription(
        &self,
        user: &AuthUser,
        order: &orders::Model,
    ) -> AppResult<orders::Model> {
        let (sub, plan) = self
            .subscription_service
            .find_active_for_payment(&self.pool, user.id)
            .await?;
        if !sub.has_credits(&plan.quota_type) {
            return Err(AppError::InsufficientCredits);
        }

        let txn = self.pool.begin().await?;
        self.subscription_service
            .consume_credit(&txn, sub.id, &plan.quota_type)
            .await?;
        let order = self
            .mark_paid_in(&txn, order.id, Some(format!("Subscription: {}", sub.id)))
            .await?;
        txn.commit().await?;
        Ok(order)
    }

    /// Guarded pending -> paid flip; stamps the 24h download window.
    async fn mark_paid_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        order_id: i64,
        payment_reference: Option<String>,
    ) -> AppResult<orders::Model> {
        let now = Utc::now();
        let updated = orders::Entity::update_many()
            .col_expr(
                orders::Column::PaymentStatus,
                Expr::value(PaymentStatus::Paid),
            )
            .col_expr(
                orders::Column::PaymentReference,
                Expr::value(payment_reference),
            )
            .col_expr(orders::Column::CompletedAt, Expr::value(Some(now)))
            .col_expr(
                orders::Column::DownloadExpiresAt,
                Expr::value(Some(now + Duration::hours(24))),
            )
            .col_expr(orders::Column::UpdatedAt, Expr::value(now))
            .filter(orders::Column::Id.eq(order_id))
            .filter(orders::Column::PaymentStatus.eq(PaymentStatus::Pending))
            .exec(conn)
            .await?;
        if updated.rows_affected == 0 {
            return Err(AppError::InvalidStateTransition(
                "Order is no longer pending".to_string(),
            ));
        }

        orders::Entity::find_by_id(order_id)
            .one(conn)
            .await?
            .ok_or_else(|| {
                AppError::TransactionFailed("Order row vanished during payment".to_string())
            })
    }

    /// Best effort; the business error from the payment attempt is what the
    /// caller sees either way.
    async fn mark_failed(&self, order_id: i64) {
        let res = orders::Entity::update_many()
            .col_expr(
                orders::Column::PaymentStatus,
                Expr::value(PaymentStatus::Failed),
            )
            .col_expr(orders::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(orders::Column::Id.eq(order_id))
            .filter(orders::Column::PaymentStatus.eq(PaymentStatus::Pending))
            .exec(&self.pool)
            .await;
        if let Err(err) = res {
            log::error!("Failed to mark order {order_id} as failed: {err}");
        }
    }

    /// Redeems a download token. The ceiling lives in the UPDATE predicate,
    /// so two concurrent redemptions cannot both take the last slot.
    pub async fn redeem_download(&self, token: &str) -> AppResult<DownloadResponse> {
        let order = orders::Entity::find()
            .filter(orders::Column::DownloadToken.eq(token))
            .one(&self.pool)
            .await?
            .ok_or(AppError::TokenNotFound)?;

        let now = Utc::now();
        if !order.is_download_valid_at(now) {
            return Err(AppError::DownloadNotAuthorized);
        }

        let updated = orders::Entity::update_many()
            .col_expr(
                orders::Column::DownloadCount,
                Expr::col(orders::Column::DownloadCount).add(1),
            )
            .col_expr(orders::Column::UpdatedAt, Expr::value(now))
            .filter(orders::Column::Id.eq(order.id))
            .filter(orders::Column::PaymentStatus.eq(PaymentStatus::Paid))
            .filter(
                Expr::col(orders::Column::DownloadCount)
                    .lt(Expr::col(orders::Column::MaxDownloads)),
            )
            .exec(&self.pool)
            .await?;
        if updated.rows_affected == 0 {
            return Err(AppError::DownloadNotAuthorized);
        }

        let order = orders::Entity::find_by_id(order.id)
            .one(&self.pool)
            .await?
            .ok_or(AppError::TokenNotFound)?;
        Ok(DownloadResponse {
            message: "Download authorized".to_string(),
            image_id: order.image_id,
            image_filename: order.image_filename.clone(),
            downloads_remaining: order.remaining_downloads(),
        })
    }

    pub async fn list_my_orders(
        &self,
        user: &AuthUser,
        query: &OrderQuery,
    ) -> AppResult<PaginatedResponse<OrderResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let mut finder = orders::Entity::find().filter(orders::Column::UserId.eq(user.id));
        if let Some(status) = &query.status {
            finder = finder.filter(orders::Column::PaymentStatus.eq(status.clone()));
        }

        let total = finder.clone().count(&self.pool).await? as i64;
        let rows = finder
            .order_by_desc(orders::Column::CreatedAt)
            .offset(params.get_offset() as u64)
            .limit(params.get_limit() as u64)
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(
            rows.into_iter().map(OrderResponse::from).collect(),
            params.get_page(),
            params.get_limit(),
            total,
        ))
    }
}
