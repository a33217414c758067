use crate::entities::{TopupStatus, topup_request_entity as topups};
use crate::error::{AppError, AppResult};
use crate::middlewares::AuthUser;
use crate::models::{
    CreateTopupRequest, PaginatedResponse, PaginationParams, TopupQuery, TopupResponse,
    WalletResponse,
};
use crate::services::WalletService;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

#[derive(Clone)]
pub struct TopupService {
    pool: DatabaseConnection,
    wallet_service: WalletService,
}

impl TopupService {
    pub fn new(pool: DatabaseConnection, wallet_service: WalletService) -> Self {
        Self {
            pool,
            wallet_service,
        }
    }

    pub async fn create(
        &self,
        user: &AuthUser,
        req: CreateTopupRequest,
    ) -> AppResult<TopupResponse> {
        if req.amount <= 0 {
            return Err(AppError::ValidationError("Invalid amount".to_string()));
        }

        let now = Utc::now();
        let topup = topups::ActiveModel {
            user_id: Set(user.id),
            user_email: Set(user.email.clone()),
            amount: Set(req.amount),
            currency: Set("DZD".to_string()),
            payment_method: Set(req.payment_method.unwrap_or_default()),
            payment_reference: Set(req.payment_reference),
            status: Set(TopupStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        Ok(TopupResponse::from(topup))
    }

    /// Credits the wallet and closes the request in one transaction. The
    /// pending -> completed flip is a conditional UPDATE, so a replayed
    /// approval cannot credit twice.
    pub async fn approve(
        &self,
        admin: &AuthUser,
        topup_id: i64,
        admin_notes: Option<String>,
    ) -> AppResult<(TopupResponse, WalletResponse)> {
        let txn = self.pool.begin().await?;

        let topup = topups::Entity::find_by_id(topup_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Top-up request not found".to_string()))?;

        let now = Utc::now();
        let claimed = topups::Entity::update_many()
            .col_expr(topups::Column::Status, Expr::value(TopupStatus::Completed))
            .col_expr(topups::Column::AdminNotes, Expr::value(admin_notes))
            .col_expr(topups::Column::ProcessedById, Expr::value(Some(admin.id)))
            .col_expr(
                topups::Column::ProcessedByEmail,
                Expr::value(Some(admin.email.clone())),
            )
            .col_expr(topups::Column::ProcessedAt, Expr::value(Some(now)))
            .col_expr(topups::Column::UpdatedAt, Expr::value(now))
            .filter(topups::Column::Id.eq(topup.id))
            .filter(topups::Column::Status.eq(TopupStatus::Pending))
            .exec(&txn)
            .await?;
        if claimed.rows_affected == 0 {
            return Err(AppError::InvalidStateTransition(
                "Only pending requests can be approved".to_string(),
            ));
        }

        let wallet = self
            .wallet_service
            .get_or_create_in(&txn, topup.user_id, &topup.user_email)
            .await?;
        let wallet = self
            .wallet_service
            .credit_in(
                &txn,
                wallet.id,
                topup.amount,
                format!("Top-up: {}", topup.id),
                Some(format!("topup:{}", topup.id)),
            )
            .await?;

        let topup = topups::Entity::find_by_id(topup.id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Top-up request not found".to_string()))?;
        txn.commit().await?;

        Ok((TopupResponse::from(topup), WalletResponse::from(wallet)))
    }

    pub async fn reject(
        &self,
        admin: &AuthUser,
        topup_id: i64,
        admin_notes: Option<String>,
    ) -> AppResult<TopupResponse> {
        self.close(
            topup_id,
            TopupStatus::Rejected,
            "Only pending requests can be rejected",
            Some(admin),
            admin_notes,
        )
        .await
    }

    /// Owners may withdraw their own request while it is still pending.
    pub async fn cancel(&self, user: &AuthUser, topup_id: i64) -> AppResult<TopupResponse> {
        let topup = topups::Entity::find_by_id(topup_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Top-up request not found".to_string()))?;
        if topup.user_id != user.id {
            return Err(AppError::PermissionDenied);
        }

        self.close(
            topup_id,
            TopupStatus::Cancelled,
            "Only pending requests can be cancelled",
            None,
            None,
        )
        .await
    }

    /// Terminal transitions without a balance effect. The status predicate
    /// sits in the UPDATE so a close racing an approval loses cleanly.
    async fn close(
        &self,
        topup_id: i64,
        target: TopupStatus,
        guard_message: &str,
        processed_by: Option<&AuthUser>,
        admin_notes: Option<String>,
    ) -> AppResult<TopupResponse> {
        topups::Entity::find_by_id(topup_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Top-up request not found".to_string()))?;

        let now = Utc::now();
        let mut update = topups::Entity::update_many()
            .col_expr(topups::Column::Status, Expr::value(target))
            .col_expr(topups::Column::UpdatedAt, Expr::value(now))
            .filter(topups::Column::Id.eq(topup_id))
            .filter(topups::Column::Status.eq(TopupStatus::Pending));
        if let Some(admin) = processed_by {
            update = update
                .col_expr(topups::Column::ProcessedById, Expr::value(Some(admin.id)))
                .col_expr(
                    topups::Column::ProcessedByEmail,
                    Expr::value(Some(admin.email.clone())),
                )
                .col_expr(topups::Column::ProcessedAt, Expr::value(Some(now)));
        }
        if admin_notes.is_some() {
            update = update.col_expr(topups::Column::AdminNotes, Expr::value(admin_notes));
        }

        let closed = update.exec(&self.pool).await?;
        if closed.rows_affected == 0 {
            return Err(AppError::InvalidStateTransition(guard_message.to_string()));
        }

        let topup = topups::Entity::find_by_id(topup_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Top-up request not found".to_string()))?;
        Ok(TopupResponse::from(topup))
    }

    pub async fn list_my(
        &self,
        user: &AuthUser,
        query: &TopupQuery,
    ) -> AppResult<PaginatedResponse<TopupResponse>> {
        self.list_page(query, Some(user.id), None).await
    }

    /// Admin review queue, pending by default.
    pub async fn list_pending(
        &self,
        query: &TopupQuery,
    ) -> AppResult<PaginatedResponse<TopupResponse>> {
        self.list_page(query, None, Some(TopupStatus::Pending)).await
    }

    async fn list_page(
        &self,
        query: &TopupQuery,
        user_id: Option<i64>,
        default_status: Option<TopupStatus>,
    ) -> AppResult<PaginatedResponse<TopupResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let mut finder = topups::Entity::find();
        if let Some(user_id) = user_id {
            finder = finder.filter(topups::Column::UserId.eq(user_id));
        }
        if let Some(status) = query.status.clone().or(default_status) {
            finder = finder.filter(topups::Column::Status.eq(status));
        }

        let total = finder.clone().count(&self.pool).await? as i64;
        let rows = finder
            .order_by_desc(topups::Column::CreatedAt)
            .offset(params.get_offset() as u64)
            .limit(params.get_limit() as u64)
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(
            rows.into_iter().map(TopupResponse::from).collect(),
            params.get_page(),
            params.get_limit(),
            total,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;
    use crate::entities::{user_wallet_entity as wallets, wallet_transaction_entity as wallet_txs};
    use crate::middlewares::Role;

    fn buyer() -> AuthUser {
        AuthUser {
            id: 7,
            email: "buyer@example.com".to_string(),
            role: Role::Customer,
        }
    }

    fn admin() -> AuthUser {
        AuthUser {
            id: 1,
            email: "admin@example.com".to_string(),
            role: Role::Admin,
        }
    }

    async fn setup() -> (DatabaseConnection, TopupService, WalletService) {
        let pool = test_pool().await;
        let wallet_service = WalletService::new(pool.clone());
        let service = TopupService::new(pool.clone(), wallet_service.clone());
        (pool, service, wallet_service)
    }

    fn topup_request(amount: i64) -> CreateTopupRequest {
        CreateTopupRequest {
            amount,
            payment_method: Some("cib".to_string()),
            payment_reference: Some("CIB-2025-0042".to_string()),
        }
    }

    #[tokio::test]
    async fn approve_credits_the_wallet_once() {
        let (pool, service, wallet_service) = setup().await;
        let topup = service.create(&buyer(), topup_request(100_000)).await.unwrap();

        let (approved, wallet) = service
            .approve(&admin(), topup.id, Some("receipt checked".to_string()))
            .await
            .unwrap();
        assert_eq!(approved.status, TopupStatus::Completed);
        assert_eq!(approved.processed_by_email.as_deref(), Some("admin@example.com"));
        assert!(approved.processed_at.is_some());
        assert_eq!(wallet.balance, 100_000);

        // replaying the approval must not credit again
        let err = service.approve(&admin(), topup.id, None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidStateTransition(_)));

        let wallet = wallet_service.get_or_create(&buyer()).await.unwrap();
        assert_eq!(wallet.balance, 100_000);
        let ledger = wallet_txs::Entity::find()
            .filter(wallet_txs::Column::WalletId.eq(wallet.id))
            .all(&pool)
            .await
            .unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].description, format!("Top-up: {}", topup.id));
    }

    #[tokio::test]
    async fn approve_creates_the_wallet_when_missing() {
        let (pool, service, _) = setup().await;
        let topup = service.create(&buyer(), topup_request(25_000)).await.unwrap();

        let (_, wallet) = service.approve(&admin(), topup.id, None).await.unwrap();
        assert_eq!(wallet.balance, 25_000);

        let stored = wallets::Entity::find_by_id(wallet.id)
            .one(&pool)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.user_email, "buyer@example.com");
    }

    #[tokio::test]
    async fn reject_leaves_no_balance_effect() {
        let (_, service, wallet_service) = setup().await;
        let topup = service.create(&buyer(), topup_request(50_000)).await.unwrap();

        let rejected = service
            .reject(&admin(), topup.id, Some("no matching deposit".to_string()))
            .await
            .unwrap();
        assert_eq!(rejected.status, TopupStatus::Rejected);
        assert_eq!(rejected.admin_notes.as_deref(), Some("no matching deposit"));

        let wallet = wallet_service.get_or_create(&buyer()).await.unwrap();
        assert_eq!(wallet.balance, 0);

        // rejected is terminal
        let err = service.approve(&admin(), topup.id, None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidStateTransition(_)));
    }

    #[tokio::test]
    async fn owner_can_cancel_only_their_own_pending_request() {
        let (_, service, _) = setup().await;
        let topup = service.create(&buyer(), topup_request(10_000)).await.unwrap();

        let stranger = AuthUser {
            id: 99,
            email: "stranger@example.com".to_string(),
            role: Role::Customer,
        };
        let err = service.cancel(&stranger, topup.id).await.unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied));

        let cancelled = service.cancel(&buyer(), topup.id).await.unwrap();
        assert_eq!(cancelled.status, TopupStatus::Cancelled);
        assert!(cancelled.processed_at.is_none());

        let err = service.cancel(&buyer(), topup.id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidStateTransition(_)));
    }

    #[tokio::test]
    async fn create_rejects_non_positive_amounts() {
        let (_, service, _) = setup().await;
        let err = service.create(&buyer(), topup_request(0)).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        let err = service.create(&buyer(), topup_request(-100)).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn listings_split_by_owner_and_status() {
        let (_, service, _) = setup().await;
        let other = AuthUser {
            id: 8,
            email: "other@example.com".to_string(),
            role: Role::Customer,
        };
        service.create(&buyer(), topup_request(10_000)).await.unwrap();
        let second = service.create(&buyer(), topup_request(20_000)).await.unwrap();
        service.create(&other, topup_request(30_000)).await.unwrap();

        let query = TopupQuery {
            page: None,
            per_page: None,
            status: None,
        };
        let mine = service.list_my(&buyer(), &query).await.unwrap();
        assert_eq!(mine.total, 2);

        let pending = service.list_pending(&query).await.unwrap();
        assert_eq!(pending.total, 3);

        service.approve(&admin(), second.id, None).await.unwrap();
        let pending = service.list_pending(&query).await.unwrap();
        assert_eq!(pending.total, 2);

        let completed = service
            .list_my(
                &buyer(),
                &TopupQuery {
                    page: None,
                    per_page: None,
                    status: Some(TopupStatus::Completed),
                },
            )
            .await
            .unwrap();
        assert_eq!(completed.total, 1);
        assert_eq!(completed.data[0].id, second.id);
    }
}
