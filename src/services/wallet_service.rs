use crate::entities::{
    TransactionType, user_wallet_entity as wallets, wallet_transaction_entity as wallet_txs,
};
use crate::error::{AppError, AppResult};
use crate::middlewares::AuthUser;
use crate::models::{
    PaginatedResponse, PaginationParams, WalletQuery, WalletResponse, WalletTransactionResponse,
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// How many ledger rows the transactions endpoint returns.
const RECENT_TRANSACTION_LIMIT: u64 = 50;

#[derive(Clone)]
pub struct WalletService {
    pool: DatabaseConnection,
}

impl WalletService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Returns the caller's wallet, creating an empty one on first touch.
    pub async fn get_or_create(&self, user: &AuthUser) -> AppResult<wallets::Model> {
        self.get_or_create_in(&self.pool, user.id, &user.email)
            .await
    }

    pub(crate) async fn get_or_create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: i64,
        user_email: &str,
    ) -> AppResult<wallets::Model> {
        if let Some(wallet) = wallets::Entity::find()
            .filter(wallets::Column::UserId.eq(user_id))
            .one(conn)
            .await?
        {
            return Ok(wallet);
        }

        let now = Utc::now();
        let fresh = wallets::ActiveModel {
            user_id: Set(user_id),
            user_email: Set(user_email.to_string()),
            balance: Set(0),
            currency: Set("DZD".to_string()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        match fresh.insert(conn).await {
            Ok(wallet) => Ok(wallet),
            // lost the create race to a concurrent request, the row exists now
            Err(err) => match wallets::Entity::find()
                .filter(wallets::Column::UserId.eq(user_id))
                .one(conn)
                .await?
            {
                Some(wallet) => Ok(wallet),
                None => Err(err.into()),
            },
        }
    }

    pub async fn credit(
        &self,
        wallet_id: i64,
        amount: i64,
        description: String,
        reference: Option<String>,
    ) -> AppResult<wallets::Model> {
        let txn = self.pool.begin().await?;
        let wallet = self
            .credit_in(&txn, wallet_id, amount, description, reference)
            .await?;
        txn.commit().await?;
        Ok(wallet)
    }

    pub async fn debit(
        &self,
        wallet_id: i64,
        amount: i64,
        description: String,
        reference: Option<String>,
    ) -> AppResult<wallets::Model> {
        let txn = self.pool.begin().await?;
        let wallet = self
            .debit_in(&txn, wallet_id, amount, description, reference)
            .await?;
        txn.commit().await?;
        Ok(wallet)
    }

    /// Adds funds and writes the matching ledger row. Runs on the caller's
    /// connection so approval flows can commit both together.
    pub(crate) async fn credit_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        wallet_id: i64,
        amount: i64,
        description: String,
        reference: Option<String>,
    ) -> AppResult<wallets::Model> {
        if amount <= 0 {
            return Err(AppError::ValidationError("Invalid amount".to_string()));
        }

        let updated = wallets::Entity::update_many()
            .col_expr(
                wallets::Column::Balance,
                Expr::col(wallets::Column::Balance).add(amount),
            )
            .col_expr(wallets::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(wallets::Column::Id.eq(wallet_id))
            .exec(conn)
            .await?;
        if updated.rows_affected == 0 {
            return Err(AppError::NotFound("Wallet not found".to_string()));
        }

        self.record_transaction(
            conn,
            wallet_id,
            TransactionType::Credit,
            amount,
            description,
            reference,
        )
        .await
    }

    /// Spends funds. The balance check lives in the UPDATE predicate itself,
    /// so two concurrent debits cannot both get past the balance.
    pub(crate) async fn debit_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        wallet_id: i64,
        amount: i64,
        description: String,
        reference: Option<String>,
    ) -> AppResult<wallets::Model> {
        if amount <= 0 {
            return Err(AppError::ValidationError("Invalid amount".to_string()));
        }

        let updated = wallets::Entity::update_many()
            .col_expr(
                wallets::Column::Balance,
                Expr::col(wallets::Column::Balance).sub(amount),
            )
            .col_expr(wallets::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(wallets::Column::Id.eq(wallet_id))
            .filter(wallets::Column::Balance.gte(amount))
            .exec(conn)
            .await?;
        if updated.rows_affected == 0 {
            return Err(AppError::InsufficientBalance);
        }

        self.record_transaction(
            conn,
            wallet_id,
            TransactionType::Debit,
            amount,
            description,
            reference,
        )
        .await
    }

    /// Snapshots `balance_after` by re-reading the wallet on the same
    /// connection, after the guarded update took the row lock.
    async fn record_transaction<C: ConnectionTrait>(
        &self,
        conn: &C,
        wallet_id: i64,
        transaction_type: TransactionType,
        amount: i64,
        description: String,
        reference: Option<String>,
    ) -> AppResult<wallets::Model> {
        let wallet = wallets::Entity::find_by_id(wallet_id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Wallet not found".to_string()))?;

        wallet_txs::ActiveModel {
            wallet_id: Set(wallet_id),
            transaction_type: Set(transaction_type),
            amount: Set(amount),
            balance_after: Set(wallet.balance),
            description: Set(description),
            reference: Set(reference),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        Ok(wallet)
    }

    /// Latest ledger rows for the caller, newest first. No wallet yet means
    /// an empty history, nothing is created on a read.
    pub async fn list_transactions(
        &self,
        user: &AuthUser,
    ) -> AppResult<Vec<WalletTransactionResponse>> {
        let Some(wallet) = wallets::Entity::find()
            .filter(wallets::Column::UserId.eq(user.id))
            .one(&self.pool)
            .await?
        else {
            return Ok(Vec::new());
        };

        let rows = wallet_txs::Entity::find()
            .filter(wallet_txs::Column::WalletId.eq(wallet.id))
            .order_by_desc(wallet_txs::Column::CreatedAt)
            .limit(RECENT_TRANSACTION_LIMIT)
            .all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(WalletTransactionResponse::from)
            .collect())
    }

    pub async fn list_wallets(
        &self,
        query: &WalletQuery,
    ) -> AppResult<PaginatedResponse<WalletResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let total = wallets::Entity::find().count(&self.pool).await? as i64;
        let rows = wallets::Entity::find()
            .order_by_desc(wallets::Column::CreatedAt)
            .offset(params.get_offset() as u64)
            .limit(params.get_limit() as u64)
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(
            rows.into_iter().map(WalletResponse::from).collect(),
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
    use crate::middlewares::Role;

    fn buyer() -> AuthUser {
        AuthUser {
            id: 7,
            email: "buyer@example.com".to_string(),
            role: Role::Customer,
        }
    }

    #[tokio::test]
    async fn get_or_create_returns_the_same_wallet() {
        let pool = test_pool().await;
        let service = WalletService::new(pool);

        let first = service.get_or_create(&buyer()).await.unwrap();
        let second = service.get_or_create(&buyer()).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.balance, 0);
        assert_eq!(first.currency, "DZD");
        assert_eq!(second.user_email, "buyer@example.com");
    }

    #[tokio::test]
    async fn ledger_stays_in_sync_with_balance() {
        let pool = test_pool().await;
        let service = WalletService::new(pool.clone());
        let wallet = service.get_or_create(&buyer()).await.unwrap();

        service
            .credit(wallet.id, 100_000, "Top-up: 1".to_string(), None)
            .await
            .unwrap();
        service
            .debit(wallet.id, 30_000, "Order: ORD-X".to_string(), None)
            .await
            .unwrap();
        let wallet = service
            .credit(wallet.id, 5_000, "Top-up: 2".to_string(), None)
            .await
            .unwrap();

        assert_eq!(wallet.balance, 75_000);

        let rows = wallet_txs::Entity::find()
            .filter(wallet_txs::Column::WalletId.eq(wallet.id))
            .order_by_asc(wallet_txs::Column::Id)
            .all(&pool)
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);

        let signed_sum: i64 = rows
            .iter()
            .map(|row| match row.transaction_type {
                TransactionType::Credit => row.amount,
                TransactionType::Debit => -row.amount,
            })
            .sum();
        assert_eq!(signed_sum, wallet.balance);
        assert_eq!(rows[0].balance_after, 100_000);
        assert_eq!(rows[1].balance_after, 70_000);
        assert_eq!(rows[2].balance_after, 75_000);
    }

    #[tokio::test]
    async fn over_debit_fails_without_touching_the_ledger() {
        let pool = test_pool().await;
        let service = WalletService::new(pool.clone());
        let wallet = service.get_or_create(&buyer()).await.unwrap();
        service
            .credit(wallet.id, 10_000, "Top-up: 1".to_string(), None)
            .await
            .unwrap();

        let err = service
            .debit(wallet.id, 20_000, "Order: ORD-X".to_string(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientBalance));

        let wallet = wallets::Entity::find_by_id(wallet.id)
            .one(&pool)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(wallet.balance, 10_000);

        let rows = wallet_txs::Entity::find()
            .filter(wallet_txs::Column::WalletId.eq(wallet.id))
            .all(&pool)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_debits_cannot_overspend() {
        let pool = test_pool().await;
        let service = WalletService::new(pool.clone());
        let wallet = service.get_or_create(&buyer()).await.unwrap();
        service
            .credit(wallet.id, 50_000, "Top-up: 1".to_string(), None)
            .await
            .unwrap();

        let (first, second) = tokio::join!(
            service.debit(wallet.id, 30_000, "Order: ORD-A".to_string(), None),
            service.debit(wallet.id, 30_000, "Order: ORD-B".to_string(), None),
        );
        // exactly one of the two debits may win
        assert!(first.is_ok() != second.is_ok());

        let wallet = wallets::Entity::find_by_id(wallet.id)
            .one(&pool)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(wallet.balance, 20_000);

        let rows = wallet_txs::Entity::find()
            .filter(wallet_txs::Column::WalletId.eq(wallet.id))
            .all(&pool)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn non_positive_amounts_are_rejected() {
        let pool = test_pool().await;
        let service = WalletService::new(pool);
        let wallet = service.get_or_create(&buyer()).await.unwrap();

        let err = service
            .credit(wallet.id, 0, "Top-up: 1".to_string(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let err = service
            .debit(wallet.id, -500, "Order: ORD-X".to_string(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn admin_listing_pages_through_all_wallets() {
        let pool = test_pool().await;
        let service = WalletService::new(pool);
        for id in 1..=3 {
            let user = AuthUser {
                id,
                email: format!("user{id}@example.com"),
                role: Role::Customer,
            };
            service.get_or_create(&user).await.unwrap();
        }

        let page = service
            .list_wallets(&WalletQuery {
                page: Some(1),
                per_page: Some(2),
            })
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.total_pages, 2);
    }
}
