use crate::entities::{TransactionType, user_wallet_entity, wallet_transaction_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WalletResponse {
    pub id: i64,
    pub user_id: i64,
    pub user_email: String,
    /// Balance in centimes.
    pub balance: i64,
    pub currency: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<user_wallet_entity::Model> for WalletResponse {
    fn from(m: user_wallet_entity::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            user_email: m.user_email,
            balance: m.balance,
            currency: m.currency,
            is_active: m.is_active,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WalletTransactionResponse {
    pub id: i64,
    pub wallet_id: i64,
    pub transaction_type: TransactionType,
    pub amount: i64,
    pub balance_after: i64,
    pub description: String,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<wallet_transaction_entity::Model> for WalletTransactionResponse {
    fn from(m: wallet_transaction_entity::Model) -> Self {
        Self {
            id: m.id,
            wallet_id: m.wallet_id,
            transaction_type: m.transaction_type,
            amount: m.amount,
            balance_after: m.balance_after,
            description: m.description,
            reference: m.reference,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WalletQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
