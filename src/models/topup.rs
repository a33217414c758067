use crate::entities::{TopupStatus, topup_request_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateTopupRequest {
    /// Amount in centimes, must be positive.
    pub amount: i64,
    /// Offline provider the user paid through (eldhahabia, cib, algerie_poste).
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReviewTopupRequest {
    pub admin_notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TopupResponse {
    pub id: i64,
    pub user_id: i64,
    pub user_email: String,
    pub amount: i64,
    pub currency: String,
    pub payment_method: String,
    pub payment_reference: Option<String>,
    pub status: TopupStatus,
    pub admin_notes: Option<String>,
    pub processed_by_id: Option<i64>,
    pub processed_by_email: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<topup_request_entity::Model> for TopupResponse {
    fn from(m: topup_request_entity::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            user_email: m.user_email,
            amount: m.amount,
            currency: m.currency,
            payment_method: m.payment_method,
            payment_reference: m.payment_reference,
            status: m.status,
            admin_notes: m.admin_notes,
            processed_by_id: m.processed_by_id,
            processed_by_email: m.processed_by_email,
            processed_at: m.processed_at,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TopupQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<TopupStatus>,
}
