use crate::entities::{PaymentLogType, payment_log_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentLogResponse {
    pub id: i64,
    pub log_type: PaymentLogType,
    pub provider: String,
    pub reference: Option<String>,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub order_id: Option<i64>,
    pub topup_request_id: Option<i64>,
    #[schema(value_type = Option<Object>)]
    pub payload: Option<serde_json::Value>,
    #[schema(value_type = Option<Object>)]
    pub response: Option<serde_json::Value>,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<payment_log_entity::Model> for PaymentLogResponse {
    fn from(m: payment_log_entity::Model) -> Self {
        Self {
            id: m.id,
            log_type: m.log_type,
            provider: m.provider,
            reference: m.reference,
            amount: m.amount,
            currency: m.currency,
            order_id: m.order_id,
            topup_request_id: m.topup_request_id,
            payload: m.payload,
            response: m.response,
            status: m.status,
            error_message: m.error_message,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentLogQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub provider: Option<String>,
}

/// One append-only reconciliation entry. `order_id`/`topup_request_id` are
/// only set by callers that hold the referenced row.
#[derive(Debug)]
pub struct NewPaymentLog {
    pub log_type: PaymentLogType,
    pub provider: String,
    pub reference: Option<String>,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub order_id: Option<i64>,
    pub topup_request_id: Option<i64>,
    pub payload: Option<serde_json::Value>,
    pub response: Option<serde_json::Value>,
    pub status: String,
    pub error_message: Option<String>,
}
