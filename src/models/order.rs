use crate::entities::{LicenseType, PaymentMethod, PaymentStatus, order_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub image_id: i64,
    pub license_type: LicenseType,
    /// Only `wallet` and `subscription` can be requested here; `manual`
    /// orders are created by back-office reconciliation.
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: i64,
    pub order_number: String,
    pub user_id: i64,
    pub user_email: String,
    pub image_id: i64,
    pub image_filename: String,
    pub license_type: LicenseType,
    pub amount: i64,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub payment_reference: Option<String>,
    pub download_token: String,
    pub download_expires_at: Option<DateTime<Utc>>,
    pub download_count: i32,
    pub max_downloads: i32,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<order_entity::Model> for OrderResponse {
    fn from(m: order_entity::Model) -> Self {
        Self {
            id: m.id,
            order_number: m.order_number,
            user_id: m.user_id,
            user_email: m.user_email,
            image_id: m.image_id,
            image_filename: m.image_filename,
            license_type: m.license_type,
            amount: m.amount,
            currency: m.currency,
            payment_method: m.payment_method,
            payment_status: m.payment_status,
            payment_reference: m.payment_reference,
            download_token: m.download_token,
            download_expires_at: m.download_expires_at,
            download_count: m.download_count,
            max_downloads: m.max_downloads,
            completed_at: m.completed_at,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<PaymentStatus>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadResponse {
    pub message: String,
    pub image_id: i64,
    pub image_filename: String,
    pub downloads_remaining: i32,
}
