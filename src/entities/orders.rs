use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum LicenseType {
    #[sea_orm(string_value = "standard")]
    Standard,
    #[sea_orm(string_value = "extended")]
    Extended,
    #[sea_orm(string_value = "exclusive")]
    Exclusive,
}

impl std::fmt::Display for LicenseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseType::Standard => write!(f, "standard"),
            LicenseType::Extended => write!(f, "extended"),
            LicenseType::Exclusive => write!(f, "exclusive"),
        }
    }
}

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "wallet")]
    Wallet,
    #[sea_orm(string_value = "subscription")]
    Subscription,
    #[sea_orm(string_value = "manual")]
    Manual,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Wallet => write!(f, "wallet"),
            PaymentMethod::Subscription => write!(f, "subscription"),
            PaymentMethod::Manual => write!(f, "manual"),
        }
    }
}

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Failed => write!(f, "failed"),
            PaymentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub order_number: String,
    pub user_id: i64,
    pub user_email: String,
    /// Catalog item in the external image service, kept with the filename
    /// it had at purchase time.
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
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Paid, under the download ceiling and inside the expiry window.
    pub fn is_download_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.payment_status == PaymentStatus::Paid
            && self.download_count < self.max_downloads
            && self.download_expires_at.map_or(true, |expires| now <= expires)
    }

    pub fn remaining_downloads(&self) -> i32 {
        (self.max_downloads - self.download_count).max(0)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn paid_order(now: DateTime<Utc>) -> Model {
        Model {
            id: 1,
            order_number: "ORD-20250901120000-A1B2C3".to_string(),
            user_id: 7,
            user_email: "buyer@example.com".to_string(),
            image_id: 42,
            image_filename: "sahara_dunes.jpg".to_string(),
            license_type: LicenseType::Standard,
            amount: 50_000,
            currency: "DZD".to_string(),
            payment_method: PaymentMethod::Wallet,
            payment_status: PaymentStatus::Paid,
            payment_reference: None,
            download_token: "3f1f9f2e-58f0-4f4e-9d6a-0c8f2a7b1e11".to_string(),
            download_expires_at: Some(now + Duration::hours(24)),
            download_count: 0,
            max_downloads: 3,
            completed_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn fresh_paid_order_is_downloadable() {
        let now = Utc::now();
        let order = paid_order(now);
        assert!(order.is_download_valid_at(now));
        assert_eq!(order.remaining_downloads(), 3);
    }

    #[test]
    fn unpaid_order_is_not_downloadable() {
        let now = Utc::now();
        let mut order = paid_order(now);
        order.payment_status = PaymentStatus::Pending;
        assert!(!order.is_download_valid_at(now));
    }

    #[test]
    fn exhausted_order_is_not_downloadable() {
        let now = Utc::now();
        let mut order = paid_order(now);
        order.download_count = 3;
        assert!(!order.is_download_valid_at(now));
        assert_eq!(order.remaining_downloads(), 0);
    }

    #[test]
    fn expired_token_is_not_downloadable() {
        let now = Utc::now();
        let mut order = paid_order(now);
        order.download_expires_at = Some(now - Duration::minutes(1));
        assert!(!order.is_download_valid_at(now));
    }

    #[test]
    fn order_without_expiry_only_checks_count_and_status() {
        let now = Utc::now();
        let mut order = paid_order(now);
        order.download_expires_at = None;
        assert!(order.is_download_valid_at(now));
    }
}
