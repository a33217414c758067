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
pub enum PaymentLogType {
    #[sea_orm(string_value = "webhook")]
    Webhook,
    #[sea_orm(string_value = "manual")]
    Manual,
    #[sea_orm(string_value = "system")]
    System,
}

impl std::fmt::Display for PaymentLogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentLogType::Webhook => write!(f, "webhook"),
            PaymentLogType::Manual => write!(f, "manual"),
            PaymentLogType::System => write!(f, "system"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "payment_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub log_type: PaymentLogType,
    pub provider: String,
    pub reference: Option<String>,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub order_id: Option<i64>,
    pub topup_request_id: Option<i64>,
    pub payload: Option<Json>,
    pub response: Option<Json>,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
