use crate::entities::{
    QuotaType, SubscriptionStatus, subscription_plan_entity, user_subscription_entity,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePlanRequest {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    /// Validity window in days (30, 90, 180 ...).
    pub duration_days: i32,
    /// Price in centimes.
    pub price: i64,
    pub quota_type: QuotaType,
    pub quota_credits: Option<i32>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlanResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub duration_days: i32,
    pub price: i64,
    pub currency: String,
    pub quota_type: QuotaType,
    pub quota_credits: i32,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

impl From<subscription_plan_entity::Model> for PlanResponse {
    fn from(m: subscription_plan_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            slug: m.slug,
            description: m.description,
            duration_days: m.duration_days,
            price: m.price,
            currency: m.currency,
            quota_type: m.quota_type,
            quota_credits: m.quota_credits,
            is_active: m.is_active,
            sort_order: m.sort_order,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscribeRequest {
    pub plan_id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApproveSubscriptionRequest {
    pub admin_notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionResponse {
    pub id: i64,
    pub user_id: i64,
    pub user_email: String,
    pub plan_id: i64,
    pub plan_name: Option<String>,
    pub plan: Option<PlanResponse>,
    pub status: SubscriptionStatus,
    pub credits_remaining: i32,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub approved_by_id: Option<i64>,
    pub approved_by_email: Option<String>,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<user_subscription_entity::Model> for SubscriptionResponse {
    fn from(m: user_subscription_entity::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            user_email: m.user_email,
            plan_id: m.plan_id,
            plan_name: None,
            plan: None,
            status: m.status,
            credits_remaining: m.credits_remaining,
            start_at: m.start_at,
            end_at: m.end_at,
            approved_by_id: m.approved_by_id,
            approved_by_email: m.approved_by_email,
            admin_notes: m.admin_notes,
            created_at: m.created_at,
        }
    }
}

impl
    From<(
        user_subscription_entity::Model,
        Option<subscription_plan_entity::Model>,
    )> for SubscriptionResponse
{
    fn from(
        (m, plan): (
            user_subscription_entity::Model,
            Option<subscription_plan_entity::Model>,
        ),
    ) -> Self {
        let mut response = SubscriptionResponse::from(m);
        response.plan_name = plan.as_ref().map(|p| p.name.clone());
        response.plan = plan.map(PlanResponse::from);
        response
    }
}
