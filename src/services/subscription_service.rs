use crate::entities::{
    QuotaType, SubscriptionStatus, subscription_plan_entity as plans,
    user_subscription_entity as subs,
};
use crate::error::{AppError, AppResult};
use crate::middlewares::AuthUser;
use crate::models::{CreatePlanRequest, PlanResponse, SubscriptionResponse};
use chrono::{Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

#[derive(Clone)]
pub struct SubscriptionService {
    pool: DatabaseConnection,
}

impl SubscriptionService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Active plans in catalog order.
    pub async fn list_plans(&self) -> AppResult<Vec<PlanResponse>> {
        let rows = plans::Entity::find()
            .filter(plans::Column::IsActive.eq(true))
            .order_by_asc(plans::Column::SortOrder)
            .order_by_asc(plans::Column::DurationDays)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(PlanResponse::from).collect())
    }

    pub async fn create_plan(&self, req: CreatePlanRequest) -> AppResult<PlanResponse> {
        if req.slug.trim().is_empty() {
            return Err(AppError::ValidationError("Plan slug is required".to_string()));
        }
        if req.duration_days <= 0 {
            return Err(AppError::ValidationError(
                "Invalid plan duration".to_string(),
            ));
        }
        if req.price < 0 {
            return Err(AppError::ValidationError("Invalid plan price".to_string()));
        }
        let taken = plans::Entity::find()
            .filter(plans::Column::Slug.eq(req.slug.as_str()))
            .one(&self.pool)
            .await?;
        if taken.is_some() {
            return Err(AppError::ValidationError(
                "Plan slug already exists".to_string(),
            ));
        }

        let now = Utc::now();
        let plan = plans::ActiveModel {
            name: Set(req.name),
            slug: Set(req.slug),
            description: Set(req.description),
            duration_days: Set(req.duration_days),
            price: Set(req.price),
            currency: Set("DZD".to_string()),
            quota_type: Set(req.quota_type),
            quota_credits: Set(req.quota_credits.unwrap_or(0)),
            is_active: Set(true),
            sort_order: Set(req.sort_order.unwrap_or(0)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        Ok(PlanResponse::from(plan))
    }

    /// Creates a pending subscription; nothing is charged until an admin
    /// approves it.
    pub async fn subscribe(&self, user: &AuthUser, plan_id: i64) -> AppResult<SubscriptionResponse> {
        let plan = plans::Entity::find()
            .filter(plans::Column::Id.eq(plan_id))
            .filter(plans::Column::IsActive.eq(true))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Plan not found".to_string()))?;

        let now = Utc::now();
        let sub = subs::ActiveModel {
            user_id: Set(user.id),
            user_email: Set(user.email.clone()),
            plan_id: Set(plan.id),
            status: Set(SubscriptionStatus::Pending),
            credits_remaining: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        Ok(SubscriptionResponse::from((sub, Some(plan))))
    }

    pub async fn list_my(&self, user: &AuthUser) -> AppResult<Vec<SubscriptionResponse>> {
        let rows = subs::Entity::find()
            .filter(subs::Column::UserId.eq(user.id))
            .find_also_related(plans::Entity)
            .order_by_desc(subs::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(SubscriptionResponse::from).collect())
    }

    /// Activates a pending subscription: stamps the validity window, loads
    /// the plan's credits and records the approver. The pending -> active
    /// flip is a conditional UPDATE, so double approval fails clean.
    pub async fn approve(
        &self,
        admin: &AuthUser,
        sub_id: i64,
        admin_notes: Option<String>,
    ) -> AppResult<SubscriptionResponse> {
        let sub = subs::Entity::find_by_id(sub_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription not found".to_string()))?;
        let plan = plans::Entity::find_by_id(sub.plan_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Plan not found".to_string()))?;

        let now = Utc::now();
        let end = now + Duration::days(plan.duration_days as i64);
        let claimed = subs::Entity::update_many()
            .col_expr(
                subs::Column::Status,
                Expr::value(SubscriptionStatus::Active),
            )
            .col_expr(subs::Column::StartAt, Expr::value(Some(now)))
            .col_expr(subs::Column::EndAt, Expr::value(Some(end)))
            .col_expr(
                subs::Column::CreditsRemaining,
                Expr::value(plan.quota_credits),
            )
            .col_expr(subs::Column::ApprovedById, Expr::value(Some(admin.id)))
            .col_expr(
                subs::Column::ApprovedByEmail,
                Expr::value(Some(admin.email.clone())),
            )
            .col_expr(subs::Column::AdminNotes, Expr::value(admin_notes))
            .col_expr(subs::Column::UpdatedAt, Expr::value(now))
            .filter(subs::Column::Id.eq(sub.id))
            .filter(subs::Column::Status.eq(SubscriptionStatus::Pending))
            .exec(&self.pool)
            .await?;
        if claimed.rows_affected == 0 {
            return Err(AppError::InvalidStateTransition(
                "Only pending subscriptions can be approved".to_string(),
            ));
        }

        let sub = subs::Entity::find_by_id(sub.id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription not found".to_string()))?;
        Ok(SubscriptionResponse::from((sub, Some(plan))))
    }

    /// Flips active -> expired when the validity window has lapsed, then
    /// returns the current row. Callers invoke the transition deliberately;
    /// reads never mutate.
    pub async fn expire_if_needed<C: ConnectionTrait>(
        &self,
        conn: &C,
        sub_id: i64,
    ) -> AppResult<subs::Model> {
        let now = Utc::now();
        subs::Entity::update_many()
            .col_expr(
                subs::Column::Status,
                Expr::value(SubscriptionStatus::Expired),
            )
            .col_expr(subs::Column::UpdatedAt, Expr::value(now))
            .filter(subs::Column::Id.eq(sub_id))
            .filter(subs::Column::Status.eq(SubscriptionStatus::Active))
            .filter(subs::Column::EndAt.is_not_null())
            .filter(subs::Column::EndAt.lt(now))
            .exec(conn)
            .await?;

        subs::Entity::find_by_id(sub_id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription not found".to_string()))
    }

    /// The user's newest active subscription plus its plan, with the expiry
    /// transition applied first. Callers pass the pool when the transition
    /// must outlive their own transaction.
    pub(crate) async fn find_active_for_payment<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: i64,
    ) -> AppResult<(subs::Model, plans::Model)> {
        let Some(sub) = subs::Entity::find()
            .filter(subs::Column::UserId.eq(user_id))
            .filter(subs::Column::Status.eq(SubscriptionStatus::Active))
            .order_by_desc(subs::Column::CreatedAt)
            .one(conn)
            .await?
        else {
            return Err(AppError::NoActiveSubscription);
        };

        let sub = self.expire_if_needed(conn, sub.id).await?;
        if !sub.is_active_at(Utc::now()) {
            return Err(AppError::NoActiveSubscription);
        }

        let plan = plans::Entity::find_by_id(sub.plan_id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Plan not found".to_string()))?;
        Ok((sub, plan))
    }

    /// Takes one credit. The remaining-credits predicate sits in the UPDATE,
    /// so two concurrent purchases cannot both consume the last credit.
    pub(crate) async fn consume_credit<C: ConnectionTrait>(
        &self,
        conn: &C,
        sub_id: i64,
        quota_type: &QuotaType,
    ) -> AppResult<()> {
        if *quota_type == QuotaType::Unlimited {
            return Ok(());
        }

        let updated = subs::Entity::update_many()
            .col_expr(
                subs::Column::CreditsRemaining,
                Expr::col(subs::Column::CreditsRemaining).sub(1),
            )
            .col_expr(subs::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(subs::Column::Id.eq(sub_id))
            .filter(subs::Column::Status.eq(SubscriptionStatus::Active))
            .filter(subs::Column::CreditsRemaining.gte(1))
            .exec(conn)
            .await?;
        if updated.rows_affected == 0 {
            return Err(AppError::InsufficientCredits);
        }
        Ok(())
    }

    /// Background sweep: every active subscription whose window has lapsed
    /// becomes expired. Returns how many rows flipped.
    pub async fn expire_overdue(&self) -> AppResult<u64> {
        let now = Utc::now();
        let res = subs::Entity::update_many()
            .col_expr(
                subs::Column::Status,
                Expr::value(SubscriptionStatus::Expired),
            )
            .col_expr(subs::Column::UpdatedAt, Expr::value(now))
            .filter(subs::Column::Status.eq(SubscriptionStatus::Active))
            .filter(subs::Column::EndAt.is_not_null())
            .filter(subs::Column::EndAt.lt(now))
            .exec(&self.pool)
            .await?;
        Ok(res.rows_affected)
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

    fn admin() -> AuthUser {
        AuthUser {
            id: 1,
            email: "admin@example.com".to_string(),
            role: Role::Admin,
        }
    }

    fn plan_request(slug: &str, quota_type: QuotaType, credits: i32) -> CreatePlanRequest {
        CreatePlanRequest {
            name: format!("Plan {slug}"),
            slug: slug.to_string(),
            description: None,
            duration_days: 30,
            price: 250_000,
            quota_type,
            quota_credits: Some(credits),
            sort_order: None,
        }
    }

    async fn lapse(pool: &DatabaseConnection, sub_id: i64) {
        subs::Entity::update_many()
            .col_expr(
                subs::Column::EndAt,
                Expr::value(Some(Utc::now() - Duration::days(1))),
            )
            .filter(subs::Column::Id.eq(sub_id))
            .exec(pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn plan_listing_hides_inactive_plans_and_keeps_catalog_order() {
        let pool = test_pool().await;
        let service = SubscriptionService::new(pool.clone());

        let mut second = plan_request("second", QuotaType::Credits, 10);
        second.sort_order = Some(2);
        let mut first = plan_request("first", QuotaType::Credits, 10);
        first.sort_order = Some(1);
        let hidden = service
            .create_plan(plan_request("hidden", QuotaType::Credits, 10))
            .await
            .unwrap();
        service.create_plan(second).await.unwrap();
        service.create_plan(first).await.unwrap();

        plans::Entity::update_many()
            .col_expr(plans::Column::IsActive, Expr::value(false))
            .filter(plans::Column::Id.eq(hidden.id))
            .exec(&pool)
            .await
            .unwrap();

        let listed = service.list_plans().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].slug, "first");
        assert_eq!(listed[1].slug, "second");
    }

    #[tokio::test]
    async fn duplicate_plan_slugs_are_rejected() {
        let pool = test_pool().await;
        let service = SubscriptionService::new(pool);
        service
            .create_plan(plan_request("pro", QuotaType::Credits, 10))
            .await
            .unwrap();

        let err = service
            .create_plan(plan_request("pro", QuotaType::Downloads, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn subscribe_requires_an_active_plan() {
        let pool = test_pool().await;
        let service = SubscriptionService::new(pool.clone());

        let err = service.subscribe(&buyer(), 999).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let plan = service
            .create_plan(plan_request("pro", QuotaType::Credits, 10))
            .await
            .unwrap();
        plans::Entity::update_many()
            .col_expr(plans::Column::IsActive, Expr::value(false))
            .filter(plans::Column::Id.eq(plan.id))
            .exec(&pool)
            .await
            .unwrap();

        let err = service.subscribe(&buyer(), plan.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn approve_activates_only_pending_subscriptions() {
        let pool = test_pool().await;
        let service = SubscriptionService::new(pool);
        let plan = service
            .create_plan(plan_request("pro", QuotaType::Credits, 10))
            .await
            .unwrap();
        let sub = service.subscribe(&buyer(), plan.id).await.unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Pending);
        assert_eq!(sub.credits_remaining, 0);

        let approved = service
            .approve(&admin(), sub.id, Some("paid by cheque".to_string()))
            .await
            .unwrap();
        assert_eq!(approved.status, SubscriptionStatus::Active);
        assert_eq!(approved.credits_remaining, 10);
        assert_eq!(approved.approved_by_email.as_deref(), Some("admin@example.com"));
        let window = approved.end_at.unwrap() - approved.start_at.unwrap();
        assert_eq!(window.num_days(), 30);

        let err = service.approve(&admin(), sub.id, None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidStateTransition(_)));
    }

    #[tokio::test]
    async fn explicit_expiry_flips_a_lapsed_subscription_once() {
        let pool = test_pool().await;
        let service = SubscriptionService::new(pool.clone());
        let plan = service
            .create_plan(plan_request("pro", QuotaType::Credits, 10))
            .await
            .unwrap();
        let sub = service.subscribe(&buyer(), plan.id).await.unwrap();
        service.approve(&admin(), sub.id, None).await.unwrap();
        lapse(&pool, sub.id).await;

        let expired = service.expire_if_needed(&pool, sub.id).await.unwrap();
        assert_eq!(expired.status, SubscriptionStatus::Expired);

        // the command is idempotent
        let expired = service.expire_if_needed(&pool, sub.id).await.unwrap();
        assert_eq!(expired.status, SubscriptionStatus::Expired);
    }

    #[tokio::test]
    async fn expiry_command_leaves_current_subscriptions_alone() {
        let pool = test_pool().await;
        let service = SubscriptionService::new(pool.clone());
        let plan = service
            .create_plan(plan_request("pro", QuotaType::Credits, 10))
            .await
            .unwrap();
        let sub = service.subscribe(&buyer(), plan.id).await.unwrap();
        service.approve(&admin(), sub.id, None).await.unwrap();

        let current = service.expire_if_needed(&pool, sub.id).await.unwrap();
        assert_eq!(current.status, SubscriptionStatus::Active);
    }

    #[tokio::test]
    async fn consume_credit_guards_the_last_credit() {
        let pool = test_pool().await;
        let service = SubscriptionService::new(pool.clone());
        let plan = service
            .create_plan(plan_request("single", QuotaType::Credits, 1))
            .await
            .unwrap();
        let sub = service.subscribe(&buyer(), plan.id).await.unwrap();
        service.approve(&admin(), sub.id, None).await.unwrap();

        service
            .consume_credit(&pool, sub.id, &QuotaType::Credits)
            .await
            .unwrap();
        let err = service
            .consume_credit(&pool, sub.id, &QuotaType::Credits)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientCredits));

        let stored = subs::Entity::find_by_id(sub.id)
            .one(&pool)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.credits_remaining, 0);
    }

    #[tokio::test]
    async fn unlimited_quota_never_depletes() {
        let pool = test_pool().await;
        let service = SubscriptionService::new(pool.clone());
        let plan = service
            .create_plan(plan_request("unlimited", QuotaType::Unlimited, 0))
            .await
            .unwrap();
        let sub = service.subscribe(&buyer(), plan.id).await.unwrap();
        service.approve(&admin(), sub.id, None).await.unwrap();

        for _ in 0..5 {
            service
                .consume_credit(&pool, sub.id, &QuotaType::Unlimited)
                .await
                .unwrap();
        }
        let stored = subs::Entity::find_by_id(sub.id)
            .one(&pool)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.credits_remaining, 0);
    }

    #[tokio::test]
    async fn overdue_sweep_only_touches_lapsed_active_rows() {
        let pool = test_pool().await;
        let service = SubscriptionService::new(pool.clone());
        let plan = service
            .create_plan(plan_request("pro", QuotaType::Credits, 10))
            .await
            .unwrap();

        let lapsed_a = service.subscribe(&buyer(), plan.id).await.unwrap();
        service.approve(&admin(), lapsed_a.id, None).await.unwrap();
        lapse(&pool, lapsed_a.id).await;

        let other = AuthUser {
            id: 8,
            email: "other@example.com".to_string(),
            role: Role::Customer,
        };
        let lapsed_b = service.subscribe(&other, plan.id).await.unwrap();
        service.approve(&admin(), lapsed_b.id, None).await.unwrap();
        lapse(&pool, lapsed_b.id).await;

        let current = service.subscribe(&buyer(), plan.id).await.unwrap();
        service.approve(&admin(), current.id, None).await.unwrap();

        let pending = service.subscribe(&buyer(), plan.id).await.unwrap();
        lapse(&pool, pending.id).await;

        let flipped = service.expire_overdue().await.unwrap();
        assert_eq!(flipped, 2);

        let stored = subs::Entity::find_by_id(current.id)
            .one(&pool)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, SubscriptionStatus::Active);
        let stored = subs::Entity::find_by_id(pending.id)
            .one(&pool)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, SubscriptionStatus::Pending);
    }

    #[tokio::test]
    async fn my_subscriptions_carry_plan_details() {
        let pool = test_pool().await;
        let service = SubscriptionService::new(pool);
        let plan = service
            .create_plan(plan_request("pro", QuotaType::Credits, 10))
            .await
            .unwrap();
        service.subscribe(&buyer(), plan.id).await.unwrap();

        let mine = service.list_my(&buyer()).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].plan_name.as_deref(), Some("Plan pro"));
        assert_eq!(mine[0].plan.as_ref().unwrap().slug, "pro");

        let other = AuthUser {
            id: 8,
            email: "other@example.com".to_string(),
            role: Role::Customer,
        };
        assert!(service.list_my(&other).await.unwrap().is_empty());
    }
}
