use crate::entities::{PaymentLogType, payment_log_entity as payment_logs};
use crate::error::AppResult;
use crate::models::{
    NewPaymentLog, PaginatedResponse, PaginationParams, PaymentLogQuery, PaymentLogResponse,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

#[derive(Clone)]
pub struct PaymentLogService {
    pool: DatabaseConnection,
}

impl PaymentLogService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Append-only; reconciliation reads these rows, nothing updates them.
    pub async fn record(&self, entry: NewPaymentLog) -> AppResult<PaymentLogResponse> {
        let log = payment_logs::ActiveModel {
            log_type: Set(entry.log_type),
            provider: Set(entry.provider),
            reference: Set(entry.reference),
            amount: Set(entry.amount),
            currency: Set(entry.currency),
            order_id: Set(entry.order_id),
            topup_request_id: Set(entry.topup_request_id),
            payload: Set(entry.payload),
            response: Set(entry.response),
            status: Set(entry.status),
            error_message: Set(entry.error_message),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        Ok(PaymentLogResponse::from(log))
    }

    /// Stores a provider callback verbatim. The obvious fields are lifted
    /// out of the body for filtering, the raw payload stays alongside.
    pub async fn record_webhook(
        &self,
        provider: &str,
        payload: serde_json::Value,
    ) -> AppResult<PaymentLogResponse> {
        let entry = NewPaymentLog {
            log_type: PaymentLogType::Webhook,
            provider: provider.to_string(),
            reference: payload
                .get("reference")
                .and_then(|v| v.as_str())
                .map(String::from),
            amount: payload.get("amount").and_then(serde_json::Value::as_i64),
            currency: payload
                .get("currency")
                .and_then(|v| v.as_str())
                .map(String::from),
            order_id: None,
            topup_request_id: None,
            status: payload
                .get("status")
                .and_then(|v| v.as_str())
                .unwrap_or("received")
                .to_string(),
            payload: Some(payload),
            response: None,
            error_message: None,
        };
        self.record(entry).await
    }

    pub async fn list(
        &self,
        query: &PaymentLogQuery,
    ) -> AppResult<PaginatedResponse<PaymentLogResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let mut finder = payment_logs::Entity::find();
        if let Some(provider) = &query.provider {
            finder = finder.filter(payment_logs::Column::Provider.eq(provider.clone()));
        }

        let total = finder.clone().count(&self.pool).await? as i64;
        let rows = finder
            .order_by_desc(payment_logs::Column::CreatedAt)
            .offset(params.get_offset() as u64)
            .limit(params.get_limit() as u64)
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(
            rows.into_iter().map(PaymentLogResponse::from).collect(),
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
    use serde_json::json;

    #[tokio::test]
    async fn webhook_payload_is_stored_verbatim() {
        let pool = test_pool().await;
        let service = PaymentLogService::new(pool);

        let body = json!({
            "reference": "EDH-2025-1187",
            "amount": 100_000,
            "currency": "DZD",
            "event": "payment.completed",
        });
        let log = service
            .record_webhook("eldhahabia", body.clone())
            .await
            .unwrap();

        assert_eq!(log.log_type, PaymentLogType::Webhook);
        assert_eq!(log.provider, "eldhahabia");
        assert_eq!(log.reference.as_deref(), Some("EDH-2025-1187"));
        assert_eq!(log.amount, Some(100_000));
        assert_eq!(log.currency.as_deref(), Some("DZD"));
        assert_eq!(log.status, "received");
        assert_eq!(log.payload, Some(body));
        assert!(log.order_id.is_none());
    }

    #[tokio::test]
    async fn webhook_status_comes_from_the_body_when_present() {
        let pool = test_pool().await;
        let service = PaymentLogService::new(pool);

        let log = service
            .record_webhook("cib", json!({"status": "failed", "reason": "card declined"}))
            .await
            .unwrap();
        assert_eq!(log.status, "failed");
        assert!(log.reference.is_none());
    }

    #[tokio::test]
    async fn listing_filters_by_provider() {
        let pool = test_pool().await;
        let service = PaymentLogService::new(pool);
        service
            .record_webhook("eldhahabia", json!({"amount": 1}))
            .await
            .unwrap();
        service
            .record_webhook("eldhahabia", json!({"amount": 2}))
            .await
            .unwrap();
        service
            .record_webhook("cib", json!({"amount": 3}))
            .await
            .unwrap();

        let all = service
            .list(&PaymentLogQuery {
                page: None,
                per_page: None,
                provider: None,
            })
            .await
            .unwrap();
        assert_eq!(all.total, 3);

        let cib = service
            .list(&PaymentLogQuery {
                page: None,
                per_page: None,
                provider: Some("cib".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(cib.total, 1);
        assert_eq!(cib.data[0].amount, Some(3));
    }
}
