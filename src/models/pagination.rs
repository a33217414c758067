use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::order::OrderResponse;
use super::payment_log::PaymentLogResponse;
use super::topup::TopupResponse;
use super::wallet::WalletResponse;

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: Some(1),
            page_size: Some(20),
        }
    }
}

impl PaginationParams {
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.map(|p| p as i64),
            page_size: per_page.map(|p| p as i64),
        }
    }

    pub fn get_offset(&self) -> i64 {
        let page = self.page.unwrap_or(1).max(1);
        (page - 1) * self.get_limit()
    }

    pub fn get_limit(&self) -> i64 {
        self.page_size.unwrap_or(20).clamp(1, 100)
    }

    pub fn get_page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[aliases(
    PaginatedOrderResponse = PaginatedResponse<OrderResponse>,
    PaginatedTopupResponse = PaginatedResponse<TopupResponse>,
    PaginatedWalletResponse = PaginatedResponse<WalletResponse>,
    PaginatedPaymentLogResponse = PaginatedResponse<PaymentLogResponse>
)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: i64, page_size: i64, total: i64) -> Self {
        let page_size = page_size.max(1);
        let total_pages = (total + page_size - 1) / page_size;
        Self {
            data,
            page,
            page_size,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page_of_twenty() {
        let params = PaginationParams {
            page: None,
            page_size: None,
        };
        assert_eq!(params.get_page(), 1);
        assert_eq!(params.get_limit(), 20);
        assert_eq!(params.get_offset(), 0);
    }

    #[test]
    fn offset_advances_with_page() {
        let params = PaginationParams {
            page: Some(3),
            page_size: Some(25),
        };
        assert_eq!(params.get_offset(), 50);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let params = PaginationParams {
            page: Some(0),
            page_size: Some(0),
        };
        assert_eq!(params.get_page(), 1);
        assert_eq!(params.get_limit(), 1);
        assert_eq!(params.get_offset(), 0);

        let oversized = PaginationParams {
            page: Some(1),
            page_size: Some(10_000),
        };
        assert_eq!(oversized.get_limit(), 100);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page: PaginatedResponse<i64> = PaginatedResponse::new(vec![], 1, 20, 41);
        assert_eq!(page.total_pages, 3);

        let exact: PaginatedResponse<i64> = PaginatedResponse::new(vec![], 1, 20, 40);
        assert_eq!(exact.total_pages, 2);
    }
}
