use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::order::{DownloadResponse, OrderResponse};
use super::subscription::SubscriptionResponse;
use super::topup::TopupResponse;
use super::wallet::WalletResponse;

/// Envelope shared by every endpoint. Success payloads ride in `data`,
/// failures carry a machine-readable code in `error`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[aliases(
    WalletApiResponse = ApiResponse<WalletResponse>,
    TopupApiResponse = ApiResponse<TopupResponse>,
    SubscriptionApiResponse = ApiResponse<SubscriptionResponse>,
    OrderApiResponse = ApiResponse<OrderResponse>,
    DownloadApiResponse = ApiResponse<DownloadResponse>
)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiResponse<()> {
    pub fn failure(code: &str, message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(ApiError {
                code: code.to_string(),
                message,
            }),
        }
    }
}
