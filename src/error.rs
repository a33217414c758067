use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ApiResponse;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Insufficient subscription credits")]
    InsufficientCredits,

    #[error("No active subscription")]
    NoActiveSubscription,

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Image not found")]
    CatalogItemNotFound,

    #[error("Invalid token")]
    TokenNotFound,

    #[error("Download token expired or limit reached")]
    DownloadNotAuthorized,

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code, message) = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                (
                    actix_web::http::StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    msg.clone(),
                )
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                (
                    actix_web::http::StatusCode::UNAUTHORIZED,
                    "AUTH_ERROR",
                    msg.clone(),
                )
            }
            AppError::NotFound(msg) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NOT_FOUND",
                msg.clone(),
            ),
            AppError::PermissionDenied => {
                log::warn!("Permission denied");
                (
                    actix_web::http::StatusCode::FORBIDDEN,
                    "FORBIDDEN",
                    "Permission denied".to_string(),
                )
            }
            AppError::InsufficientBalance => {
                log::warn!("Wallet debit rejected: insufficient balance");
                (
                    actix_web::http::StatusCode::BAD_REQUEST,
                    "INSUFFICIENT_BALANCE",
                    "Insufficient balance".to_string(),
                )
            }
            AppError::InsufficientCredits => {
                log::warn!("Credit consumption rejected: insufficient credits");
                (
                    actix_web::http::StatusCode::BAD_REQUEST,
                    "INSUFFICIENT_CREDITS",
                    "Insufficient subscription credits".to_string(),
                )
            }
            AppError::NoActiveSubscription => {
                log::warn!("Subscription payment rejected: no active subscription");
                (
                    actix_web::http::StatusCode::BAD_REQUEST,
                    "NO_ACTIVE_SUBSCRIPTION",
                    "No active subscription".to_string(),
                )
            }
            AppError::InvalidStateTransition(msg) => {
                log::warn!("Invalid state transition: {msg}");
                (
                    actix_web::http::StatusCode::CONFLICT,
                    "INVALID_STATE_TRANSITION",
                    msg.clone(),
                )
            }
            AppError::CatalogItemNotFound => (
                actix_web::http::StatusCode::NOT_FOUND,
                "CATALOG_ITEM_NOT_FOUND",
                "Image not found".to_string(),
            ),
            AppError::TokenNotFound => (
                actix_web::http::StatusCode::NOT_FOUND,
                "TOKEN_NOT_FOUND",
                "Invalid token".to_string(),
            ),
            AppError::DownloadNotAuthorized => {
                log::warn!("Download rejected: token expired or limit reached");
                (
                    actix_web::http::StatusCode::FORBIDDEN,
                    "DOWNLOAD_NOT_AUTHORIZED",
                    "Download token expired or limit reached".to_string(),
                )
            }
            AppError::TransactionFailed(msg) => {
                log::error!("Transaction failed: {msg}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "TRANSACTION_FAILED",
                    "Transaction failed".to_string(),
                )
            }
            AppError::ExternalApiError(msg) => {
                log::error!("External API error: {msg}");
                (
                    actix_web::http::StatusCode::BAD_GATEWAY,
                    "EXTERNAL_API_ERROR",
                    msg.clone(),
                )
            }
            AppError::ReqwestError(err) => {
                log::error!("Upstream request failed: {err}");
                (
                    actix_web::http::StatusCode::BAD_GATEWAY,
                    "EXTERNAL_API_ERROR",
                    "Upstream request failed".to_string(),
                )
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error".to_string(),
                )
            }
            _ => {
                log::error!("Internal error: {self}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        HttpResponse::build(status_code).json(ApiResponse::failure(error_code, message))
    }
}
