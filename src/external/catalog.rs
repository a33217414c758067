use crate::config::CatalogConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Image metadata as served by the catalog service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogImage {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Lookup seam for the external image catalog. Orders only need existence
/// and the filename at purchase time.
#[async_trait]
pub trait ImageCatalog: Send + Sync {
    async fn fetch_image(&self, image_id: i64) -> AppResult<CatalogImage>;
}

pub struct HttpImageCatalog {
    client: Client,
    config: CatalogConfig,
}

impl HttpImageCatalog {
    pub fn new(config: CatalogConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ImageCatalog for HttpImageCatalog {
    async fn fetch_image(&self, image_id: i64) -> AppResult<CatalogImage> {
        let url = format!(
            "{}/api/images/{}/",
            self.config.base_url.trim_end_matches('/'),
            image_id
        );

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(AppError::CatalogItemNotFound),
            status if status.is_success() => Ok(response.json::<CatalogImage>().await?),
            status => Err(AppError::ExternalApiError(format!(
                "Image catalog returned {status}"
            ))),
        }
    }
}
