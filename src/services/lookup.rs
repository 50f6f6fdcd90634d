use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::models::LookupResult;

/// Shape of the upstream lookup payload. Only the first entry is consumed.
#[derive(Debug, Deserialize)]
struct UpstreamResponse {
    #[serde(default)]
    items: Vec<UpstreamItem>,
}

#[derive(Debug, Deserialize)]
struct UpstreamItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    brand: String,
}

/// Client for the external UPC database. One instance is shared app-wide;
/// reqwest pools connections internally.
#[derive(Clone, Debug)]
pub struct UpcLookupClient {
    client: Client,
    base_url: String,
}

impl UpcLookupClient {
    /// Build a client with its own connection pool and request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            ServiceError::InternalError(format!("failed to construct lookup client: {}", e))
        })?;

        Ok(Self::with_client(base_url, client))
    }

    /// Build a client from an existing reqwest client (useful for testing).
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ServiceError> {
        Self::new(
            config.upc_base_url.clone(),
            Duration::from_secs(config.upc_timeout_secs),
        )
    }

    /// Asks the upstream database about a barcode. `Ok(None)` means the
    /// upstream knows no such product; transport and decode failures are
    /// errors. The upstream signals misses through an empty `items` array
    /// rather than the status code, so the status is not inspected.
    #[instrument(skip(self))]
    pub async fn lookup(&self, barcode: &str) -> Result<Option<LookupResult>, ServiceError> {
        let url = format!("{}/lookup?upc={}", self.base_url, barcode);
        let response = self.client.get(&url).send().await.map_err(|e| {
            ServiceError::ExternalServiceError(format!("UPC lookup request failed: {}", e))
        })?;

        let payload: UpstreamResponse = response.json().await.map_err(|e| {
            ServiceError::ExternalServiceError(format!(
                "UPC lookup returned an unreadable body: {}",
                e
            ))
        })?;

        Ok(payload.items.into_iter().next().map(normalize))
    }
}

fn normalize(item: UpstreamItem) -> LookupResult {
    let UpstreamItem {
        title,
        images,
        brand,
    } = item;
    let brand = brand.trim().to_string();

    LookupResult {
        name: title,
        image_url: images.into_iter().next().unwrap_or_default(),
        supplier: (!brand.is_empty()).then_some(brand),
    }
}
