use async_trait::async_trait;
use reqwest::Client;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;
use tracing::debug;

use crate::errors::CoreError;
use crate::models::reference::ReferenceData;
use super::traits::ReferenceSource;

/// Reference data served as a static JSON file over HTTP.
///
/// - **Shape**: `{ "categories": [...], "paymentMethods": [...], "transactions": [...] }`,
///   every array optional.
/// - **Timeout**: 30 s (native only).
/// - **Retries**: none; a failed fetch is reported once.
pub struct HttpReferenceSource {
    client: Client,
    url: String,
}

impl HttpReferenceSource {
    pub fn new(url: impl Into<String>) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ReferenceSource for HttpReferenceSource {
    fn name(&self) -> &str {
        "HTTP"
    }

    async fn fetch(&self) -> Result<ReferenceData, CoreError> {
        debug!(url = %self.url, "Fetching reference data");

        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Reference {
                source_name: self.name().into(),
                message: format!("HTTP status {status}"),
            });
        }

        response.json().await.map_err(|e| CoreError::Reference {
            source_name: self.name().into(),
            message: format!("Failed to parse reference data: {e}"),
        })
    }
}
