use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::reference::ReferenceData;
use super::traits::ReferenceSource;

/// Reference data bundled in memory as JSON text (tests, offline builds).
///
/// The text is parsed on every fetch, so a malformed document is reported
/// the same way a bad HTTP response would be.
pub struct StaticReferenceSource {
    json: String,
}

impl StaticReferenceSource {
    pub fn new(json: impl Into<String>) -> Self {
        Self { json: json.into() }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ReferenceSource for StaticReferenceSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self) -> Result<ReferenceData, CoreError> {
        serde_json::from_str(&self.json).map_err(|e| CoreError::Reference {
            source_name: self.name().into(),
            message: format!("Failed to parse reference data: {e}"),
        })
    }
}
