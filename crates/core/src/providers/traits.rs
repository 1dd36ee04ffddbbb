use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::reference::ReferenceData;

/// Trait abstraction for wherever the static reference data comes from.
///
/// Reference data (categories, payment methods, seed transactions) is
/// read-only: sources are fetched, never written to. Cancellation is by
/// dropping the future.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ReferenceSource: Send + Sync {
    /// Human-readable name of this source (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch and parse the whole reference document.
    async fn fetch(&self) -> Result<ReferenceData, CoreError>;
}
