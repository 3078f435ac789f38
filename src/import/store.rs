//! Persistence seam for the import engine.

use anyhow::Result;
use async_trait::async_trait;

use super::types::NewBird;

/// Record-creation capability supplied by the host application.
///
/// The reconciler awaits each call to completion before moving to the next
/// row; implementations must not assume calls overlap. Errors are captured
/// verbatim into the failing row's report entry and never abort the batch.
#[async_trait]
pub trait BirdStore: Send + Sync {
    /// Create a bird record and return its new id.
    async fn create_bird(&self, bird: NewBird) -> Result<i64>;

    /// Attach a band identifier to an existing bird.
    async fn create_band_identifier(&self, bird_id: i64, value: &str) -> Result<()>;

    /// Create a breed record and return its new id.
    async fn create_breed(&self, name: &str, code: Option<&str>) -> Result<i64>;
}
