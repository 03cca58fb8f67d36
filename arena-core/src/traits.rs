use async_trait::async_trait;

use crate::domain::{FrameworkId, ModelId, ResultRecord};

/// A per-framework adapter that turns a task into a normalized record.
///
/// Implementations never fail: every failure path resolves into a valid
/// [`ResultRecord`], either a degraded mock record or an "unavailable"
/// record carrying an error message.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn framework(&self) -> &FrameworkId;

    async fn execute(&self, task: &str, model: &ModelId) -> ResultRecord;
}
