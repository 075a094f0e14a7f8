use async_trait::async_trait;
use zonequery_domain::{QueryOutcome, QueryTarget, ZoneQuery};

/// Performs one logical DNS query against one target.
///
/// Never fails as a call: transport problems come back as a failure
/// outcome for that target, so one bad server cannot abort the batch.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, target: &QueryTarget, query: &ZoneQuery) -> QueryOutcome;
}
