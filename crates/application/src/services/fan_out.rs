use futures::stream::FuturesUnordered;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};
pub use zonequery_domain::config::query::DEFAULT_CONCURRENCY;
use zonequery_domain::{QueryErrorKind, QueryOutcome, QueryTarget, ZoneQuery};

use crate::ports::QueryExecutor;

/// Runs one query per target concurrently and returns the outcomes in
/// target order.
///
/// Every target gets its own task; a semaphore caps how many of them hold
/// sockets at the same time. Outcomes are buffered and placed back into
/// target order, so completion order never leaks into the result.
pub struct FanOutScheduler {
    executor: Arc<dyn QueryExecutor>,
    concurrency: usize,
}

impl FanOutScheduler {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self {
            executor,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Waits for every target to reach a terminal state. The output has
    /// exactly one outcome per input target, at the same index.
    pub async fn run(&self, targets: &[QueryTarget], query: Arc<ZoneQuery>) -> Vec<QueryOutcome> {
        if targets.is_empty() {
            return Vec::new();
        }
        debug!(
            targets = targets.len(),
            concurrency = self.concurrency,
            worst_case = ?query.options.worst_case_duration(),
            "Dispatching queries"
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut futs = FuturesUnordered::new();

        for (index, target) in targets.iter().enumerate() {
            let executor = Arc::clone(&self.executor);
            let query = Arc::clone(&query);
            let semaphore = Arc::clone(&semaphore);
            let target = target.clone();
            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                executor.execute(&target, &query).await
            });
            futs.push(async move { (index, handle.await) });
        }

        let mut slots: Vec<Option<QueryOutcome>> = vec![None; targets.len()];
        while let Some((index, join_result)) = futs.next().await {
            match join_result {
                Ok(outcome) => slots[index] = Some(outcome),
                Err(e) => {
                    warn!(target = %targets[index].address, error = %e, "Query task panicked");
                    slots[index] = Some(QueryOutcome::failure(
                        targets[index].clone(),
                        QueryErrorKind::TransportError,
                        format!("query task failed: {}", e),
                    ));
                }
            }
        }

        slots
            .into_iter()
            .zip(targets)
            .map(|(slot, target)| {
                slot.unwrap_or_else(|| {
                    QueryOutcome::failure(
                        target.clone(),
                        QueryErrorKind::TransportError,
                        "query task produced no outcome",
                    )
                })
            })
            .collect()
    }
}
