use std::sync::Arc;
use tracing::{info, instrument};
use zonequery_domain::{DomainError, ResponseNormalizer, ResultBatch, ZoneQuery};

use crate::ports::{NameserverLookup, QueryExecutor};
use crate::services::{AddressResolver, FanOutScheduler};

/// Asks every authoritative server of a zone the same question.
///
/// Pipeline: resolve nameservers → flatten to targets → fan out →
/// normalize → assemble the batch.
pub struct QueryAllAuthoritiesUseCase {
    resolver: AddressResolver,
    scheduler: FanOutScheduler,
}

impl QueryAllAuthoritiesUseCase {
    pub fn new(lookup: Arc<dyn NameserverLookup>, executor: Arc<dyn QueryExecutor>) -> Self {
        Self {
            resolver: AddressResolver::new(lookup),
            scheduler: FanOutScheduler::new(executor),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.scheduler = self.scheduler.with_concurrency(concurrency);
        self
    }

    /// Only a failed NS lookup is an error; per-target failures are part of
    /// the returned batch.
    #[instrument(skip(self, query), fields(zone = %query.zone, qname = %query.qname, qtype = %query.qtype))]
    pub async fn execute(&self, query: ZoneQuery) -> Result<ResultBatch, DomainError> {
        let resolved = self
            .resolver
            .resolve_nameservers(&query.zone, query.options.ip_version)
            .await?;

        let targets = resolved.nameservers.targets();
        let mut batch = ResultBatch::new(&query, resolved.nameservers);
        batch.info = resolved.info;

        let qtype = query.qtype;
        let section = query.options.section;
        let outcomes = self.scheduler.run(&targets, Arc::new(query)).await;

        batch.responses = outcomes
            .into_iter()
            .map(|outcome| ResponseNormalizer::normalize(outcome, qtype, section))
            .collect();

        info!(
            nameservers = batch.nslist.len(),
            targets = targets.len(),
            succeeded = batch.success_count(),
            failed = batch.failure_count(),
            consistent = batch.is_consistent(),
            "Zone query complete"
        );

        Ok(batch)
    }
}
