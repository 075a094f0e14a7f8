use std::sync::Arc;
use zonequery_application::use_cases::QueryAllAuthoritiesUseCase;
use zonequery_domain::config::QueryConfig;
use zonequery_infrastructure::{DnsQueryExecutor, SystemNameserverLookup};

/// Wires the system resolver and the wire executor into the use case.
pub fn build_use_case(query_config: &QueryConfig) -> anyhow::Result<QueryAllAuthoritiesUseCase> {
    let lookup = Arc::new(SystemNameserverLookup::from_system_conf()?);
    let executor = Arc::new(DnsQueryExecutor::new().with_port(query_config.port));

    Ok(QueryAllAuthoritiesUseCase::new(lookup, executor).with_concurrency(query_config.concurrency))
}
