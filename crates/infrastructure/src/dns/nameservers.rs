use async_trait::async_trait;
use hickory_proto::rr::{RData, RecordType};
use hickory_resolver::{ResolveError, TokioResolver};
use std::net::IpAddr;
use tracing::debug;
use zonequery_application::ports::{AddressFamily, NameserverLookup};
use zonequery_domain::DomainError;

/// Zone and address discovery through the host's configured resolvers.
pub struct SystemNameserverLookup {
    resolver: TokioResolver,
}

impl SystemNameserverLookup {
    /// Reads the system resolver configuration (`/etc/resolv.conf` on Unix).
    pub fn from_system_conf() -> Result<Self, DomainError> {
        let resolver = TokioResolver::builder_tokio()
            .map_err(|e| DomainError::IoError(format!("Failed to read system resolver configuration: {}", e)))?
            .build();
        Ok(Self { resolver })
    }

    /// Names are looked up as absolute, so search domains never apply.
    fn absolute(name: &str) -> String {
        if name.ends_with('.') {
            name.to_string()
        } else {
            format!("{}.", name)
        }
    }
}

fn reason(error: &ResolveError) -> String {
    if error.is_nx_domain() {
        "NXDOMAIN".to_string()
    } else {
        error.to_string()
    }
}

#[async_trait]
impl NameserverLookup for SystemNameserverLookup {
    async fn lookup_ns(&self, zone: &str) -> Result<Vec<String>, DomainError> {
        let lookup = match self.resolver.lookup(Self::absolute(zone), RecordType::NS).await {
            Ok(lookup) => lookup,
            Err(e) if e.is_no_records_found() && !e.is_nx_domain() => return Ok(Vec::new()),
            Err(e) => {
                return Err(DomainError::Resolution {
                    zone: zone.to_string(),
                    reason: reason(&e),
                })
            }
        };

        let names: Vec<String> = lookup
            .iter()
            .filter_map(|rdata| match rdata {
                RData::NS(ns) => Some(ns.0.to_string()),
                _ => None,
            })
            .collect();

        debug!(zone = %zone, nameservers = names.len(), "NS lookup complete");
        Ok(names)
    }

    async fn lookup_addresses(
        &self,
        host: &str,
        family: AddressFamily,
    ) -> Result<Vec<IpAddr>, DomainError> {
        let record_type = match family {
            AddressFamily::V4 => RecordType::A,
            AddressFamily::V6 => RecordType::AAAA,
        };

        let lookup = match self.resolver.lookup(Self::absolute(host), record_type).await {
            Ok(lookup) => lookup,
            Err(e) if e.is_no_records_found() && !e.is_nx_domain() => return Ok(Vec::new()),
            Err(e) => {
                return Err(DomainError::AddressLookup {
                    host: host.to_string(),
                    reason: reason(&e),
                })
            }
        };

        // CNAME targets can ride along in the lookup; only addresses count.
        let addresses = lookup
            .iter()
            .filter_map(|rdata| match rdata {
                RData::A(a) => Some(IpAddr::V4(a.0)),
                RData::AAAA(aaaa) => Some(IpAddr::V6(aaaa.0)),
                _ => None,
            })
            .collect();
        Ok(addresses)
    }
}
