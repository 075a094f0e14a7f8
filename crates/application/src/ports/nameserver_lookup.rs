use async_trait::async_trait;
use std::fmt;
use std::net::IpAddr;
use zonequery_domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    V4,
    V6,
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::V4 => f.write_str("A"),
            AddressFamily::V6 => f.write_str("AAAA"),
        }
    }
}

/// Host-level name resolution used to discover a zone's servers.
#[async_trait]
pub trait NameserverLookup: Send + Sync {
    /// NS target names of `zone`. Any failure here is fatal for the run.
    async fn lookup_ns(&self, zone: &str) -> Result<Vec<String>, DomainError>;

    /// Addresses of `host` in one family. A name without records of that
    /// family yields an empty list, not an error.
    async fn lookup_addresses(
        &self,
        host: &str,
        family: AddressFamily,
    ) -> Result<Vec<IpAddr>, DomainError>;
}
