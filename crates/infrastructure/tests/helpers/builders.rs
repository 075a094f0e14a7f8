#![allow(dead_code)]
use async_trait::async_trait;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use zonequery_application::ports::{AddressFamily, NameserverLookup};
use zonequery_domain::{DomainError, QueryOptions, QueryTarget, RecordType, ZoneQuery};

/// Query options with short timers for loopback tests.
pub fn fast_options() -> QueryOptions {
    QueryOptions {
        timeout: Duration::from_millis(300),
        ..QueryOptions::default()
    }
}

pub fn a_query(options: QueryOptions) -> ZoneQuery {
    ZoneQuery::new("example.com", "www.example.com", RecordType::A, options).unwrap()
}

pub fn target_for(addr: SocketAddr) -> QueryTarget {
    QueryTarget::new("ns1.example.com.", addr.ip())
}

/// A closed TCP port on loopback: bound, then released.
pub async fn closed_tcp_port() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Fixed NS and address data, keyed by zone and host.
#[derive(Default)]
pub struct StaticNameserverLookup {
    ns: HashMap<String, Vec<String>>,
    addresses: HashMap<String, Vec<IpAddr>>,
}

impl StaticNameserverLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zone(mut self, zone: &str, names: &[&str]) -> Self {
        self.ns
            .insert(zone.to_string(), names.iter().map(|n| n.to_string()).collect());
        self
    }

    pub fn host(mut self, host: &str, addrs: &[IpAddr]) -> Self {
        self.addresses
            .entry(host.to_string())
            .or_default()
            .extend_from_slice(addrs);
        self
    }
}

#[async_trait]
impl NameserverLookup for StaticNameserverLookup {
    async fn lookup_ns(&self, zone: &str) -> Result<Vec<String>, DomainError> {
        self.ns.get(zone).cloned().ok_or_else(|| DomainError::Resolution {
            zone: zone.to_string(),
            reason: "NXDOMAIN".to_string(),
        })
    }

    async fn lookup_addresses(
        &self,
        host: &str,
        family: AddressFamily,
    ) -> Result<Vec<IpAddr>, DomainError> {
        Ok(self
            .addresses
            .get(host)
            .map(|addrs| {
                addrs
                    .iter()
                    .copied()
                    .filter(|a| match family {
                        AddressFamily::V4 => a.is_ipv4(),
                        AddressFamily::V6 => a.is_ipv6(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}
