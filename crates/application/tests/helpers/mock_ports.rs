#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use zonequery_application::ports::{AddressFamily, NameserverLookup, QueryExecutor};
use zonequery_domain::{
    DomainError, QueryErrorKind, QueryOutcome, QueryTarget, ResponseData, Rrset, Sections,
    ZoneQuery,
};

pub fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

// ============================================================================
// Mock NameserverLookup
// ============================================================================

#[derive(Clone, Default)]
pub struct MockNameserverLookup {
    ns: Arc<RwLock<HashMap<String, Vec<String>>>>,
    addresses: Arc<RwLock<HashMap<(String, AddressFamily), Vec<IpAddr>>>>,
    failing: Arc<RwLock<HashSet<(String, AddressFamily)>>>,
}

impl MockNameserverLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_ns(&self, zone: &str, names: &[&str]) {
        self.ns.write().await.insert(
            zone.to_string(),
            names.iter().map(|n| n.to_string()).collect(),
        );
    }

    /// Registers addresses; the family is taken from each address.
    pub async fn set_addresses(&self, host: &str, addrs: &[&str]) {
        let mut map = self.addresses.write().await;
        for addr in addrs {
            let addr = ip(addr);
            let family = if addr.is_ipv4() {
                AddressFamily::V4
            } else {
                AddressFamily::V6
            };
            map.entry((host.to_string(), family)).or_default().push(addr);
        }
    }

    pub async fn fail_addresses(&self, host: &str, family: AddressFamily) {
        self.failing
            .write()
            .await
            .insert((host.to_string(), family));
    }
}

#[async_trait]
impl NameserverLookup for MockNameserverLookup {
    async fn lookup_ns(&self, zone: &str) -> Result<Vec<String>, DomainError> {
        self.ns
            .read()
            .await
            .get(zone)
            .cloned()
            .ok_or_else(|| DomainError::Resolution {
                zone: zone.to_string(),
                reason: "NXDOMAIN".to_string(),
            })
    }

    async fn lookup_addresses(
        &self,
        host: &str,
        family: AddressFamily,
    ) -> Result<Vec<IpAddr>, DomainError> {
        let key = (host.to_string(), family);
        if self.failing.read().await.contains(&key) {
            return Err(DomainError::AddressLookup {
                host: host.to_string(),
                reason: "SERVFAIL".to_string(),
            });
        }
        Ok(self
            .addresses
            .read()
            .await
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }
}

// ============================================================================
// Mock QueryExecutor
// ============================================================================

#[derive(Clone)]
pub enum Scripted {
    Answer(Vec<&'static str>),
    Fail(QueryErrorKind),
    Panic,
}

#[derive(Clone)]
struct Script {
    delay: Duration,
    reply: Scripted,
}

/// Answers per target address after a configurable delay, and records how
/// many executions overlapped.
#[derive(Clone, Default)]
pub struct MockQueryExecutor {
    scripts: Arc<RwLock<HashMap<IpAddr, Script>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
}

impl MockQueryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn script(&self, addr: &str, delay_ms: u64, reply: Scripted) {
        self.scripts.write().await.insert(
            ip(addr),
            Script {
                delay: Duration::from_millis(delay_ms),
                reply,
            },
        );
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn a_response(rdata: &[&str]) -> ResponseData {
    ResponseData {
        size: 64,
        rtt: 1.0,
        rcode: "NOERROR".to_string(),
        flags: "QR AA".to_string(),
        id: 1,
        nsid: None,
        subnet: None,
        short_answers: String::new(),
        sections: Sections {
            answer: Some(vec![Rrset {
                rrname: "www.example.com.".to_string(),
                rrtype: "A".to_string(),
                ttl: 300,
                rdata: rdata.iter().map(|s| s.to_string()).collect(),
            }]),
            authority: None,
            additional: None,
        },
    }
}

#[async_trait]
impl QueryExecutor for MockQueryExecutor {
    async fn execute(&self, target: &QueryTarget, _query: &ZoneQuery) -> QueryOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let script = self.scripts.read().await.get(&target.address).cloned();
        let script = script.unwrap_or(Script {
            delay: Duration::ZERO,
            reply: Scripted::Fail(QueryErrorKind::Timeout),
        });

        tokio::time::sleep(script.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match script.reply {
            Scripted::Answer(rdata) => QueryOutcome::success(target.clone(), a_response(&rdata)),
            Scripted::Fail(kind) => QueryOutcome::failure(target.clone(), kind, "scripted failure"),
            Scripted::Panic => panic!("scripted panic for {}", target.address),
        }
    }
}
