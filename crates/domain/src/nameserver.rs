use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::net::IpAddr;
use std::sync::Arc;

/// An authoritative server of the zone and the addresses it resolved to.
///
/// `addresses` may be empty when no address matched the IP version filter;
/// such a server is still reported, it just contributes no query targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameserverRecord {
    pub name: Arc<str>,
    pub addresses: Vec<IpAddr>,
}

impl NameserverRecord {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            addresses: Vec::new(),
        }
    }

    /// Appends an address unless it is already present, keeping lookup order.
    pub fn push_address(&mut self, addr: IpAddr) {
        if !self.addresses.contains(&addr) {
            self.addresses.push(addr);
        }
    }
}

/// One unit of work: a single address of a single nameserver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QueryTarget {
    #[serde(rename = "name")]
    pub nsname: Arc<str>,
    #[serde(rename = "ip")]
    pub address: IpAddr,
}

impl QueryTarget {
    pub fn new(nsname: impl Into<Arc<str>>, address: IpAddr) -> Self {
        Self {
            nsname: nsname.into(),
            address,
        }
    }
}

/// Ordered nameserver → addresses mapping of a run.
///
/// Serialized as a JSON object whose keys keep resolution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameserverList(pub Vec<NameserverRecord>);

impl NameserverList {
    /// Flattens the list into query targets: hostnames in list order, then
    /// addresses in lookup order within each hostname.
    pub fn targets(&self) -> Vec<QueryTarget> {
        self.0
            .iter()
            .flat_map(|ns| {
                ns.addresses
                    .iter()
                    .map(move |addr| QueryTarget::new(Arc::clone(&ns.name), *addr))
            })
            .collect()
    }

    pub fn address_count(&self) -> usize {
        self.0.iter().map(|ns| ns.addresses.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NameserverRecord> {
        self.0.iter()
    }
}

impl Serialize for NameserverList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for ns in &self.0 {
            map.serialize_entry(ns.name.as_ref(), &ns.addresses)?;
        }
        map.end()
    }
}
