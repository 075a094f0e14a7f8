use std::sync::Arc;
use tracing::{debug, instrument, warn};
use zonequery_domain::{DomainError, IpVersion, NameserverList, NameserverRecord};

use crate::ports::{AddressFamily, NameserverLookup};

/// Nameservers of a zone plus the non-fatal problems met on the way.
#[derive(Debug, Clone, Default)]
pub struct ResolvedNameservers {
    pub nameservers: NameserverList,
    pub info: Vec<String>,
}

/// Turns a zone name into its authoritative servers and their addresses.
pub struct AddressResolver {
    lookup: Arc<dyn NameserverLookup>,
}

impl AddressResolver {
    pub fn new(lookup: Arc<dyn NameserverLookup>) -> Self {
        Self { lookup }
    }

    /// Address families to look up, in the order their addresses are listed.
    pub fn families(ip_version: IpVersion) -> Vec<AddressFamily> {
        let mut families = Vec::with_capacity(2);
        if ip_version.wants_v6() {
            families.push(AddressFamily::V6);
        }
        if ip_version.wants_v4() {
            families.push(AddressFamily::V4);
        }
        families
    }

    /// NS hostnames come back de-duplicated and sorted case-insensitively;
    /// that order is the resolution order of the whole run.
    ///
    /// Fails only when the NS lookup itself fails. Address lookup errors for
    /// a single host are recorded in `info` and leave that host with fewer
    /// (possibly zero) addresses.
    #[instrument(skip(self))]
    pub async fn resolve_nameservers(
        &self,
        zone: &str,
        ip_version: IpVersion,
    ) -> Result<ResolvedNameservers, DomainError> {
        let mut names = self.lookup.lookup_ns(zone).await?;
        names.sort_by_key(|name| name.to_ascii_lowercase());
        names.dedup_by(|a, b| a.eq_ignore_ascii_case(b));

        if names.is_empty() {
            return Err(DomainError::Resolution {
                zone: zone.to_string(),
                reason: "no NS records found".to_string(),
            });
        }

        debug!(zone = %zone, nameservers = names.len(), "NS set resolved");

        let families = Self::families(ip_version);
        let mut info = Vec::new();
        let mut records = Vec::with_capacity(names.len());

        for name in names {
            let mut record = NameserverRecord::new(name.as_str());
            for family in &families {
                match self.lookup.lookup_addresses(&name, *family).await {
                    Ok(addresses) => {
                        for addr in addresses {
                            record.push_address(addr);
                        }
                    }
                    Err(e) => {
                        let msg = format!(
                            "Couldn't resolve NS address for {} {}: {}",
                            name, family, e
                        );
                        warn!(nameserver = %name, family = %family, error = %e, "Address lookup failed");
                        info.push(msg);
                    }
                }
            }

            if record.addresses.is_empty() {
                debug!(nameserver = %name, "Nameserver has no usable addresses");
            }
            records.push(record);
        }

        Ok(ResolvedNameservers {
            nameservers: NameserverList(records),
            info,
        })
    }
}
