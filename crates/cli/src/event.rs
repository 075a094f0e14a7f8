//! Serverless entry point.
//!
//! A function runtime hands over a JSON event instead of argv. The event
//! carries the same knobs as the command line; transport is pinned to IPv4
//! since function runtimes commonly lack IPv6 egress.

use serde::{Deserialize, Deserializer};
use std::time::Duration;
use tracing::info;
use zonequery_application::use_cases::QueryAllAuthoritiesUseCase;
use zonequery_domain::config::QueryConfig;
use zonequery_domain::{
    ClientSubnet, DomainError, IpVersion, QueryOptions, RecordType, Section, ZoneQuery,
};

#[derive(Debug, Clone, Deserialize)]
pub struct EventRequest {
    pub zone: String,
    pub qname: String,
    pub qtype: String,
    #[serde(default)]
    pub tcp: bool,
    #[serde(default)]
    pub notcpfallback: bool,
    #[serde(default)]
    pub noedns: bool,
    #[serde(default, deserialize_with = "number_or_string")]
    pub bufsize: Option<u16>,
    #[serde(default)]
    pub dnssec: bool,
    #[serde(default)]
    pub nsid: bool,
    #[serde(default)]
    pub subnet: Option<String>,
    #[serde(default, deserialize_with = "number_or_string")]
    pub timeout: Option<u64>,
    #[serde(default, deserialize_with = "number_or_string")]
    pub retries: Option<u8>,
    #[serde(default)]
    pub section: Option<String>,
}

/// Event payloads often carry numbers as strings.
fn number_or_string<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr + TryFrom<u64>,
    T::Err: std::fmt::Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => T::try_from(n)
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("number {} out of range", n))),
        Some(Raw::Text(s)) => s.trim().parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}

impl EventRequest {
    pub fn to_query(&self, defaults: &QueryConfig) -> Result<ZoneQuery, DomainError> {
        let qtype: RecordType = self
            .qtype
            .parse()
            .map_err(DomainError::InvalidRecordType)?;
        let client_subnet = self
            .subnet
            .as_deref()
            .map(str::parse::<ClientSubnet>)
            .transpose()?;
        let section = self
            .section
            .as_deref()
            .map(str::parse::<Section>)
            .transpose()?
            .unwrap_or_default();

        let options = QueryOptions {
            edns_bufsize: if self.noedns {
                None
            } else {
                Some(self.bufsize.unwrap_or(defaults.bufsize))
            },
            nsid: self.nsid,
            client_subnet,
            dnssec_ok: self.dnssec,
            timeout: Duration::from_secs(self.timeout.unwrap_or(defaults.timeout)),
            retries: self.retries.unwrap_or(defaults.retries),
            tcp_fallback: !self.notcpfallback,
            tcp_only: self.tcp,
            ip_version: IpVersion::V4Only,
            section,
        };

        ZoneQuery::new(self.zone.as_str(), self.qname.as_str(), qtype, options)
    }
}

/// Runs one event through the use case and returns the batch as JSON.
pub async fn handle_event(
    use_case: &QueryAllAuthoritiesUseCase,
    event: serde_json::Value,
    defaults: &QueryConfig,
) -> anyhow::Result<serde_json::Value> {
    info!(event = %event, "Received event");
    let request: EventRequest = serde_json::from_value(event)?;
    let query = request.to_query(defaults)?;
    let batch = use_case.execute(query).await?;
    Ok(serde_json::to_value(&batch)?)
}
