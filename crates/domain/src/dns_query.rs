use super::{ClientSubnet, DomainError, RecordType};
use crate::validators::validate_domain_name;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 3;
pub const DEFAULT_RETRIES: u8 = 2;
pub const DEFAULT_EDNS_BUFSIZE: u16 = 1420;
pub const MIN_EDNS_BUFSIZE: u16 = 512;

/// Which address families of a nameserver are queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IpVersion {
    V4Only,
    V6Only,
    #[default]
    Both,
}

impl IpVersion {
    pub fn wants_v4(&self) -> bool {
        !matches!(self, IpVersion::V6Only)
    }

    pub fn wants_v6(&self) -> bool {
        !matches!(self, IpVersion::V4Only)
    }
}

/// Response section filter applied during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Answer,
    Authority,
    Additional,
    #[default]
    All,
}

impl Section {
    pub fn includes(&self, other: Section) -> bool {
        *self == Section::All || *self == other
    }
}

impl FromStr for Section {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "answer" => Ok(Section::Answer),
            "authority" => Ok(Section::Authority),
            "additional" => Ok(Section::Additional),
            "all" => Ok(Section::All),
            _ => Err(DomainError::InvalidOption(format!(
                "unknown section '{}' (expected answer, authority, additional or all)",
                s
            ))),
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Answer => "answer",
            Section::Authority => "authority",
            Section::Additional => "additional",
            Section::All => "all",
        };
        f.write_str(name)
    }
}

/// Per-query knobs shared by every target of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOptions {
    /// EDNS(0) UDP payload size; `None` sends a plain DNS query.
    pub edns_bufsize: Option<u16>,
    pub nsid: bool,
    pub client_subnet: Option<ClientSubnet>,
    pub dnssec_ok: bool,
    /// Per-attempt timeout, applied to every UDP attempt and the TCP exchange.
    pub timeout: Duration,
    /// Total number of UDP attempts (at least 1).
    pub retries: u8,
    pub tcp_fallback: bool,
    pub tcp_only: bool,
    pub ip_version: IpVersion,
    pub section: Section,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            edns_bufsize: Some(DEFAULT_EDNS_BUFSIZE),
            nsid: false,
            client_subnet: None,
            dnssec_ok: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retries: DEFAULT_RETRIES,
            tcp_fallback: true,
            tcp_only: false,
            ip_version: IpVersion::Both,
            section: Section::All,
        }
    }
}

impl QueryOptions {
    pub fn edns_enabled(&self) -> bool {
        self.edns_bufsize.is_some()
    }

    /// Upper bound on how long one target can take: every UDP attempt plus
    /// one TCP exchange.
    pub fn worst_case_duration(&self) -> Duration {
        self.timeout * (u32::from(self.retries) + 1)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.timeout.is_zero() {
            return Err(DomainError::InvalidOption(
                "timeout must be greater than zero".into(),
            ));
        }
        if self.retries == 0 {
            return Err(DomainError::InvalidOption(
                "retries must be at least 1".into(),
            ));
        }
        if let Some(size) = self.edns_bufsize {
            if size < MIN_EDNS_BUFSIZE {
                return Err(DomainError::InvalidOption(format!(
                    "EDNS buffer size {} is below the minimum of {}",
                    size, MIN_EDNS_BUFSIZE
                )));
            }
        }
        Ok(())
    }
}

/// The immutable input of one run: which zone to sweep and what to ask.
///
/// Names use `Arc<str>` so the value can be shared by every spawned query task.
#[derive(Debug, Clone)]
pub struct ZoneQuery {
    pub zone: Arc<str>,
    pub qname: Arc<str>,
    pub qtype: RecordType,
    pub options: QueryOptions,
}

impl ZoneQuery {
    pub fn new(
        zone: impl Into<Arc<str>>,
        qname: impl Into<Arc<str>>,
        qtype: RecordType,
        options: QueryOptions,
    ) -> Result<Self, DomainError> {
        let zone = zone.into();
        let qname = qname.into();

        validate_domain_name(&zone)
            .map_err(|e| DomainError::InvalidDomainName(format!("zone '{}': {}", zone, e)))?;
        validate_domain_name(&qname)
            .map_err(|e| DomainError::InvalidDomainName(format!("qname '{}': {}", qname, e)))?;
        options.validate()?;

        Ok(Self {
            zone,
            qname,
            qtype,
            options,
        })
    }
}
