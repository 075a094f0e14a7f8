use super::{ClientSubnet, IpVersion, NameserverList, QueryOutcome, RecordType, Section, ZoneQuery};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

/// Query parameters as echoed in the output artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryEcho {
    pub zone: Arc<str>,
    pub qname: Arc<str>,
    pub qtype: RecordType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edns_buf_size: Option<u16>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub nsid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet: Option<ClientSubnet>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dnssec: bool,
    pub timeout: f64,
    pub retries: u8,
    pub tcp_only: bool,
    pub tcp_fallback: bool,
    pub ip_version: IpVersion,
    pub section: Section,
}

impl From<&ZoneQuery> for QueryEcho {
    fn from(query: &ZoneQuery) -> Self {
        let opts = &query.options;
        let edns = opts.edns_enabled();
        Self {
            zone: Arc::clone(&query.zone),
            qname: Arc::clone(&query.qname),
            qtype: query.qtype,
            edns_buf_size: opts.edns_bufsize,
            nsid: edns && opts.nsid,
            subnet: opts.client_subnet.filter(|_| edns),
            dnssec: edns && opts.dnssec_ok,
            timeout: opts.timeout.as_secs_f64(),
            retries: opts.retries,
            tcp_only: opts.tcp_only,
            tcp_fallback: opts.tcp_fallback,
            ip_version: opts.ip_version,
            section: opts.section,
        }
    }
}

/// Terminal artifact of a run, handed to the renderers.
///
/// `responses` holds exactly one entry per query target, grouped by
/// nameserver in `nslist` order and by address within a nameserver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultBatch {
    /// Capture time, seconds since the Unix epoch.
    pub timestamp: f64,
    pub query: QueryEcho,
    pub nslist: NameserverList,
    pub responses: Vec<QueryOutcome>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub info: Vec<String>,
}

impl ResultBatch {
    pub fn new(query: &ZoneQuery, nslist: NameserverList) -> Self {
        Self {
            timestamp: Utc::now().timestamp_micros() as f64 / 1_000_000.0,
            query: QueryEcho::from(query),
            nslist,
            responses: Vec::new(),
            info: Vec::new(),
        }
    }

    pub fn success_count(&self) -> usize {
        self.responses.iter().filter(|r| r.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.responses.len() - self.success_count()
    }

    /// True when every successful response carries the same `short_answers`.
    pub fn is_consistent(&self) -> bool {
        let mut answers = self.responses.iter().filter_map(|r| r.short_answers());
        match answers.next() {
            Some(first) => answers.all(|a| a == first),
            None => true,
        }
    }
}
