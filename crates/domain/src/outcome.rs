use super::QueryTarget;
use serde::Serialize;
use std::fmt;

/// Resource records sharing owner name, class and type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rrset {
    pub rrname: String,
    pub rrtype: String,
    pub ttl: u32,
    pub rdata: Vec<String>,
}

/// Parsed response sections. A `None` section was either empty in the
/// response or removed by the section filter, and is omitted from output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Sections {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<Vec<Rrset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authority: Option<Vec<Rrset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional: Option<Vec<Rrset>>,
}

impl Sections {
    pub fn is_empty(&self) -> bool {
        self.answer.is_none() && self.authority.is_none() && self.additional.is_none()
    }
}

/// Per-target failure classes. None of them aborts the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QueryErrorKind {
    /// Every UDP attempt expired without a response.
    Timeout,
    /// TCP connect, send or receive failed (fallback or forced TCP).
    TcpFailure,
    /// Malformed response, ID mismatch, or socket-level send/receive error.
    TransportError,
}

impl fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryErrorKind::Timeout => "Timeout",
            QueryErrorKind::TcpFailure => "TcpFailure",
            QueryErrorKind::TransportError => "TransportError",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryFailure {
    #[serde(rename = "error")]
    pub kind: QueryErrorKind,
    pub detail: String,
}

impl QueryFailure {
    pub fn new(kind: QueryErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Everything a server said, reduced to comparable values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseData {
    /// Response size in octets, as received on the wire.
    pub size: usize,
    /// Round-trip time in milliseconds.
    pub rtt: f64,
    pub rcode: String,
    pub flags: String,
    pub id: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nsid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet: Option<String>,
    pub short_answers: String,
    pub sections: Sections,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutcomeResult {
    Success(ResponseData),
    Failure(QueryFailure),
}

/// Result of querying one target. Failures carry no response fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    #[serde(flatten)]
    pub target: QueryTarget,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub info: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub udp_truncated: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub tcp_fallback: bool,
    #[serde(flatten)]
    pub result: OutcomeResult,
}

impl QueryOutcome {
    pub fn success(target: QueryTarget, data: ResponseData) -> Self {
        Self {
            target,
            info: Vec::new(),
            udp_truncated: false,
            tcp_fallback: false,
            result: OutcomeResult::Success(data),
        }
    }

    pub fn failure(target: QueryTarget, kind: QueryErrorKind, detail: impl Into<String>) -> Self {
        Self {
            target,
            info: Vec::new(),
            udp_truncated: false,
            tcp_fallback: false,
            result: OutcomeResult::Failure(QueryFailure::new(kind, detail)),
        }
    }

    pub fn with_info(mut self, info: Vec<String>) -> Self {
        self.info = info;
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self.result, OutcomeResult::Success(_))
    }

    pub fn response(&self) -> Option<&ResponseData> {
        match &self.result {
            OutcomeResult::Success(data) => Some(data),
            OutcomeResult::Failure(_) => None,
        }
    }

    pub fn failure_kind(&self) -> Option<QueryErrorKind> {
        match &self.result {
            OutcomeResult::Success(_) => None,
            OutcomeResult::Failure(failure) => Some(failure.kind),
        }
    }

    pub fn short_answers(&self) -> Option<&str> {
        self.response().map(|data| data.short_answers.as_str())
    }
}
