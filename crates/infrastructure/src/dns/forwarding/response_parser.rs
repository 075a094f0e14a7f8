use super::record_type_map::RecordTypeMapper;
use bytes::Bytes;
use hickory_proto::op::{Header, Message, MessageType, ResponseCode};
use hickory_proto::rr::rdata::opt::{EdnsCode, EdnsOption};
use hickory_proto::rr::{DNSClass, Name, Record, RecordType as HickoryRecordType};
use std::fmt::Write;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;
use tracing::debug;
use zonequery_domain::{DomainError, ResponseData, Rrset, Sections};

/// A decoded response together with the bytes it arrived as.
#[derive(Debug, Clone)]
pub struct DnsResponse {
    pub message: Message,

    pub truncated: bool,

    /// Raw wire bytes of the response.
    pub raw_bytes: Bytes,
}

impl DnsResponse {
    pub fn size(&self) -> usize {
        self.raw_bytes.len()
    }

    pub fn rcode(&self) -> ResponseCode {
        self.message.response_code()
    }

    /// Flattens the message into comparable values. `short_answers` is left
    /// empty; normalization fills it in.
    pub fn into_response_data(self, rtt: Duration) -> ResponseData {
        let header = self.message.header();
        ResponseData {
            size: self.size(),
            rtt: ResponseParser::rtt_millis(rtt),
            rcode: ResponseParser::rcode_to_status(self.message.response_code()),
            flags: ResponseParser::flags_to_text(header),
            id: header.id(),
            nsid: ResponseParser::nsid(&self.message),
            subnet: ResponseParser::client_subnet(&self.message),
            short_answers: String::new(),
            sections: ResponseParser::sections(&self.message),
        }
    }
}

pub struct ResponseParser;

impl ResponseParser {
    /// Parses a response and checks it answers the query with `expected_id`.
    pub fn parse_bytes(response_bytes: Bytes, expected_id: u16) -> Result<DnsResponse, DomainError> {
        let message = Message::from_vec(&response_bytes).map_err(|e| {
            DomainError::InvalidDnsResponse(format!("Failed to parse DNS response: {}", e))
        })?;

        if message.message_type() != MessageType::Response {
            return Err(DomainError::InvalidDnsResponse(
                "QR bit not set in reply".to_string(),
            ));
        }
        if message.id() != expected_id {
            return Err(DomainError::IdMismatch {
                expected: expected_id,
                received: message.id(),
            });
        }

        let truncated = message.truncated();

        debug!(
            rcode = ?message.response_code(),
            answers = message.answers().len(),
            authority = message.name_servers().len(),
            additional = message.additionals().len(),
            truncated = truncated,
            "DNS response parsed"
        );

        Ok(DnsResponse {
            message,
            truncated,
            raw_bytes: response_bytes,
        })
    }

    pub fn parse(response_bytes: &[u8], expected_id: u16) -> Result<DnsResponse, DomainError> {
        Self::parse_bytes(Bytes::copy_from_slice(response_bytes), expected_id)
    }

    pub fn rcode_to_status(rcode: ResponseCode) -> String {
        let code = u16::from(rcode);
        let name = match code {
            0 => "NOERROR",
            1 => "FORMERR",
            2 => "SERVFAIL",
            3 => "NXDOMAIN",
            4 => "NOTIMP",
            5 => "REFUSED",
            6 => "YXDOMAIN",
            7 => "YXRRSET",
            8 => "NXRRSET",
            9 => "NOTAUTH",
            10 => "NOTZONE",
            16 => "BADVERS",
            _ => return format!("RCODE{}", code),
        };
        name.to_string()
    }

    /// Header flags as mnemonics in `QR AA TC RD RA AD CD` order.
    pub fn flags_to_text(header: &Header) -> String {
        let flags = [
            (header.message_type() == MessageType::Response, "QR"),
            (header.authoritative(), "AA"),
            (header.truncated(), "TC"),
            (header.recursion_desired(), "RD"),
            (header.recursion_available(), "RA"),
            (header.authentic_data(), "AD"),
            (header.checking_disabled(), "CD"),
        ];
        flags
            .iter()
            .filter(|(set, _)| *set)
            .map(|(_, name)| *name)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// NSID payload as text, or lowercase hex when it is not UTF-8.
    pub fn nsid(message: &Message) -> Option<String> {
        let edns = message.extensions().as_ref()?;
        match edns.options().get(EdnsCode::NSID)? {
            EdnsOption::Unknown(_, data) if !data.is_empty() => Some(match std::str::from_utf8(data) {
                Ok(text) => text.to_string(),
                Err(_) => hex(data),
            }),
            _ => None,
        }
    }

    /// Client subnet echo as `addr/source/scope`.
    pub fn client_subnet(message: &Message) -> Option<String> {
        let edns = message.extensions().as_ref()?;
        match edns.options().get(EdnsCode::Subnet)? {
            EdnsOption::Subnet(ecs) => Some(format!(
                "{}/{}/{}",
                ecs.addr(),
                ecs.source_prefix(),
                ecs.scope_prefix()
            )),
            EdnsOption::Unknown(_, data) => decode_client_subnet(data),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }

    pub fn sections(message: &Message) -> Sections {
        Sections {
            answer: Self::group_rrsets(message.answers()),
            authority: Self::group_rrsets(message.name_servers()),
            additional: Self::group_rrsets(message.additionals()),
        }
    }

    /// Groups records by owner, class and type in order of first appearance.
    /// The RRset TTL is the smallest TTL seen. `None` for an empty section.
    pub fn group_rrsets(records: &[Record]) -> Option<Vec<Rrset>> {
        if records.is_empty() {
            return None;
        }

        let mut keys: Vec<(&Name, DNSClass, HickoryRecordType)> = Vec::new();
        let mut rrsets: Vec<Rrset> = Vec::new();

        for record in records {
            let key = (record.name(), record.dns_class(), record.record_type());
            let rdata = record.data().to_string();
            match keys.iter().position(|k| *k == key) {
                Some(index) => {
                    let rrset = &mut rrsets[index];
                    rrset.ttl = rrset.ttl.min(record.ttl());
                    rrset.rdata.push(rdata);
                }
                None => {
                    keys.push(key);
                    rrsets.push(Rrset {
                        rrname: record.name().to_string(),
                        rrtype: RecordTypeMapper::mnemonic(record.record_type()),
                        ttl: record.ttl(),
                        rdata: vec![rdata],
                    });
                }
            }
        }

        Some(rrsets)
    }

    /// Milliseconds, rounded to microsecond precision.
    pub fn rtt_millis(rtt: Duration) -> f64 {
        (rtt.as_secs_f64() * 1_000_000.0).round() / 1_000.0
    }
}

fn hex(data: &[u8]) -> String {
    data.iter().fold(String::with_capacity(data.len() * 2), |mut out, b| {
        let _ = write!(out, "{:02x}", b);
        out
    })
}

/// RFC 7871 option body: family, source prefix, scope prefix, truncated address.
fn decode_client_subnet(data: &[u8]) -> Option<String> {
    if data.len() < 4 {
        return None;
    }
    let (head, addr_bytes) = data.split_at(4);
    let family = u16::from_be_bytes([head[0], head[1]]);
    let (source, scope) = (head[2], head[3]);

    let addr = match family {
        1 => {
            let mut octets = [0u8; 4];
            let n = addr_bytes.len().min(4);
            octets[..n].copy_from_slice(&addr_bytes[..n]);
            IpAddr::V4(Ipv4Addr::from(octets))
        }
        2 => {
            let mut octets = [0u8; 16];
            let n = addr_bytes.len().min(16);
            octets[..n].copy_from_slice(&addr_bytes[..n]);
            IpAddr::V6(Ipv6Addr::from(octets))
        }
        _ => return None,
    };

    Some(format!("{}/{}/{}", addr, source, scope))
}
