//! DNS Message Builder
//!
//! Constructs authoritative-style query messages in wire format using
//! `hickory-proto`: recursion desired is cleared, class is IN, and the EDNS
//! pseudo-record carries whatever options the query asks for.

use super::record_type_map::RecordTypeMapper;
use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query};
use hickory_proto::rr::rdata::opt::{ClientSubnet as EcsOption, EdnsCode, EdnsOption};
use hickory_proto::rr::{DNSClass, Name};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::str::FromStr;
use zonequery_domain::{DomainError, QueryOptions, ZoneQuery};

const EDNS_VERSION: u8 = 0;

/// Builds DNS query messages in wire format
pub struct MessageBuilder;

impl MessageBuilder {
    /// Builds the query for `query` under a fresh random ID.
    ///
    /// The ID is returned alongside the bytes; the same bytes are reused for
    /// every UDP attempt and the TCP fallback, so responses to any of them
    /// match.
    pub fn build_query(query: &ZoneQuery) -> Result<(u16, Vec<u8>), DomainError> {
        let id = fastrand::u16(..);
        let bytes = Self::build_query_with_id(query, id)?;
        Ok((id, bytes))
    }

    pub fn build_query_with_id(query: &ZoneQuery, id: u16) -> Result<Vec<u8>, DomainError> {
        let message = Self::build_message(query, id)?;
        Self::serialize_message(&message)
    }

    pub fn build_message(query: &ZoneQuery, id: u16) -> Result<Message, DomainError> {
        let name = Name::from_str(&query.qname).map_err(|e| {
            DomainError::InvalidDomainName(format!("Invalid domain '{}': {}", query.qname, e))
        })?;

        let mut question = Query::new();
        question.set_name(name);
        question.set_query_type(RecordTypeMapper::to_hickory(&query.qtype));
        question.set_query_class(DNSClass::IN);

        let mut message = Message::new();
        message
            .set_id(id)
            .set_message_type(MessageType::Query)
            .set_op_code(OpCode::Query)
            .set_recursion_desired(false);
        message.add_query(question);

        if let Some(edns) = Self::build_edns(&query.options) {
            message.set_edns(edns);
        }

        Ok(message)
    }

    /// `None` when EDNS is disabled; NSID, client subnet and DO are then
    /// dropped along with it.
    fn build_edns(options: &QueryOptions) -> Option<Edns> {
        let payload = options.edns_bufsize?;

        let mut edns = Edns::new();
        edns.set_version(EDNS_VERSION);
        edns.set_max_payload(payload);
        edns.set_dnssec_ok(options.dnssec_ok);

        if options.nsid {
            edns.options_mut()
                .insert(EdnsOption::Unknown(u16::from(EdnsCode::NSID), Vec::new()));
        }
        if let Some(subnet) = &options.client_subnet {
            edns.options_mut().insert(EdnsOption::Subnet(EcsOption::new(
                subnet.address,
                subnet.source_prefix,
                0,
            )));
        }

        Some(edns)
    }

    /// Serialize a Message to wire format bytes
    fn serialize_message(message: &Message) -> Result<Vec<u8>, DomainError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);

        message.emit(&mut encoder).map_err(|e| {
            DomainError::MessageEncoding(e.to_string())
        })?;

        Ok(buf)
    }
}
