//! zonequery domain layer
pub mod batch;
pub mod client_subnet;
pub mod config;
pub mod dns_query;
pub mod dns_record;
pub mod errors;
pub mod nameserver;
pub mod normalizer;
pub mod outcome;
pub mod validators;

pub use batch::{QueryEcho, ResultBatch};
pub use client_subnet::ClientSubnet;
pub use config::{Config, ConfigError};
pub use dns_query::{IpVersion, QueryOptions, Section, ZoneQuery};
pub use dns_record::RecordType;
pub use errors::DomainError;
pub use nameserver::{NameserverList, NameserverRecord, QueryTarget};
pub use normalizer::ResponseNormalizer;
pub use outcome::{
    OutcomeResult, QueryErrorKind, QueryFailure, QueryOutcome, ResponseData, Rrset, Sections,
};
