use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid record type: {0}")]
    InvalidRecordType(String),

    #[error("Invalid client subnet: {0}")]
    InvalidSubnet(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// NS or zone lookup failure. Fatal for the whole run.
    #[error("Couldn't query NS list for {zone}: {reason}")]
    Resolution { zone: String, reason: String },

    #[error("Address lookup failed for {host}: {reason}")]
    AddressLookup { host: String, reason: String },

    #[error("Timeout waiting for response from {server}")]
    TransportTimeout { server: String },

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Failed to encode DNS message: {0}")]
    MessageEncoding(String),

    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("Response ID {received} does not match query ID {expected}")]
    IdMismatch { expected: u16, received: u16 },
}

impl DomainError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, DomainError::TransportTimeout { .. })
    }

    /// Errors raised by the DNS payload itself rather than the socket carrying it.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            DomainError::MessageEncoding(_)
                | DomainError::InvalidDnsResponse(_)
                | DomainError::IdMismatch { .. }
        )
    }
}
