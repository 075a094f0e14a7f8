use crate::DomainError;
use ipnetwork::IpNetwork;
use serde::{Serialize, Serializer};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// EDNS Client Subnet value sent with each query (RFC 7871).
///
/// The stored address is already masked to `source_prefix`, which is what
/// goes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientSubnet {
    pub address: IpAddr,
    pub source_prefix: u8,
}

impl ClientSubnet {
    pub fn validate_cidr(cidr: &str) -> Result<(), String> {
        if cidr.is_empty() {
            return Err("CIDR cannot be empty".to_string());
        }

        if !cidr.contains('/') {
            return Err("CIDR must include prefix (e.g., 1.2.3.4/24)".to_string());
        }

        Ok(())
    }

    /// Address family code used in the ECS option (1 = IPv4, 2 = IPv6).
    pub fn family(&self) -> u16 {
        match self.address {
            IpAddr::V4(_) => 1,
            IpAddr::V6(_) => 2,
        }
    }
}

impl FromStr for ClientSubnet {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::validate_cidr(s).map_err(DomainError::InvalidSubnet)?;

        let network: IpNetwork = s
            .parse()
            .map_err(|e| DomainError::InvalidSubnet(format!("{}: {}", s, e)))?;

        Ok(Self {
            address: network.network(),
            source_prefix: network.prefix(),
        })
    }
}

impl fmt::Display for ClientSubnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.source_prefix)
    }
}

impl Serialize for ClientSubnet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
