use crate::dns_query::{
    DEFAULT_EDNS_BUFSIZE, DEFAULT_RETRIES, DEFAULT_TIMEOUT_SECS, MIN_EDNS_BUFSIZE,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONCURRENCY: usize = 32;
pub const DEFAULT_DNS_PORT: u16 = 53;

/// `[query]` table: defaults that command-line flags override.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryConfig {
    /// Per-attempt timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Number of UDP attempts per target
    #[serde(default = "default_retries")]
    pub retries: u8,

    /// EDNS(0) UDP payload size
    #[serde(default = "default_bufsize")]
    pub bufsize: u16,

    /// Maximum number of targets queried at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Destination port of every query
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            retries: default_retries(),
            bufsize: default_bufsize(),
            concurrency: default_concurrency(),
            port: default_port(),
        }
    }
}

impl QueryConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout == 0 {
            return Err("query.timeout must be greater than zero".into());
        }
        if self.retries == 0 {
            return Err("query.retries must be at least 1".into());
        }
        if self.bufsize < MIN_EDNS_BUFSIZE {
            return Err(format!(
                "query.bufsize must be at least {}",
                MIN_EDNS_BUFSIZE
            ));
        }
        if self.concurrency == 0 {
            return Err("query.concurrency must be at least 1".into());
        }
        Ok(())
    }
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_retries() -> u8 {
    DEFAULT_RETRIES
}

fn default_bufsize() -> u16 {
    DEFAULT_EDNS_BUFSIZE
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_port() -> u16 {
    DEFAULT_DNS_PORT
}
