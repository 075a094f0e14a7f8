//! Wire-level adapters: DNS message encoding, UDP/TCP transports, the
//! per-target query state machine and system nameserver discovery.
pub mod dns;

pub use dns::{DnsQueryExecutor, SystemNameserverLookup};
