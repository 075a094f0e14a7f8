pub mod executor;
pub mod forwarding;
pub mod nameservers;
pub mod transport;

pub use executor::DnsQueryExecutor;
pub use nameservers::SystemNameserverLookup;
