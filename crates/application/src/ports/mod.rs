mod nameserver_lookup;
mod query_executor;

pub use nameserver_lookup::{AddressFamily, NameserverLookup};
pub use query_executor::QueryExecutor;
