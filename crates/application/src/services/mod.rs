mod address_resolver;
mod fan_out;

pub use address_resolver::{AddressResolver, ResolvedNameservers};
pub use fan_out::{FanOutScheduler, DEFAULT_CONCURRENCY};
