mod http_relay;
mod name_resolver;

pub use http_relay::HttpRelay;
pub use name_resolver::NameResolver;

// Re-export for convenience
pub use dohtunnel_domain::{TunnelQuery, TunnelRequest, TunnelResponse};
