pub mod dns;
pub mod errors;
pub mod logging;
pub mod relay;
pub mod root;
pub mod server;
pub mod tunnel;

pub use dns::DnsConfig;
pub use errors::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use relay::RelayConfig;
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
pub use tunnel::{EnvelopeFormat, LabelEncoding, TunnelConfig};
