//! dohtunnel Domain Layer
pub mod answer;
pub mod chunk;
pub mod config;
pub mod dns_status;
pub mod envelope;
pub mod errors;
pub mod loop_guard;
pub mod record_type;
pub mod tunnel_query;
pub mod tunnel_request;
pub mod tunnel_response;

pub use answer::{Answer, AnswerData, AnswerSet};
pub use chunk::{split, Chunk, Reassembler};
pub use config::{CliOverrides, Config, ConfigError};
pub use dns_status::DnsStatus;
pub use envelope::Envelope;
pub use errors::DomainError;
pub use loop_guard::LoopGuard;
pub use record_type::RecordType;
pub use tunnel_query::TunnelQuery;
pub use tunnel_request::TunnelRequest;
pub use tunnel_response::TunnelResponse;
