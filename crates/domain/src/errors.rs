use crate::DnsStatus;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Malformed tunnel label: {0}")]
    MalformedLabel(String),

    #[error("Invalid tunnel payload: {0}")]
    InvalidPayload(String),

    #[error("Loop detected: {host} resolves to the relay's own domain")]
    LoopDetected { host: String },

    #[error("Relay timeout after {0:?}")]
    Timeout(Duration),

    #[error("Relay error: {cause}")]
    RelayError { cause: String },

    #[error("Response body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(String),

    #[error("Incomplete chunk stream: {0}")]
    IncompleteStream(String),

    #[error("Invalid query type: {0}")]
    InvalidQueryType(String),

    #[error("Relay answered {0}")]
    QueryRejected(DnsStatus),

    #[error("Passthrough resolution failed: {0}")]
    PassthroughFailed(String),

    #[error("Internal fault: {0}")]
    InternalFault(String),
}

impl DomainError {
    /// Relay-stage failures are reported to the client as an error envelope
    /// rather than through the DNS status code.
    pub fn is_tunneled(&self) -> bool {
        matches!(
            self,
            DomainError::Timeout(_) | DomainError::RelayError { .. } | DomainError::BodyTooLarge { .. }
        )
    }

    pub fn dns_status(&self) -> DnsStatus {
        match self {
            DomainError::MalformedLabel(_)
            | DomainError::InvalidPayload(_)
            | DomainError::LoopDetected { .. } => DnsStatus::NxDomain,

            DomainError::Timeout(_)
            | DomainError::RelayError { .. }
            | DomainError::BodyTooLarge { .. } => DnsStatus::NoError,

            _ => DnsStatus::ServFail,
        }
    }
}
