use crate::ports::NameResolver;
use crate::services::TunnelCodec;
use dohtunnel_domain::{
    DnsStatus, DomainError, Envelope, Reassembler, RecordType, TunnelQuery, TunnelRequest,
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Client half of the tunnel: sends one request through a relay and
/// rebuilds the envelope from the TXT answers.
pub struct FetchThroughTunnelUseCase {
    resolver: Arc<dyn NameResolver>,
    codec: TunnelCodec,
    relay_domain: String,
    data_label: String,
}

impl FetchThroughTunnelUseCase {
    pub fn new(
        resolver: Arc<dyn NameResolver>,
        codec: TunnelCodec,
        relay_domain: impl Into<String>,
        data_label: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            codec,
            relay_domain: relay_domain.into(),
            data_label: data_label.into(),
        }
    }

    pub fn query_name(&self, request: &TunnelRequest) -> String {
        format!(
            "{}.{}.{}",
            self.codec.encode_request(request),
            self.data_label,
            self.relay_domain.trim_end_matches('.')
        )
    }

    #[instrument(skip_all, fields(method = %request.method, url = %request.url))]
    pub async fn execute(&self, request: &TunnelRequest) -> Result<Envelope, DomainError> {
        let query = TunnelQuery::new(self.query_name(request), RecordType::TXT);
        let answers = self.resolver.resolve(&query).await?;

        if answers.status() != DnsStatus::NoError {
            return Err(DomainError::QueryRejected(answers.status()));
        }

        let mut buffer = Reassembler::new();
        for chunk in answers.chunks() {
            buffer.insert(chunk.clone())?;
        }

        if buffer.is_empty() {
            return Err(DomainError::IncompleteStream(
                "relay returned no answers".to_string(),
            ));
        }

        debug!(chunks = buffer.len(), "Reassembling tunnel answers");

        let encoded = buffer.finish()?;
        self.codec.decode_envelope(&encoded)
    }
}
