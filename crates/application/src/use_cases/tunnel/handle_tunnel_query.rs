use crate::ports::{HttpRelay, NameResolver};
use crate::services::TunnelCodec;
use dohtunnel_domain::{
    split, AnswerSet, Config, ConfigError, DnsStatus, DomainError, LoopGuard, RecordType,
    TunnelQuery,
};
use futures::FutureExt;
use std::net::IpAddr;
use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, instrument, warn};

/// Per-deployment values the router needs at query time.
#[derive(Debug, Clone)]
pub struct TunnelSettings {
    pub own_domain: String,
    pub data_label: String,
    pub max_chunk_size: NonZeroUsize,
    pub answer_ttl: u32,
    pub relay_timeout: Duration,
    pub dummy_address: IpAddr,
    pub address_ttl: u32,
}

impl TunnelSettings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let dummy_address = config.dns.dummy_address.parse().map_err(|_| {
            ConfigError::Validation(format!(
                "dns.dummy_address '{}' is not an IP address",
                config.dns.dummy_address
            ))
        })?;

        Ok(Self {
            own_domain: config.tunnel.own_domain.clone(),
            data_label: config.tunnel.data_label.clone(),
            max_chunk_size: config.tunnel.chunk_size(),
            answer_ttl: config.tunnel.answer_ttl,
            relay_timeout: config.relay.timeout(),
            dummy_address,
            address_ttl: config.dns.address_ttl,
        })
    }
}

/// What the presentation layer renders for one inbound query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// No name was supplied; a human-readable usage text.
    Info(String),
    Answers(AnswerSet),
}

pub struct HandleTunnelQueryUseCase {
    relay: Arc<dyn HttpRelay>,
    passthrough: Option<Arc<dyn NameResolver>>,
    codec: TunnelCodec,
    guard: LoopGuard,
    settings: TunnelSettings,
}

impl HandleTunnelQueryUseCase {
    pub fn new(relay: Arc<dyn HttpRelay>, codec: TunnelCodec, settings: TunnelSettings) -> Self {
        Self {
            relay,
            passthrough: None,
            codec,
            guard: LoopGuard::new(&settings.own_domain),
            settings,
        }
    }

    pub fn with_passthrough(mut self, resolver: Arc<dyn NameResolver>) -> Self {
        self.passthrough = Some(resolver);
        self
    }

    pub fn settings(&self) -> &TunnelSettings {
        &self.settings
    }

    #[instrument(skip_all, fields(name = %query.name, record_type = ?query.record_type))]
    pub async fn execute(&self, query: &TunnelQuery) -> QueryOutcome {
        if !query.has_name() {
            return QueryOutcome::Info(self.info_text());
        }

        let start = Instant::now();

        let result = AssertUnwindSafe(self.route(query)).catch_unwind().await;

        let answers = match result {
            Ok(Ok(answers)) => answers,
            Ok(Err(e)) => {
                let status = e.dns_status();
                if status == DnsStatus::ServFail {
                    error!(error = %e, "Tunnel query failed");
                } else {
                    debug!(error = %e, status = %status, "Tunnel query rejected");
                }
                AnswerSet::empty(status)
            }
            Err(_) => {
                error!("Tunnel pipeline panicked");
                AnswerSet::empty(DnsStatus::ServFail)
            }
        };

        debug!(
            status = %answers.status(),
            answers = answers.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Tunnel query answered"
        );

        QueryOutcome::Answers(answers)
    }

    async fn route(&self, query: &TunnelQuery) -> Result<AnswerSet, DomainError> {
        match query.record_type {
            Some(RecordType::TXT) => self.handle_txt(query).await,
            Some(RecordType::A) => Ok(AnswerSet::from_addresses(
                query.name.clone(),
                self.settings.address_ttl,
                &[self.settings.dummy_address],
            )),
            _ => Ok(AnswerSet::empty(DnsStatus::NoError)),
        }
    }

    async fn handle_txt(&self, query: &TunnelQuery) -> Result<AnswerSet, DomainError> {
        let labels = query.labels();

        match self.payload_label(&labels) {
            Some(payload) => self.relay_tunnel(query, payload).await,
            None => self.handle_plain_name(query).await,
        }
    }

    /// First label of a `<payload>.<data_label>.<own_domain>` name. Any other
    /// suffix is not a tunnel name.
    fn payload_label<'a>(&self, labels: &[&'a str]) -> Option<&'a str> {
        if labels.len() < 3 || !labels[1].eq_ignore_ascii_case(&self.settings.data_label) {
            return None;
        }

        let suffix = labels[2..].join(".");
        if suffix.eq_ignore_ascii_case(self.guard.own_domain()) {
            Some(labels[0])
        } else {
            None
        }
    }

    async fn handle_plain_name(&self, query: &TunnelQuery) -> Result<AnswerSet, DomainError> {
        self.guard.check_query_name(&query.name)?;

        match &self.passthrough {
            Some(resolver) => resolver
                .resolve(query)
                .await
                .map_err(|e| DomainError::PassthroughFailed(e.to_string())),
            None => {
                debug!("Not a tunnel query, answering empty");
                Ok(AnswerSet::empty(DnsStatus::NoError))
            }
        }
    }

    async fn relay_tunnel(
        &self,
        query: &TunnelQuery,
        payload: &str,
    ) -> Result<AnswerSet, DomainError> {
        let request = self.codec.decode_request(payload)?;

        debug!(
            method = %request.method,
            url = %request.url,
            has_body = request.body.is_some(),
            "Tunnel request decoded"
        );

        self.guard.check_target(&request.url)?;

        let timeout = self.settings.relay_timeout;
        let relayed = match tokio::time::timeout(timeout, self.relay.call(&request, timeout)).await
        {
            Ok(result) => result,
            Err(_) => Err(DomainError::Timeout(timeout)),
        };

        let encoded = match relayed {
            Ok(response) => {
                debug!(
                    status = response.status,
                    body_len = response.body.len(),
                    "Relay call completed"
                );
                self.codec.encode_response(&response)
            }
            Err(e) if e.is_tunneled() => {
                warn!(error = %e, url = %request.url, "Relay call failed");
                self.codec.encode_error(&e.to_string())
            }
            Err(e) => return Err(e),
        };

        let chunks = split(&encoded, self.settings.max_chunk_size);

        debug!(
            encoded_len = encoded.len(),
            chunks = chunks.len(),
            "Envelope chunked"
        );

        Ok(AnswerSet::from_chunks(
            query.name.clone(),
            self.settings.answer_ttl,
            chunks,
        ))
    }

    fn info_text(&self) -> String {
        format!(
            "DNS tunnel relay - operational\n\n\
             Usage: ?name=<payload>.{label}.{domain}&type=TXT\n\
             Payload: {encoding}-encoded JSON {{\"method\":\"GET\",\"url\":\"https://example.com/\"}}\n\
             Example: ?name=example.com&type=A\n",
            label = self.settings.data_label,
            domain = self.settings.own_domain,
            encoding = self.codec.encoding().as_str(),
        )
    }
}
