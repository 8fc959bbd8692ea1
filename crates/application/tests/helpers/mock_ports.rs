#![allow(dead_code)]
#![allow(unused_imports)]

use async_trait::async_trait;
use dohtunnel_application::ports::{HttpRelay, NameResolver};
use dohtunnel_application::services::TunnelCodec;
use dohtunnel_application::use_cases::{HandleTunnelQueryUseCase, QueryOutcome, TunnelSettings};
use dohtunnel_domain::config::{EnvelopeFormat, LabelEncoding};
use dohtunnel_domain::{
    AnswerSet, Config, DnsStatus, DomainError, TunnelQuery, TunnelRequest, TunnelResponse,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
enum RelayBehavior {
    Respond(TunnelResponse),
    Fail(DomainError),
    Hang,
    Panic,
}

/// Records every call and answers with a fixed behaviour.
#[derive(Clone)]
pub struct MockHttpRelay {
    behavior: Arc<Mutex<RelayBehavior>>,
    calls: Arc<Mutex<Vec<TunnelRequest>>>,
}

impl MockHttpRelay {
    pub fn new() -> Self {
        Self::responding(TunnelResponse::new(200, BTreeMap::new(), b"ok".to_vec()))
    }

    pub fn responding(response: TunnelResponse) -> Self {
        Self {
            behavior: Arc::new(Mutex::new(RelayBehavior::Respond(response))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(error: DomainError) -> Self {
        let relay = Self::new();
        *relay.behavior.lock().unwrap() = RelayBehavior::Fail(error);
        relay
    }

    /// Never completes on its own.
    pub fn hanging() -> Self {
        let relay = Self::new();
        *relay.behavior.lock().unwrap() = RelayBehavior::Hang;
        relay
    }

    pub fn panicking() -> Self {
        let relay = Self::new();
        *relay.behavior.lock().unwrap() = RelayBehavior::Panic;
        relay
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<TunnelRequest> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockHttpRelay {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpRelay for MockHttpRelay {
    async fn call(
        &self,
        request: &TunnelRequest,
        _timeout: Duration,
    ) -> Result<TunnelResponse, DomainError> {
        self.calls.lock().unwrap().push(request.clone());
        let behavior = self.behavior.lock().unwrap().clone();

        match behavior {
            RelayBehavior::Respond(response) => Ok(response),
            RelayBehavior::Fail(error) => Err(error),
            RelayBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(DomainError::InternalFault("hang elapsed".to_string()))
            }
            RelayBehavior::Panic => panic!("relay exploded"),
        }
    }
}

/// Passthrough resolver answering from a fixed result.
pub struct MockNameResolver {
    result: Result<AnswerSet, DomainError>,
    queries: Mutex<Vec<String>>,
}

impl MockNameResolver {
    pub fn answering(answers: AnswerSet) -> Self {
        Self {
            result: Ok(answers),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: DomainError) -> Self {
        Self {
            result: Err(error),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl NameResolver for MockNameResolver {
    async fn resolve(&self, query: &TunnelQuery) -> Result<AnswerSet, DomainError> {
        self.queries.lock().unwrap().push(query.name.to_string());
        self.result.clone()
    }
}

/// Resolver that hands queries straight to an in-process relay use case.
pub struct LoopbackResolver {
    relay: Arc<HandleTunnelQueryUseCase>,
}

impl LoopbackResolver {
    pub fn new(relay: Arc<HandleTunnelQueryUseCase>) -> Self {
        Self { relay }
    }
}

#[async_trait]
impl NameResolver for LoopbackResolver {
    async fn resolve(&self, query: &TunnelQuery) -> Result<AnswerSet, DomainError> {
        match self.relay.execute(query).await {
            QueryOutcome::Answers(answers) => Ok(answers),
            QueryOutcome::Info(_) => Ok(AnswerSet::empty(DnsStatus::NoError)),
        }
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.tunnel.own_domain = "relay.test".to_string();
    config.relay.timeout_secs = 10;
    config
}

pub fn hex_codec() -> TunnelCodec {
    TunnelCodec::new(LabelEncoding::Hex, EnvelopeFormat::Json, 8)
}

pub fn settings() -> TunnelSettings {
    TunnelSettings::from_config(&test_config()).unwrap()
}

pub fn settings_with_timeout(timeout: Duration) -> TunnelSettings {
    TunnelSettings {
        relay_timeout: timeout,
        ..settings()
    }
}

pub fn tunnel_name(codec: &TunnelCodec, request: &TunnelRequest) -> String {
    format!("{}.data.relay.test", codec.encode_request(request))
}
