//! Outbound HTTP for tunnel requests.
//!
//! One pooled client per relay. Redirects are followed up to the configured
//! hop limit, but never onto the relay's own domain. Response bodies are read
//! incrementally and the call fails once the configured cap is crossed. The
//! deadline passed to [`HttpRelay::call`] covers connect, headers and body.

use async_trait::async_trait;
use dohtunnel_application::ports::HttpRelay;
use dohtunnel_domain::config::RelayConfig;
use dohtunnel_domain::{DomainError, LoopGuard, TunnelRequest, TunnelResponse};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::{Action, Attempt, Policy};
use std::collections::BTreeMap;
use std::error::Error as _;
use std::time::Duration;
use tracing::debug;

const DEFAULT_USER_AGENT: &str = concat!("dohtunnel/", env!("CARGO_PKG_VERSION"));

pub struct ReqwestRelayClient {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl ReqwestRelayClient {
    pub fn new(config: &RelayConfig, guard: LoopGuard) -> Result<Self, DomainError> {
        let user_agent = config
            .user_agent
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .pool_max_idle_per_host(4)
            .user_agent(user_agent)
            .redirect(redirect_policy(guard, config.max_redirects))
            .build()
            .map_err(|e| DomainError::InternalFault(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            client,
            max_body_bytes: config.max_body_bytes,
        })
    }

    fn build(&self, request: &TunnelRequest) -> Result<reqwest::RequestBuilder, DomainError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes()).map_err(|_| {
            DomainError::RelayError {
                cause: format!("invalid method {}", request.method),
            }
        })?;

        let mut headers = HeaderMap::with_capacity(request.headers.len());
        for (name, value) in &request.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|_| DomainError::RelayError {
                    cause: format!("invalid header name {:?}", name),
                })?;
            let header_value = HeaderValue::from_str(value).map_err(|_| DomainError::RelayError {
                cause: format!("invalid value for header {}", name),
            })?;
            headers.append(header_name, header_value);
        }

        let mut builder = self.client.request(method, &request.url).headers(headers);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }
        Ok(builder)
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<TunnelResponse, DomainError> {
        let mut response = builder.send().await.map_err(relay_error)?;

        if let Some(len) = response.content_length() {
            if len > self.max_body_bytes as u64 {
                return Err(DomainError::BodyTooLarge {
                    limit: self.max_body_bytes,
                });
            }
        }

        let status = response.status().as_u16();
        let headers = flatten_headers(response.headers());

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(relay_error)? {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(DomainError::BodyTooLarge {
                    limit: self.max_body_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(TunnelResponse::new(status, headers, body))
    }
}

#[async_trait]
impl HttpRelay for ReqwestRelayClient {
    async fn call(
        &self,
        request: &TunnelRequest,
        timeout: Duration,
    ) -> Result<TunnelResponse, DomainError> {
        debug!(
            method = %request.method,
            url = %request.url,
            body_len = request.body.as_ref().map_or(0, Vec::len),
            "Sending relay request"
        );

        let builder = self.build(request)?;

        let response = tokio::time::timeout(timeout, self.send(builder))
            .await
            .map_err(|_| DomainError::Timeout(timeout))??;

        debug!(
            url = %request.url,
            status = response.status,
            body_len = response.body.len(),
            "Relay response received"
        );

        Ok(response)
    }
}

fn redirect_policy(guard: LoopGuard, max_redirects: usize) -> Policy {
    Policy::custom(move |attempt: Attempt| -> Action {
        if attempt.previous().len() >= max_redirects {
            return attempt.error(format!("too many redirects (limit {})", max_redirects));
        }

        let host = attempt.url().host_str().unwrap_or_default().to_string();
        if guard.matches_own_domain(&host) {
            return attempt.error(format!("redirect to {} points back at the relay", host));
        }

        attempt.follow()
    })
}

/// Repeated header values are joined with ", ". Non-UTF-8 values are
/// converted lossily.
fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut flat = BTreeMap::new();
    for name in headers.keys() {
        let joined = headers
            .get_all(name)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(", ");
        flat.insert(name.as_str().to_string(), joined);
    }
    flat
}

fn relay_error(err: reqwest::Error) -> DomainError {
    let mut cause = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        cause.push_str(": ");
        cause.push_str(&inner.to_string());
        source = inner.source();
    }
    DomainError::RelayError { cause }
}
