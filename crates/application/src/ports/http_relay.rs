use async_trait::async_trait;
use dohtunnel_domain::{DomainError, TunnelRequest, TunnelResponse};
use std::time::Duration;

#[async_trait]
pub trait HttpRelay: Send + Sync {
    /// Issues exactly one outbound HTTP call for `request`.
    ///
    /// Fails with `Timeout` when the call does not complete within `timeout`,
    /// `RelayError` on transport failure and `BodyTooLarge` when the response
    /// body exceeds the configured cap.
    async fn call(
        &self,
        request: &TunnelRequest,
        timeout: Duration,
    ) -> Result<TunnelResponse, DomainError>;
}
