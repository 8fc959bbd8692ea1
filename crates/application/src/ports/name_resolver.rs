use async_trait::async_trait;
use dohtunnel_domain::{AnswerSet, DomainError, TunnelQuery};

/// Resolves a name/type pair against a DoH-JSON endpoint.
#[async_trait]
pub trait NameResolver: Send + Sync {
    async fn resolve(&self, query: &TunnelQuery) -> Result<AnswerSet, DomainError>;
}
