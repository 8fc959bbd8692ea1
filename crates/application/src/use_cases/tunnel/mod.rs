mod fetch_through_tunnel;
mod handle_tunnel_query;

pub use fetch_through_tunnel::FetchThroughTunnelUseCase;
pub use handle_tunnel_query::{HandleTunnelQueryUseCase, QueryOutcome, TunnelSettings};
