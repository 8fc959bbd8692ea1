pub mod tunnel;

// Re-export use cases
pub use tunnel::{
    FetchThroughTunnelUseCase, HandleTunnelQueryUseCase, QueryOutcome, TunnelSettings,
};
