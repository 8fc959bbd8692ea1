use dohtunnel_application::use_cases::HandleTunnelQueryUseCase;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub handle_query: Arc<HandleTunnelQueryUseCase>,
}
