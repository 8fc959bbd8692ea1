use dohtunnel_api::AppState;
use dohtunnel_application::ports::NameResolver;
use dohtunnel_application::services::TunnelCodec;
use dohtunnel_application::use_cases::{HandleTunnelQueryUseCase, TunnelSettings};
use dohtunnel_domain::{Config, LoopGuard};
use dohtunnel_infrastructure::{DohJsonResolver, ReqwestRelayClient};
use std::sync::Arc;
use tracing::info;

pub struct Services {
    pub handle_query: Arc<HandleTunnelQueryUseCase>,
}

impl Services {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let guard = LoopGuard::new(&config.tunnel.own_domain);
        let relay = Arc::new(ReqwestRelayClient::new(&config.relay, guard.clone())?);
        let codec = TunnelCodec::from_config(&config.tunnel);
        let settings = TunnelSettings::from_config(config)?;

        let mut use_case = HandleTunnelQueryUseCase::new(relay, codec, settings);

        if let Some(upstream) = &config.dns.passthrough_upstream {
            guard.check_target(upstream)?;
            let resolver: Arc<dyn NameResolver> = Arc::new(DohJsonResolver::new(
                upstream.as_str(),
                config.relay.timeout(),
                config.relay.max_body_bytes,
            )?);
            use_case = use_case.with_passthrough(resolver);
            info!(upstream = %upstream, "Passthrough resolver enabled");
        }

        info!(
            own_domain = %config.tunnel.own_domain,
            data_label = %config.tunnel.data_label,
            encoding = config.tunnel.encoding.as_str(),
            envelope = config.tunnel.envelope.as_str(),
            "Tunnel configured"
        );

        Ok(Self {
            handle_query: Arc::new(use_case),
        })
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            handle_query: self.handle_query.clone(),
        }
    }
}
