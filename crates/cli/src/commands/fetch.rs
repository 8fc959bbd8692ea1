use anyhow::Context;
use dohtunnel_application::services::TunnelCodec;
use dohtunnel_application::use_cases::FetchThroughTunnelUseCase;
use dohtunnel_domain::{Config, Envelope, TunnelRequest};
use dohtunnel_infrastructure::DohJsonResolver;
use std::io::Write;
use std::sync::Arc;
use tracing::info;

pub struct FetchArgs {
    pub url: String,
    pub relay: String,
    pub domain: Option<String>,
    pub method: String,
    pub headers: Vec<String>,
    pub data: Option<String>,
}

/// Prints the relayed status line and headers to stderr and the body to stdout.
pub async fn fetch(config: &Config, args: FetchArgs) -> anyhow::Result<()> {
    let request = build_request(&args)?;
    let domain = args
        .domain
        .unwrap_or_else(|| config.tunnel.own_domain.clone());

    let resolver = DohJsonResolver::new(
        args.relay.as_str(),
        config.relay.timeout(),
        config.relay.max_body_bytes,
    )?;
    let client = FetchThroughTunnelUseCase::new(
        Arc::new(resolver),
        TunnelCodec::from_config(&config.tunnel),
        domain.as_str(),
        config.tunnel.data_label.as_str(),
    );

    info!(
        relay = %args.relay,
        query_name_len = client.query_name(&request).len(),
        "Sending tunnel query"
    );

    match client
        .execute(&request)
        .await
        .with_context(|| format!("tunnel query via {} failed", args.relay))?
    {
        Envelope::Response(response) => {
            eprintln!("HTTP {}", response.status);
            for (name, value) in &response.headers {
                eprintln!("{}: {}", name, value);
            }
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&response.body)?;
            stdout.flush()?;
            Ok(())
        }
        Envelope::Error { error, status } => {
            anyhow::bail!("relay reported error {}: {}", status, error)
        }
    }
}

fn build_request(args: &FetchArgs) -> anyhow::Result<TunnelRequest> {
    let mut request =
        TunnelRequest::get(args.url.as_str()).with_method(args.method.to_ascii_uppercase());

    for raw in &args.headers {
        let (name, value) = raw
            .split_once(':')
            .with_context(|| format!("header {:?} is not \"Name: value\"", raw))?;
        request = request.with_header(name.trim(), value.trim());
    }

    if let Some(data) = &args.data {
        request = request.with_body(data.as_bytes().to_vec());
    }

    Ok(request)
}
