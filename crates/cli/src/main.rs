use clap::{Parser, Subcommand};
use dohtunnel_domain::CliOverrides;
use std::net::SocketAddr;
use tracing::info;

mod bootstrap;
mod commands;
mod di;
mod server;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "dohtunnel")]
#[command(version)]
#[command(about = "HTTP relay tunneled through DoH-JSON TXT queries")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// HTTP port
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Domain this relay answers for
    #[arg(long, global = true)]
    own_domain: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Send one HTTP request through a relay and print the response
    Fetch {
        /// Target URL
        url: String,

        /// DoH-JSON endpoint of the relay, e.g. https://relay.example/dns-query
        #[arg(long)]
        relay: String,

        /// Tunnel domain of the relay (defaults to tunnel.own_domain)
        #[arg(long)]
        domain: Option<String>,

        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// Request header as "Name: value", repeatable
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Request body
        #[arg(short = 'd', long)]
        data: Option<String>,
    },

    /// Write the effective configuration to a TOML file
    InitConfig {
        #[arg(default_value = "dohtunnel.toml")]
        path: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        port: cli.port,
        bind_address: cli.bind.clone(),
        own_domain: cli.own_domain.clone(),
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config.logging);

    match cli.command {
        Some(Command::Fetch {
            url,
            relay,
            domain,
            method,
            headers,
            data,
        }) => {
            let args = commands::FetchArgs {
                url,
                relay,
                domain,
                method,
                headers,
                data,
            };
            commands::fetch(&config, args).await
        }
        Some(Command::InitConfig { path }) => commands::init_config(&config, &path),
        None => {
            info!("Starting dohtunnel relay v{}", env!("CARGO_PKG_VERSION"));

            let services = di::Services::new(&config)?;

            let web_addr: SocketAddr =
                format!("{}:{}", config.server.bind_address, config.server.port).parse()?;

            server::start_web_server(web_addr, services.app_state()).await?;

            info!("Server shutdown complete");
            Ok(())
        }
    }
}
