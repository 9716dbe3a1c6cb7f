mod config;
mod converters;
mod error;
mod llm_client;
mod logging;
mod models;
mod request_id;
mod router;

use clap::Parser;
use config::{API_KEY_ENV, Config};
use router::{AppState, PROXY_PATH};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{Level, info, warn};

#[derive(Parser, Debug)]
#[command(name = "gemini-proxy")]
#[command(about = "Forwards prompts to the Gemini API, keeping the API key server-side")]
struct Args {
    #[arg(short, long, default_value = "0.0.0.0")]
    ip: String,

    #[arg(short, long, default_value = "8888")]
    port: u16,

    /// trace, debug, info, warn, error
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Also write logs to this file (capped at 10 MiB)
    #[arg(long)]
    log_file: Option<String>,

    /// socks and http proxy for upstream calls, example: socks5://192.168.0.2:10080
    #[arg(long)]
    proxy: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = Level::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using INFO level.", args.log_level);
        Level::INFO
    });
    logging::init_logging(log_level, args.log_file.as_deref());

    // Read once here and handed to the handler; requests still get a 500
    // when it is missing.
    let config = Config::from_env();
    if config.api_key.is_none() {
        warn!("{} environment variable is not set.", API_KEY_ENV);
    }

    let client_builder = reqwest::Client::builder();
    let client_builder = if let Some(proxy) = &args.proxy {
        client_builder.proxy(reqwest::Proxy::all(proxy)?)
    } else {
        client_builder
    };
    let http_client = Arc::new(client_builder.build()?);

    let app = router::app(AppState::new(config, http_client));

    let bind_address = format!("{}:{}", args.ip, args.port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Server started on http://{}{}", bind_address, PROXY_PATH);

    axum::serve(listener, app).await?;
    Ok(())
}
