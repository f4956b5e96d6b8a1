use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use weather_gateway::{GatewayConfig, WeatherGateway, telemetry, web};

/// Weather aggregation gateway
#[derive(Debug, Parser)]
#[command(name = "weather-gateway", version, about)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = GatewayConfig::load_from_path(cli.config)?;
    let _telemetry = telemetry::init(&config.logging)?;

    let gateway = WeatherGateway::from_config(&config.provider)?;
    web::run(&config.server, gateway).await
}
