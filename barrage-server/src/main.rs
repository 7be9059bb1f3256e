//! Barrage server binary

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use barrage_config::{BarrageConfig, ConfigLoader, LogLevel};
use barrage_server::Server;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Server bind address, overrides the configured address and port
    #[arg(short, long, value_name = "ADDR")]
    bind: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Print default configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", BarrageConfig::generate_sample());
        return Ok(());
    }

    let mut config = ConfigLoader::new().load(cli.config.as_ref())?;
    apply_cli_overrides(&mut config, &cli)?;

    let server = Server::new(config)?;
    server.start().await
}

fn apply_cli_overrides(config: &mut BarrageConfig, cli: &Cli) -> Result<()> {
    if let Some(bind) = &cli.bind {
        let addr: std::net::SocketAddr = bind
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", bind, e))?;
        config.server.bind_address = addr.ip().to_string();
        config.server.port = addr.port();
    }

    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    Ok(())
}
