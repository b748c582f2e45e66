use clap::Parser;

use logserv::server::{CliArgs, LogServer, ServerConfig};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = CliArgs::parse();
    let config = match ServerConfig::from_args(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to resolve working directory: {}", err);
            std::process::exit(1);
        }
    };

    LogServer::new(config).run().await;
}
