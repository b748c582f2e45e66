//! Configuration for the LogServ HTTP server.

use std::path::PathBuf;

use clap::Parser;

/// CLI arguments for the LogServ daemon.
#[derive(Debug, Parser)]
#[command(name = "logserv")]
#[command(about = "HTTP access to the tail of append-only log files")]
pub struct CliArgs {
    /// HTTP server port.
    #[arg(long, default_value = "1065")]
    pub port: u16,

    /// Semicolon-separated peer list; enables aggregator mode.
    #[arg(long, env = "HOSTS")]
    pub hosts: Option<String>,
}

/// Configuration for the LogServ HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP server port.
    pub port: u16,

    /// Directory that requested file paths resolve against. Requests
    /// escaping this root are rejected.
    pub root: PathBuf,

    /// Peer hosts for aggregator mode; empty for local mode.
    pub hosts: Vec<String>,
}

impl ServerConfig {
    /// Builds the server configuration from CLI arguments, binding the
    /// serve root to the process working directory.
    pub fn from_args(args: &CliArgs) -> std::io::Result<Self> {
        Ok(Self {
            port: args.port,
            root: std::env::current_dir()?,
            hosts: args.hosts.as_deref().map(parse_hosts).unwrap_or_default(),
        })
    }
}

/// Splits a `host1;host2;...` list into individual peer hosts.
pub fn parse_hosts(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .map(str::to_string)
        .collect()
}
