//! lanshare
//!
//! Share a directory with phones and laptops on the same network.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::path::PathBuf;

use clap::Parser;
use env_logger::Env;
use log::{info, warn};

use lanshare::server::DEFAULT_PORT;
use lanshare::{HttpServer, ServerConfig};

/// Share a directory over the local network: browse, download and upload.
#[derive(Parser, Debug)]
#[command(name = "lanshare")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory to share
    #[arg(default_value = ".", value_name = "DIR")]
    root: PathBuf,

    /// Port to listen on
    #[arg(default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Address to bind to
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    host: IpAddr,

    /// Largest accepted upload request, in bytes
    #[arg(long, default_value_t = ServerConfig::default().max_body_size)]
    max_body_size: usize,

    /// Maximum number of concurrent connections
    #[arg(long, default_value_t = ServerConfig::default().max_connections)]
    max_connections: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Best guess at the address other devices on the network can reach.
///
/// Connecting a UDP socket sends nothing; it only selects the outbound
/// interface.
fn local_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect((Ipv4Addr::new(8, 8, 8, 8), 80)).ok()?;
    socket.local_addr().ok().map(|addr| addr.ip())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    let config = ServerConfig {
        addr: SocketAddr::new(cli.host, cli.port),
        root: cli.root,
        max_connections: cli.max_connections,
        max_body_size: cli.max_body_size,
        ..ServerConfig::default()
    };

    let server = HttpServer::new(config)?;

    if cli.host.is_unspecified() {
        match local_ip() {
            Some(ip) => info!("Open http://{ip}:{port} on another device", port = cli.port),
            None => warn!("Could not determine this machine's network address"),
        }
    }
    info!("Press Ctrl+C to stop");

    server.start().await?;
    Ok(())
}
