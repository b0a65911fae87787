//! pitunnel - publish a Raspberry Pi sensor server through a Cloudflare Tunnel

use clap::Parser;

use pitunnel_cli::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = cli.run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
