// imagedeck server entry point

use anyhow::Result;
use clap::Parser;

use imagedeck::logger::init_logger;
use imagedeck::server::{start_server, StartupConfig};

#[derive(Parser)]
#[command(name = "imagedeck")]
#[command(version, about = "Paginated, searchable gallery over a remote entity store", long_about = None)]
struct Cli {
    /// JSON-RPC endpoint of the remote entity store
    #[arg(long, env = "IMAGEDECK_RPC_URL")]
    rpc_url: String,

    /// Owner identifier scoping every query
    #[arg(long, env = "IMAGEDECK_OWNER")]
    owner: String,

    /// HTTP server host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// HTTP server port
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose, cli.quiet);

    start_server(StartupConfig {
        rpc_url: cli.rpc_url,
        owner: cli.owner,
        host: cli.host,
        port: cli.port,
    })
    .await
}
