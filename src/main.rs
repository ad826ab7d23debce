use clap::Parser;
use kube_radar::cli::Cli;
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    cli.init_logging();

    if let Err(e) = kube_radar::run_command(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
