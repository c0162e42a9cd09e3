use clap::Parser;
use edgeroute::cli::{run_cli, Cli};
use edgeroute::logging::{init_logging, LogConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&LogConfig::from_env())?;
    run_cli(cli).await
}
