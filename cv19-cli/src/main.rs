//! cv19 CLI - Command line tool for charting COVID-19 data by county.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "cv19-cli",
    version,
    about = "COVID-19 county chart toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: cv19_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("cv19-cli {}", env!("CARGO_PKG_VERSION"));
    cv19_cmd::run(cli.command).await
}
