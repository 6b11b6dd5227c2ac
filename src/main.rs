use clap::Parser;
use wetbulb_monitor::cli::{run, Cli};
use wetbulb_monitor::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
