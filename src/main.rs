use anyhow::Context;
use clap::Parser;

use peloton::adapter::inbound::cli::command::Cli;
use peloton::adapter::inbound::cli::{output, run};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    if let Err(e) = run::execute(cli).await.context("peloton failed") {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
