//! AutoToll - toll collection operations console
//!
//! A CLI for the toll backend: submit captures, watch traffic,
//! and work the manual review queue.

mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::Cli;

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = commands::execute(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
