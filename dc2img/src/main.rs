use anyhow::Context;
use clap::Parser;
use indicatif::MultiProgress;
use std::process;

mod api;
mod cli;
mod download;
mod extract;
mod history;
mod logging;
mod models;
mod progress;
mod services;
mod settings;

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();

    let progress = MultiProgress::new();
    if let Err(e) = logging::init(args.log_level, &progress) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let config = settings::load_settings()
        .map(|settings| settings::merge_settings_with_args(&args, settings))
        .and_then(|args| settings::RunConfig::try_from(args).context("Invalid configuration"));

    let result = match config {
        Ok(config) => services::run(config, &progress).await.map(|_| ()),
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
