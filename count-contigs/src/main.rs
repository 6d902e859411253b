//! # count-contigs CLI Entry Point
//!
//! The main executable for the `count-contigs` tool. This file drives the application
//! lifecycle:
//!
//! 1. **Initialization**: Parses command-line arguments using [`cli::Cli`] and merges them
//!    with the optional config file.
//! 2. **Authentication**: Builds a [`CountContigsClient`], validating the token or logging in
//!    when credentials are given.
//! 3. **Execution**: Calls `count_contigs`.
//! 4. **Presentation**: Prints the resulting record or the error to standard output/error.

mod cli;
mod config;
mod formatter;

use clap::Parser;
use cli::Cli;
use config::FileConfig;
use count_contigs_core::client::{ClientConfig, CountContigsClient};
use formatter::{FormattedString, GenericError};
use std::process;
use tracing_subscriber::EnvFilter;
use url::Url;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    let file_config = match args.config.as_deref().map(FileConfig::load).transpose() {
        Ok(file_config) => file_config.unwrap_or_default(),
        Err(err) => exit_with(GenericError("Failed to load config:", format!("{err:#}"))),
    };

    let (url, config) = match config::resolve(&args, file_config) {
        Ok(resolved) => resolved,
        Err(err) => exit_with(GenericError("Invalid configuration:", format!("{err:#}"))),
    };

    tracing::debug!(url = %url, ?config, "resolved configuration");

    let client = connect_or_exit(url, config, &args).await;

    match client.count_contigs(&args.workspace, &args.contigset_id).await {
        Ok(results) => println!("{}", FormattedString::from(results)),
        Err(err) => exit_with(err),
    }
}

async fn connect_or_exit(url: Url, config: ClientConfig, args: &Cli) -> CountContigsClient {
    let client = match (&args.user, &args.password, &args.token) {
        (Some(user), Some(password), _) => {
            CountContigsClient::with_credentials(url, user, password, config).await
        }
        (_, _, Some(token)) => CountContigsClient::with_token(url, token, config).await,
        _ => CountContigsClient::with_config(url, config),
    };

    match client {
        Ok(client) => client,
        Err(err) => exit_with(err),
    }
}

fn exit_with(err: impl Into<FormattedString>) -> ! {
    eprintln!("{}", err.into());
    process::exit(1);
}
