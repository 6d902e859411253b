//! # CLI
//!
//! This module defines the command-line interface of `count-contigs` using `clap`.
//!
//! It is responsible for parsing user input and performing validation (e.g., ensuring the
//! service URL is a valid URL and that a password accompanies a user name).
use clap::Parser;
use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(
    name = "count-contigs",
    version,
    about = "Count the contigs of a ContigSet using the wjr_count_contigs service"
)]
pub struct Cli {
    /// The service URL (e.g. https://kbase.us/services/wjr_count_contigs)
    #[arg(long, env = "COUNT_CONTIGS_URL", value_parser = parse_url)]
    pub url: Option<Url>,

    /// Name of the workspace holding the ContigSet
    pub workspace: String,

    /// Identifier of the ContigSet to count
    pub contigset_id: String,

    /// Authentication token. Ignored when --user is given
    #[arg(short, long, env = "KB_AUTH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// User name to log in with (requires --password)
    #[arg(short, long, requires = "password")]
    pub user: Option<String>,

    /// Password for --user
    #[arg(long, env = "KB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Base URL of the authentication service
    #[arg(long, value_parser = parse_url)]
    pub auth_url: Option<Url>,

    /// Read timeout in milliseconds (0 disables the timeout)
    #[arg(long)]
    pub read_timeout_ms: Option<u64>,

    /// Allow plain http connections
    #[arg(long)]
    pub insecure_http: bool,

    /// Trust every TLS certificate, including self-signed ones
    #[arg(long)]
    pub trust_all_certs: bool,

    /// Stream the request body to the server in chunks
    #[arg(long)]
    pub streaming: bool,

    /// Path to a JSON file with connection settings. Flags take precedence.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

fn parse_url(value: &str) -> Result<Url, String> {
    Url::parse(value).map_err(|e| format!("Invalid URL '{value}': {e}"))
}
