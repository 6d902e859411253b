use crate::cli::Cli;
use anyhow::{Context, Result, bail};
use count_contigs_core::client::ClientConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Connection settings read from a JSON config file.
#[derive(Deserialize, Default, Clone, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub url: Option<String>,
    pub auth_url: Option<String>,
    pub read_timeout_ms: Option<u64>,
    pub allow_insecure_http: bool,
    pub trust_all_certificates: bool,
    pub streaming_mode: bool,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file '{}'", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file '{}'", path.display()))
    }
}

/// Merges the config file with the command-line flags. Flags win.
pub fn resolve(cli: &Cli, file: FileConfig) -> Result<(Url, ClientConfig)> {
    let url = match (&cli.url, &file.url) {
        (Some(url), _) => url.clone(),
        (None, Some(url)) => {
            Url::parse(url).with_context(|| format!("Invalid service URL '{url}' in config"))?
        }
        (None, None) => bail!("No service URL given, use --url or set 'url' in the config file"),
    };

    let mut config = ClientConfig {
        read_timeout: file.read_timeout_ms.map(Duration::from_millis),
        allow_insecure_http: file.allow_insecure_http,
        trust_all_certificates: file.trust_all_certificates,
        streaming_mode: file.streaming_mode,
        ..Default::default()
    };

    if let Some(auth_url) = &file.auth_url {
        config.auth_url = Url::parse(auth_url)
            .with_context(|| format!("Invalid auth URL '{auth_url}' in config"))?;
    }
    if let Some(auth_url) = &cli.auth_url {
        config.auth_url = auth_url.clone();
    }
    if let Some(ms) = cli.read_timeout_ms {
        config.read_timeout = Some(Duration::from_millis(ms));
    }
    config.allow_insecure_http |= cli.insecure_http;
    config.trust_all_certificates |= cli.trust_all_certs;
    config.streaming_mode |= cli.streaming;

    Ok((url, config))
}
