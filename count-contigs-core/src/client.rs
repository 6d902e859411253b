//! # Count Contigs Client
//!
//! This module implements the typed client for the `wjr_count_contigs` service.
//!
//! The [`CountContigsClient`] owns the connection settings, the optional validated
//! credentials and a [`JsonRpcCaller`] bound to the service URL. Each call is an
//! independent request/response exchange: nothing is cached and nothing is retried.
//!
//! ## Example
//!
//! ```rust,no_run
//! use count_contigs_core::client::{ClientConfig, CountContigsClient};
//! use count_contigs_core::url::Url;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let url = Url::parse("https://kbase.us/services/wjr_count_contigs")?;
//! let client = CountContigsClient::with_token(url, "my-token", ClientConfig::default()).await?;
//!
//! let results = client.count_contigs("my_workspace", "my_contigset").await?;
//! println!("{:?}", results.contig_count);
//! # Ok(())
//! # }
//! ```
pub mod config;
mod types;

pub use config::{ClientConfig, DEFAULT_AUTH_URL};
pub use types::*;

use crate::auth::{AuthClient, AuthError, AuthToken};
use crate::jsonrpc::caller::{JsonRpcCaller, JsonRpcError};
use crate::jsonrpc::message::RpcContext;
use url::Url;

/// Fully qualified JSON-RPC method name of `count_contigs`.
pub const COUNT_CONTIGS_METHOD: &str = "wjr_count_contigs.count_contigs";

/// Errors that can occur when building or reconfiguring a client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Failed to build the HTTP transport: '{0}'")]
    Transport(#[source] reqwest::Error),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

#[derive(Debug)]
pub struct CountContigsClient {
    caller: JsonRpcCaller,
    config: ClientConfig,
}

impl CountContigsClient {
    /// Creates a client without credentials using the default configuration.
    pub fn new(url: Url) -> Result<Self, ClientError> {
        Self::with_config(url, ClientConfig::default())
    }

    /// Creates a client without credentials.
    pub fn with_config(url: Url, config: ClientConfig) -> Result<Self, ClientError> {
        let http = config.http_client().map_err(ClientError::Transport)?;
        Ok(Self::from_parts(http, url, None, config))
    }

    /// Creates a client that authenticates with `token`.
    ///
    /// The token is validated against `config.auth_url` before the client is returned.
    ///
    /// # Returns
    ///
    /// * `Ok(CountContigsClient)` - The token is valid.
    /// * `Err(ClientError::Auth(AuthError::Unauthorized))` - The token was rejected.
    /// * `Err(ClientError)` - The token could not be checked.
    pub async fn with_token(
        url: Url,
        token: &str,
        config: ClientConfig,
    ) -> Result<Self, ClientError> {
        let http = config.http_client().map_err(ClientError::Transport)?;
        let token = AuthClient::new(http.clone(), &config)
            .validate_token(token)
            .await?;

        tracing::debug!(user = token.user_name(), "token validated");

        Ok(Self::from_parts(http, url, Some(token), config))
    }

    /// Creates a client that authenticates as `user`.
    ///
    /// The credentials are exchanged for a token with the authentication service before the
    /// client is returned, with the same error contract as [`CountContigsClient::with_token`].
    pub async fn with_credentials(
        url: Url,
        user: &str,
        password: &str,
        config: ClientConfig,
    ) -> Result<Self, ClientError> {
        let http = config.http_client().map_err(ClientError::Transport)?;
        let token = AuthClient::new(http.clone(), &config)
            .login(user, password)
            .await?;

        Ok(Self::from_parts(http, url, Some(token), config))
    }

    fn from_parts(
        http: reqwest::Client,
        url: Url,
        token: Option<AuthToken>,
        config: ClientConfig,
    ) -> Self {
        let caller = JsonRpcCaller::new(http, url, token, &config);
        Self { caller, config }
    }

    /// The URL of the service this client talks to.
    pub fn url(&self) -> &Url {
        self.caller.url()
    }

    /// The validated token, if the client was built with credentials.
    pub fn token(&self) -> Option<&AuthToken> {
        self.caller.token()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Replaces the connection settings. Subsequent calls use the new transport.
    ///
    /// Credentials are not re-validated when `auth_url` changes.
    pub fn set_config(&mut self, config: ClientConfig) -> Result<(), ClientError> {
        let http = config.http_client().map_err(ClientError::Transport)?;
        self.caller.reconfigure(http, &config);
        self.config = config;
        Ok(())
    }

    /// Counts the contigs in a ContigSet.
    ///
    /// # Arguments
    ///
    /// * `workspace_name` - The workspace holding the ContigSet.
    /// * `contigset_id` - The ContigSet to count.
    pub async fn count_contigs(
        &self,
        workspace_name: &str,
        contigset_id: &str,
    ) -> Result<CountContigsResults, JsonRpcError> {
        self.count_contigs_with_context(workspace_name, contigset_id, None)
            .await
    }

    /// Same as [`CountContigsClient::count_contigs`], forwarding a call context to the server.
    pub async fn count_contigs_with_context(
        &self,
        workspace_name: &str,
        contigset_id: &str,
        context: Option<&RpcContext>,
    ) -> Result<CountContigsResults, JsonRpcError> {
        let params = CountContigsParams {
            workspace_name,
            contigset_id,
        };

        self.caller
            .call_single(COUNT_CONTIGS_METHOD, &params, context)
            .await
    }
}
