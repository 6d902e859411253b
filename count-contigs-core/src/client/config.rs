use std::time::Duration;
use url::Url;

/// Default location of the KBase authentication service.
pub const DEFAULT_AUTH_URL: &str = "https://kbase.us/services/auth/";

/// Connection settings shared by the RPC and authentication transports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Maximum time to wait on a read from the server. `None` or zero disables the timeout.
    pub read_timeout: Option<Duration>,

    /// Allow plain `http` URLs. When `false` every call to an `http` URL is rejected.
    pub allow_insecure_http: bool,

    /// Accept any TLS certificate, including self-signed and expired ones.
    pub trust_all_certificates: bool,

    /// Send request bodies as a chunked stream instead of a single buffered payload.
    /// Many servers are not compatible with this.
    pub streaming_mode: bool,

    /// Base URL of the authentication service used to validate credentials.
    pub auth_url: Url,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            read_timeout: None,
            allow_insecure_http: false,
            trust_all_certificates: false,
            streaming_mode: false,
            auth_url: Url::parse(DEFAULT_AUTH_URL).expect("valid default auth URL"),
        }
    }
}

impl ClientConfig {
    /// Returns the read timeout to apply, treating zero as "no timeout".
    pub fn effective_read_timeout(&self) -> Option<Duration> {
        self.read_timeout.filter(|timeout| !timeout.is_zero())
    }

    /// Builds the HTTP transport described by this configuration.
    pub(crate) fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .https_only(!self.allow_insecure_http)
            .danger_accept_invalid_certs(self.trust_all_certificates);

        if let Some(timeout) = self.effective_read_timeout() {
            builder = builder.read_timeout(timeout);
        }

        builder.build()
    }
}

/// Returns `true` if `url` may be used under the given insecure-HTTP policy.
pub(crate) fn scheme_allowed(url: &Url, allow_insecure_http: bool) -> bool {
    url.scheme() == "https" || allow_insecure_http
}
