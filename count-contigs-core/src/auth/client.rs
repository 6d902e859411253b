//! # Authentication Client
//!
//! A small client for the two KBase authentication endpoints the RPC client needs:
//!
//! * `GET api/V2/token` validates a token and tells us who owns it.
//! * `POST api/legacy/KBase/Sessions/Login` exchanges a user name and password for a token.
use crate::client::config::{ClientConfig, scheme_allowed};
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use url::Url;

const TOKEN_PATH: &str = "api/V2/token";
const LOGIN_PATH: &str = "api/legacy/KBase/Sessions/Login";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("I/O error while contacting the authentication service: '{0}'")]
    Io(#[source] reqwest::Error),

    #[error("Authentication service answered with HTTP status {status}: '{body}'")]
    UnexpectedStatus { status: StatusCode, body: String },

    #[error("Failed to parse the authentication service response: '{0}'")]
    InvalidResponse(#[source] serde_json::Error),

    #[error("Invalid authentication service URL '{0}': {1}")]
    InvalidUrl(Url, #[source] url::ParseError),

    #[error(
        "Refusing to send credentials to '{0}' over insecure http, use https or allow insecure http connections"
    )]
    InsecureHttp(Url),
}

/// A token that the authentication service has vouched for.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    token: String,
    user_name: String,
}

impl AuthToken {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthToken")
            .field("token", &"<redacted>")
            .field("user_name", &self.user_name)
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenInfo {
    user: String,
}

#[derive(Deserialize)]
struct LoginInfo {
    user_id: String,
    token: String,
}

#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base: Url,
    allow_insecure_http: bool,
}

impl AuthClient {
    pub fn new(http: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            http,
            base: with_trailing_slash(config.auth_url.clone()),
            allow_insecure_http: config.allow_insecure_http,
        }
    }

    /// Checks `token` with the authentication service.
    ///
    /// # Returns
    ///
    /// * `Ok(AuthToken)` - The token is valid.
    /// * `Err(AuthError::Unauthorized)` - The service rejected the token.
    /// * `Err(AuthError)` - Any other variant means the check could not be performed.
    pub async fn validate_token(&self, token: &str) -> Result<AuthToken, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::Unauthorized("Token cannot be empty".to_string()));
        }

        let url = self.endpoint(TOKEN_PATH)?;
        tracing::debug!(url = %url, "validating token");

        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, token)
            .send()
            .await
            .map_err(AuthError::Io)?;

        let info: TokenInfo = read_json(response).await?;

        Ok(AuthToken {
            token: token.to_string(),
            user_name: info.user,
        })
    }

    /// Logs in with a user name and password and returns the issued token.
    pub async fn login(&self, user: &str, password: &str) -> Result<AuthToken, AuthError> {
        let url = self.endpoint(LOGIN_PATH)?;
        tracing::debug!(url = %url, user, "logging in");

        let response = self
            .http
            .post(url)
            .form(&[
                ("user_id", user),
                ("password", password),
                ("fields", "token,user_id"),
            ])
            .send()
            .await
            .map_err(AuthError::Io)?;

        let info: LoginInfo = read_json(response).await?;

        Ok(AuthToken {
            token: info.token,
            user_name: info.user_id,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        if !scheme_allowed(&self.base, self.allow_insecure_http) {
            return Err(AuthError::InsecureHttp(self.base.clone()));
        }

        self.base
            .join(path)
            .map_err(|e| AuthError::InvalidUrl(self.base.clone(), e))
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, AuthError> {
    let status = response.status();
    let body = response.bytes().await.map_err(AuthError::Io)?;

    match status {
        s if s.is_success() => serde_json::from_slice(&body).map_err(AuthError::InvalidResponse),
        StatusCode::UNAUTHORIZED => {
            let message = error_message(&body);
            tracing::warn!(%message, "authentication service rejected the credentials");
            Err(AuthError::Unauthorized(message))
        }
        status => Err(AuthError::UnexpectedStatus {
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        }),
    }
}

/// Extracts a human readable message from an authentication service error body.
///
/// The V2 API nests it under `error.message`, the legacy API uses `error_msg`.
fn error_message(body: &[u8]) -> String {
    let value: serde_json::Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(_) => return String::from_utf8_lossy(body).into_owned(),
    };

    value
        .pointer("/error/message")
        .or_else(|| value.get("error_msg"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
