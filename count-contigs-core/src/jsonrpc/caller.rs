//! # Generic JSON-RPC Caller
//!
//! This module wraps a `reqwest` client to provide a generic interface for JSON-RPC 1.1
//! calls over HTTP. It is agnostic to the methods being invoked and the shapes of their
//! results.
//!
//! ## How it works
//!
//! The [`JsonRpcCaller`] serializes a [`JsonRpcRequest`] envelope, posts it to the service
//! URL and interprets the reply:
//!
//! * **Transport failures** (connection refused, read timeout, unexpected HTTP status)
//!   become [`JsonRpcError::Io`] or [`JsonRpcError::HttpStatus`].
//! * **Server errors** (an `error` member, or an unparsable `500` body) become
//!   [`JsonRpcError::Server`].
//! * **Shape violations** (missing result, result not a one-element list) are reported by
//!   [`JsonRpcCaller::call_single`].
use super::message::{JsonRpcRequest, JsonRpcResponse, RpcContext, ServerError};
use crate::auth::AuthToken;
use crate::client::config::{ClientConfig, scheme_allowed};
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use url::Url;

/// Size of each chunk when a request body is streamed.
const STREAM_CHUNK_SIZE: usize = 8 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum JsonRpcError {
    #[error("I/O error while talking to the server: '{0}'")]
    Io(#[source] reqwest::Error),

    #[error(
        "Refusing to call '{0}' over insecure http, use https or allow insecure http connections"
    )]
    InsecureHttp(Url),

    #[error("Server answered with HTTP status {status}: '{body}'")]
    HttpStatus { status: StatusCode, body: String },

    #[error("Failed to encode the request: '{0}'")]
    Encode(#[source] serde_json::Error),

    #[error("Failed to parse the server response: '{0}'")]
    InvalidResponse(#[source] serde_json::Error),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    #[error("Unexpected response id: expected '{expected}', got '{actual}'")]
    IdMismatch { expected: String, actual: Value },

    #[error("The server response is missing a result")]
    MissingResult,

    #[error("Expected a result list with {expected} element(s), got {actual}")]
    ResultShape { expected: usize, actual: String },

    #[error("Failed to decode the result: '{0}'")]
    InvalidResult(#[source] serde_json::Error),
}

impl JsonRpcError {
    /// Returns `true` if the call failed because the read timeout elapsed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, JsonRpcError::Io(err) if err.is_timeout())
    }
}

/// A generic JSON-RPC 1.1 client bound to a single service URL.
#[derive(Debug)]
pub struct JsonRpcCaller {
    http: reqwest::Client,
    url: Url,
    token: Option<AuthToken>,
    allow_insecure_http: bool,
    streaming_mode: bool,
    next_id: AtomicU64,
}

impl JsonRpcCaller {
    pub fn new(
        http: reqwest::Client,
        url: Url,
        token: Option<AuthToken>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            http,
            url,
            token,
            allow_insecure_http: config.allow_insecure_http,
            streaming_mode: config.streaming_mode,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    /// Swaps the transport and the settings that come from `config`, keeping url and token.
    pub(crate) fn reconfigure(&mut self, http: reqwest::Client, config: &ClientConfig) {
        self.http = http;
        self.allow_insecure_http = config.allow_insecure_http;
        self.streaming_mode = config.streaming_mode;
    }

    /// Performs a call and returns the raw `result` member, if the server sent one.
    pub async fn call<P>(
        &self,
        method: &str,
        params: &P,
        context: Option<&RpcContext>,
    ) -> Result<Option<Value>, JsonRpcError>
    where
        P: Serialize + ?Sized,
    {
        if !scheme_allowed(&self.url, self.allow_insecure_http) {
            return Err(JsonRpcError::InsecureHttp(self.url.clone()));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed).to_string();
        let request = JsonRpcRequest::new(method, params, id.clone()).with_context(context);
        let body = serde_json::to_vec(&request).map_err(JsonRpcError::Encode)?;

        tracing::debug!(
            method,
            id = %id,
            url = %self.url,
            streaming = self.streaming_mode,
            "sending JSON-RPC request"
        );

        let mut builder = self
            .http
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = &self.token {
            builder = builder.header(AUTHORIZATION, token.token());
        }

        let builder = if self.streaming_mode {
            builder.body(reqwest::Body::wrap_stream(chunked(Bytes::from(body))))
        } else {
            builder.body(body)
        };

        let response = builder.send().await.map_err(JsonRpcError::Io)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(JsonRpcError::Io)?;

        let response = parse_response(status, &bytes)?;

        if let Some(error) = response.error {
            tracing::warn!(method, code = error.code, name = %error.name, "JSON-RPC call failed");
            return Err(JsonRpcError::Server(error));
        }

        match response.id {
            Some(Value::String(ref actual)) if *actual == id => {}
            Some(Value::Null) | None => {}
            Some(actual) => {
                return Err(JsonRpcError::IdMismatch {
                    expected: id,
                    actual,
                });
            }
        }

        Ok(response.result)
    }

    /// Performs a call whose result must be a list holding exactly one element,
    /// and decodes that element.
    pub async fn call_single<P, R>(
        &self,
        method: &str,
        params: &P,
        context: Option<&RpcContext>,
    ) -> Result<R, JsonRpcError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let result = self
            .call(method, params, context)
            .await?
            .ok_or(JsonRpcError::MissingResult)?;

        let element = single_element(result)?;

        serde_json::from_value(element).map_err(JsonRpcError::InvalidResult)
    }
}

fn parse_response(status: StatusCode, body: &[u8]) -> Result<JsonRpcResponse, JsonRpcError> {
    if !status.is_success() && status != StatusCode::INTERNAL_SERVER_ERROR {
        return Err(JsonRpcError::HttpStatus {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        });
    }

    match serde_json::from_slice::<JsonRpcResponse>(body) {
        Ok(response) => {
            if status == StatusCode::INTERNAL_SERVER_ERROR && response.error.is_none() {
                let body = String::from_utf8_lossy(body).into_owned();
                return Err(JsonRpcError::Server(ServerError::unknown(body)));
            }
            Ok(response)
        }
        Err(_) if status == StatusCode::INTERNAL_SERVER_ERROR => {
            let body = String::from_utf8_lossy(body).into_owned();
            Err(JsonRpcError::Server(ServerError::unknown(body)))
        }
        Err(err) => Err(JsonRpcError::InvalidResponse(err)),
    }
}

fn single_element(result: Value) -> Result<Value, JsonRpcError> {
    match result {
        Value::Array(mut elements) if elements.len() == 1 => Ok(elements.remove(0)),
        Value::Array(elements) => Err(JsonRpcError::ResultShape {
            expected: 1,
            actual: format!("a list of {}", elements.len()),
        }),
        other => Err(JsonRpcError::ResultShape {
            expected: 1,
            actual: format!("a non-list value '{other}'"),
        }),
    }
}

fn chunked(
    body: Bytes,
) -> impl futures_util::Stream<Item = Result<Bytes, std::io::Error>> + Send + Sync + 'static {
    let chunks: Vec<Bytes> = (0..body.len())
        .step_by(STREAM_CHUNK_SIZE)
        .map(|start| body.slice(start..(start + STREAM_CHUNK_SIZE).min(body.len())))
        .collect();

    futures_util::stream::iter(chunks.into_iter().map(Ok))
}
