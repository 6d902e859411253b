//! # Count Contigs Core
//!
//! `count-contigs-core` is a client for the `wjr_count_contigs` JSON-RPC service, which
//! counts the contigs of a ContigSet stored in a workspace.
//!
//! ## Key Components
//!
//! * **[`CountContigsClient`]:** The main entry point. It holds the connection settings and
//!   credentials and exposes the `count_contigs` operation.
//! * **[`ClientConfig`]:** Read timeout, insecure-HTTP allowance, certificate trust,
//!   streaming uploads and the authentication service location, all in one struct.
//!
//! ## Internal clients
//!
//! * **[`JsonRpcCaller`]:** A generic JSON-RPC 1.1 caller over HTTP, unaware of the
//!   methods it invokes.
//! * **[`AuthClient`]:** Validates tokens and logs users in against the KBase
//!   authentication service.
//!
//! ## Errors
//!
//! Building a client fails with [`ClientError`]; an invalid token surfaces as
//! [`AuthError::Unauthorized`]. Calls fail with [`JsonRpcError`], whose `Io` and
//! `HttpStatus` variants are transport failures and whose remaining variants are protocol
//! or server-side errors.
pub mod auth;
pub mod client;
pub mod jsonrpc;

pub use auth::{AuthClient, AuthError, AuthToken};
pub use client::{ClientConfig, ClientError, CountContigsClient, CountContigsResults};
pub use jsonrpc::caller::{JsonRpcCaller, JsonRpcError};
pub use jsonrpc::message::{MethodCall, RpcContext, ServerError};

// Re-exports
pub use reqwest;
pub use url;
