//! # Authentication
//!
//! Credentials are checked against the KBase authentication service when a client is
//! built, so an invalid token is reported before any RPC is attempted.
pub mod client;

pub use client::{AuthClient, AuthError, AuthToken};
