//! # Generic JSON-RPC Transport
//!
//! This module contains the low-level building blocks for performing JSON-RPC 1.1 calls
//! over HTTP.
//!
//! The components here know nothing about `count_contigs`: parameters are any
//! `serde::Serialize` value that encodes as a JSON array and results are decoded into any
//! `serde::de::DeserializeOwned` type chosen by the caller.
pub mod caller;
pub mod message;
