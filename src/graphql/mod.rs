//! GraphQL request client.
//!
//! A single endpoint receives every query and mutation as a JSON `POST`.
//! `GraphqlTransport` is the seam the cache layer talks to; `GraphqlClient`
//! is the reqwest-backed implementation.

pub mod client;
pub mod error;
pub mod wire;

pub use client::{GraphqlClient, GraphqlTransport};
pub use error::ClientError;
pub use wire::GraphqlRequest;
