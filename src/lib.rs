//! Client data layer for a classifieds marketplace.
//!
//! - [`graphql`]: request client for the single GraphQL endpoint
//! - [`cache`]: fingerprint-keyed TTL cache with in-flight request sharing
//! - [`store`]: generic state container with fetch/write/reset/hydrate actions
//! - [`market`]: marketplace entities and the stores that hold them

pub mod cache;
pub mod config;
pub mod db;
pub mod graphql;
pub mod logging;
pub mod market;
pub mod prefs;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;
