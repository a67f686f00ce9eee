//! Domain stores.
//!
//! A [`Store`] owns the client-side state for one kind of entity (a list, a
//! loading flag, and the last user-facing error) and exposes the actions
//! that fill it through the cache layer. Views read it via
//! [`Store::snapshot`] or follow it with [`Store::subscribe`].
//!
//! Stores are the recovery boundary for request failures: read actions record
//! the error and keep the previous entities, write actions record it and hand
//! it back to the caller.

mod container;
mod error;
mod hydrate;
pub mod messages;
mod resource;
mod state;

pub use container::Store;
pub use error::{StoreError, ValidationError};
pub use resource::{decode_field, Resource};
pub use state::StoreState;
