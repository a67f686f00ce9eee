use thiserror::Error;

use crate::graphql::ClientError;

use super::messages;

/// Input rejected before it reaches the network.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {reason}")]
pub struct ValidationError {
  pub field: &'static str,
  pub reason: String,
}

impl ValidationError {
  pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
    Self {
      field,
      reason: reason.into(),
    }
  }
}

/// Failure of a store write action, returned after it was recorded in state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
  #[error(transparent)]
  Client(#[from] ClientError),

  #[error("invalid {0}")]
  Validation(#[from] ValidationError),
}

impl StoreError {
  /// Message suitable for showing next to a form.
  pub fn user_message(&self) -> String {
    match self {
      Self::Client(err) => messages::user_message(err),
      Self::Validation(err) => format!("Please check the {} field: {}.", err.field, err.reason),
    }
  }
}
