use thiserror::Error;

/// Failures surfaced by the request client.
///
/// `Clone` so a single in-flight request can hand the same failure to every
/// caller waiting on it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
  /// Transport failure: connect error, timeout, or a non-2xx status.
  #[error("network error: {0}")]
  Network(String),

  /// The backend answered with a GraphQL `errors` payload (first message).
  #[error("{0}")]
  Remote(String),

  /// The body could not be read as a GraphQL response.
  #[error("invalid response: {0}")]
  Decode(String),
}

impl ClientError {
  pub fn is_network(&self) -> bool {
    matches!(self, Self::Network(_))
  }
}

impl From<reqwest::Error> for ClientError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_decode() {
      Self::Decode(err.to_string())
    } else {
      Self::Network(err.to_string())
    }
  }
}

impl From<serde_json::Error> for ClientError {
  fn from(err: serde_json::Error) -> Self {
    Self::Decode(err.to_string())
  }
}
