//! User-facing text for request failures.

use crate::graphql::ClientError;

pub const GENERIC_ERROR: &str = "Something went wrong. Please try again.";

const SIGN_IN: &str = "Please sign in to continue.";
const NO_PERMISSION: &str = "You don't have permission to do that.";
const NOT_FOUND: &str = "We couldn't find what you were looking for.";
const SLOW_DOWN: &str = "Too many requests. Please wait a moment and try again.";
const DUPLICATE: &str = "This item already exists.";

/// Substrings of known backend messages, checked in order (lowercase).
const KNOWN_REMOTE_ERRORS: &[(&str, &str)] = &[
  ("unauthenticated", SIGN_IN),
  ("not authenticated", SIGN_IN),
  ("unauthorized", SIGN_IN),
  ("jwt expired", SIGN_IN),
  ("forbidden", NO_PERMISSION),
  ("permission", NO_PERMISSION),
  ("not found", NOT_FOUND),
  ("rate limit", SLOW_DOWN),
  ("too many requests", SLOW_DOWN),
  ("already exists", DUPLICATE),
  ("duplicate", DUPLICATE),
];

/// Translate a client error into the text a user sees.
///
/// Transport and decoding failures collapse into a generic message; backend
/// errors map to friendlier text when recognized and pass through otherwise.
pub fn user_message(err: &ClientError) -> String {
  match err {
    ClientError::Network(_) | ClientError::Decode(_) => GENERIC_ERROR.to_string(),
    ClientError::Remote(message) => remote_message(message),
  }
}

fn remote_message(message: &str) -> String {
  let message = message.trim();
  if message.is_empty() {
    return GENERIC_ERROR.to_string();
  }

  let lower = message.to_lowercase();
  KNOWN_REMOTE_ERRORS
    .iter()
    .find(|(needle, _)| lower.contains(needle))
    .map(|(_, friendly)| friendly.to_string())
    .unwrap_or_else(|| message.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_network_is_generic() {
    let err = ClientError::Network("dns error: no such host".into());
    assert_eq!(user_message(&err), GENERIC_ERROR);
  }

  #[test]
  fn test_known_remote_is_mapped() {
    let err = ClientError::Remote("Forbidden: admin only".into());
    assert_eq!(user_message(&err), NO_PERMISSION);

    let err = ClientError::Remote("Category NOT FOUND".into());
    assert_eq!(user_message(&err), NOT_FOUND);
  }

  #[test]
  fn test_unknown_remote_passes_through() {
    let err = ClientError::Remote("Listing title is too long".into());
    assert_eq!(user_message(&err), "Listing title is too long");
  }

  #[test]
  fn test_blank_remote_is_generic() {
    assert_eq!(user_message(&ClientError::Remote("  ".into())), GENERIC_ERROR);
  }
}
