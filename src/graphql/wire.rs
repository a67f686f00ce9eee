//! JSON shapes exchanged with the GraphQL endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body: `{"query": ..., "variables": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphqlRequest {
  pub query: String,
  pub variables: Value,
}

impl GraphqlRequest {
  /// Build a request. `Null` variables are sent as an empty object.
  pub fn new(query: impl Into<String>, variables: Value) -> Self {
    let variables = match variables {
      Value::Null => Value::Object(Default::default()),
      other => other,
    };
    Self {
      query: query.into(),
      variables,
    }
  }
}

/// Response body: `{"data": ..., "errors": [...]}`, both optional.
#[derive(Debug, Deserialize)]
pub struct GraphqlResponse {
  #[serde(default)]
  pub data: Option<Value>,
  #[serde(default)]
  pub errors: Option<Vec<GraphqlErrorPayload>>,
}

/// A single entry of the `errors` array.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlErrorPayload {
  pub message: String,
  #[serde(default)]
  pub path: Option<Vec<Value>>,
  #[serde(default)]
  pub extensions: Option<Value>,
}
