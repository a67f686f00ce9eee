use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt::Debug;
use std::time::Duration;

use crate::graphql::ClientError;

/// An entity type a [`Store`](super::Store) can hold.
///
/// Implementors describe how their list is fetched and how it is ordered.
pub trait Resource:
  Clone + Debug + PartialEq + Send + Sync + Serialize + DeserializeOwned + 'static
{
  /// Store name, also the key for TTL overrides in the config (e.g. "categories")
  const KIND: &'static str;

  /// Query returning the full list
  const LIST_QUERY: &'static str;

  /// Field of the response `data` holding the list
  const LIST_FIELD: &'static str;

  /// How long a fetched list stays fresh unless configured otherwise
  const DEFAULT_TTL: Duration;

  fn id(&self) -> &str;

  /// Variables sent with the list query.
  fn list_variables() -> Value {
    Value::Object(Default::default())
  }

  /// Display order. The default keeps server order.
  fn compare(&self, _other: &Self) -> Ordering {
    Ordering::Equal
  }
}

/// Deserialize `data[field]`.
pub fn decode_field<D: DeserializeOwned>(data: Value, field: &str) -> Result<D, ClientError> {
  let value = match data {
    Value::Object(mut map) => map.remove(field),
    _ => None,
  }
  .ok_or_else(|| ClientError::Decode(format!("response has no `{}` field", field)))?;

  serde_json::from_value(value)
    .map_err(|e| ClientError::Decode(format!("unexpected `{}` payload: {}", field, e)))
}
